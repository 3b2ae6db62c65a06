/// Columns every record carries, in export order.
pub const BASE_FIELDS: [&str; 22] = [
    "URL",
    "Name",
    "Alias",
    "SIREN",
    "Status",
    "Address",
    "Activity",
    "Effectif",
    "Creation Date",
    "Dirigeant Name",
    "Dirigeant Age",
    "SIRET",
    "Legal Form",
    "VAT",
    "Capital",
    "RCS",
    "APE",
    "Domain",
    "Closure Date",
    "RCS Update",
    "RNE Update",
    "INSEE Update",
];

/// Placeholder for a value the page does not disclose.
pub const NOT_DISCLOSED: &str = "ND";

/// One company, as an ordered field -> value map.
///
/// Starts with every base field set to the empty string; ratio fields
/// (`<label>_<year>`) are appended as they are found. Overwriting a field
/// keeps its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRecord {
    fields: Vec<(String, String)>,
}

impl CompanyRecord {
    pub fn new(url: &str) -> Self {
        let mut fields: Vec<(String, String)> = BASE_FIELDS
            .iter()
            .map(|f| (f.to_string(), String::new()))
            .collect();
        fields[0].1 = url.to_string();
        Self { fields }
    }

    #[cfg(test)]
    pub fn url(&self) -> &str {
        &self.fields[0].1
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}
