use std::collections::{BTreeMap, HashSet};

use crate::extract::{CompanyRecord, BASE_FIELDS};
use crate::translate::translate;

/// The export table: machine column names, their display labels, and the
/// records they key into.
#[derive(Debug)]
pub struct Table {
    pub schema: Vec<String>,
    pub display: Vec<String>,
    pub rows: Vec<CompanyRecord>,
}

/// Which preferred year a `<label>_<year>` field belongs to.
fn year_of<'y>(field: &str, years: &'y [String]) -> Option<&'y str> {
    years.iter().map(String::as_str).find(|year| {
        field
            .strip_suffix(year)
            .and_then(|rest| rest.strip_suffix('_'))
            .is_some_and(|label| !label.is_empty())
    })
}

/// Builds one header covering every record.
///
/// Base fields come first in their declared order, then other non-year
/// fields in first-seen order, then year fields grouped by year (newest
/// first, as `years` is ordered) and sorted case-insensitively inside each
/// group.
pub fn build_schema(records: &[CompanyRecord], years: &[String]) -> Vec<String> {
    let mut schema: Vec<String> = BASE_FIELDS.iter().map(|f| f.to_string()).collect();
    let mut seen: HashSet<&str> = BASE_FIELDS.iter().copied().collect();
    let mut by_year: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for record in records {
        for key in record.keys() {
            if !seen.insert(key) {
                continue;
            }
            match year_of(key, years) {
                Some(year) => by_year.entry(year).or_default().push(key),
                None => schema.push(key.to_string()),
            }
        }
    }

    for year in years {
        if let Some(mut fields) = by_year.remove(year.as_str()) {
            fields.sort_by_cached_key(|f| f.to_lowercase());
            schema.extend(fields.into_iter().map(str::to_string));
        }
    }
    schema
}

pub fn reconcile(records: Vec<CompanyRecord>, years: &[String]) -> Table {
    let schema = build_schema(&records, years);
    let display = schema.iter().map(|f| translate(f)).collect();
    Table {
        schema,
        display,
        rows: records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn years() -> Vec<String> {
        ["2023", "2022", "2021", "2020"].iter().map(|y| y.to_string()).collect()
    }

    fn record(url: &str, extra: &[&str]) -> CompanyRecord {
        let mut r = CompanyRecord::new(url);
        for field in extra {
            r.set(field, "1");
        }
        r
    }

    #[test]
    fn test_year_of() {
        let ys = years();
        assert_eq!(year_of("Revenue (€)_2023", &ys), Some("2023"));
        assert_eq!(year_of("Revenue (€)_2019", &ys), None);
        assert_eq!(year_of("_2023", &ys), None);
        assert_eq!(year_of("Foo2023", &ys), None);
    }

    #[test]
    fn test_base_fields_only() {
        let schema = build_schema(&[record("a", &[])], &years());
        assert_eq!(schema, BASE_FIELDS.to_vec());
    }

    #[test]
    fn test_disjoint_dynamic_fields_are_bucketed() {
        let records = vec![
            record("a", &["Revenue (€)_2023"]),
            record("b", &["Revenue (€)_2022"]),
        ];
        let schema = build_schema(&records, &years());
        assert_eq!(&schema[22..], &["Revenue (€)_2023", "Revenue (€)_2022"]);
    }

    #[test]
    fn test_extras_first_seen_then_sorted_years() {
        let records = vec![
            record("a", &["zeta_2022", "Zulu", "beta_2023", "Alpha_2023"]),
            record("b", &["Bravo_2022", "Alpha_2023", "Alpha", "old_2019"]),
        ];
        let schema = build_schema(&records, &years());
        assert_eq!(
            &schema[22..],
            &["Zulu", "Alpha", "old_2019", "Alpha_2023", "beta_2023", "Bravo_2022", "zeta_2022"]
        );
    }

    #[test]
    fn test_display_row_is_translated() {
        let records = vec![record("a", &["Chiffre d'affaires (€)_2022", "Foo"])];
        let table = reconcile(records, &years());
        assert_eq!(table.display.len(), table.schema.len());
        assert_eq!(table.display[0], "URL");
        assert_eq!(table.display[22], "Foo");
        assert_eq!(table.display[23], "Revenue (€) - 2022");
        assert_eq!(table.schema[23], "Chiffre d'affaires (€)_2022");
    }
}
