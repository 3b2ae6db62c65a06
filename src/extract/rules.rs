//! Declarative field rules for the key/value tables of a company page.
//!
//! Each table region is found by CSS selector; every `<tr>` in it is read as
//! a `<th>` label and a `<td>` value. The first rule whose label matcher
//! accepts the label transforms the value into its target field. A transform
//! returning `None` leaves the field at its default.
//!
//! The selectors and label texts follow the registry site's current markup.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::record::CompanyRecord;
use super::{text_of, ExtractError};

static HEADCOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*et\s*(\d+)").unwrap());
static VAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z]{2}\d+)").unwrap());
static RCS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{3} ?\d{3} ?\d{3})").unwrap());
static NAF: Lazy<Regex> = Lazy::new(|| Regex::new(r"([\dA-Z.]+)").unwrap());
static DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{2}/\d{2}/\d{4})").unwrap());

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static LABEL_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("th").unwrap());
static VALUE_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static UPDATE_SPANS: Lazy<Selector> = Lazy::new(|| Selector::parse(".date-maj span").unwrap());

#[derive(Debug, Clone, Copy)]
pub enum LabelMatch {
    Exact(&'static str),
    Contains(&'static str),
}

impl LabelMatch {
    pub fn matches(&self, label: &str) -> bool {
        match self {
            LabelMatch::Exact(expected) => label == *expected,
            LabelMatch::Contains(needle) => label.contains(needle),
        }
    }
}

pub struct RowRule {
    pub label: LabelMatch,
    pub field: &'static str,
    pub transform: fn(&str) -> Option<String>,
}

pub struct TableRegion {
    pub name: &'static str,
    pub selector: &'static str,
    pub rules: &'static [RowRule],
}

pub fn verbatim(value: &str) -> Option<String> {
    Some(value.to_string())
}

/// "Entre 10 et 19 salariés" -> "10-19"
pub fn headcount_range(value: &str) -> Option<String> {
    HEADCOUNT
        .captures(value)
        .map(|caps| format!("{}-{}", &caps[1], &caps[2]))
}

/// "SAS, société par actions simplifiée" -> "SAS"
pub fn before_comma(value: &str) -> Option<String> {
    value.split(',').next().map(|s| s.trim().to_string())
}

pub fn vat_number(value: &str) -> Option<String> {
    VAT.captures(value).map(|caps| caps[1].to_string())
}

/// "552 100 554 R.C.S. Paris" -> "552100554"
pub fn rcs_number(value: &str) -> Option<String> {
    RCS.captures(value).map(|caps| caps[1].replace(' ', ""))
}

/// "70.22Z - Conseil pour les affaires" -> "7022Z"
pub fn naf_code(value: &str) -> Option<String> {
    NAF.captures(value).map(|caps| caps[1].replace('.', ""))
}

pub static SUMMARY_REGION: TableRegion = TableRegion {
    name: "summary",
    selector: "#resume table",
    rules: &[
        RowRule { label: LabelMatch::Exact("Adresse :"), field: "Address", transform: verbatim },
        RowRule { label: LabelMatch::Exact("Activité :"), field: "Activity", transform: verbatim },
        RowRule { label: LabelMatch::Exact("Effectif :"), field: "Effectif", transform: headcount_range },
        RowRule { label: LabelMatch::Exact("Création :"), field: "Creation Date", transform: verbatim },
    ],
};

pub static LEGAL_REGION: TableRegion = TableRegion {
    name: "legal",
    selector: "#informations table",
    rules: &[
        RowRule { label: LabelMatch::Contains("SIRET"), field: "SIRET", transform: verbatim },
        RowRule { label: LabelMatch::Contains("Forme juridique"), field: "Legal Form", transform: before_comma },
        RowRule { label: LabelMatch::Contains("TVA"), field: "VAT", transform: vat_number },
        RowRule { label: LabelMatch::Contains("Capital social"), field: "Capital", transform: verbatim },
        RowRule { label: LabelMatch::Contains("Numéro RCS"), field: "RCS", transform: rcs_number },
    ],
};

pub static ACTIVITY_REGION: TableRegion = TableRegion {
    name: "activity",
    selector: "#activite table",
    rules: &[
        RowRule { label: LabelMatch::Contains("Code NAF"), field: "APE", transform: naf_code },
        RowRule { label: LabelMatch::Contains("Domaine"), field: "Domain", transform: verbatim },
        RowRule { label: LabelMatch::Contains("clôture"), field: "Closure Date", transform: verbatim },
    ],
};

/// Registry sources named in the "last updated" line, checked in order.
pub const UPDATE_SOURCES: [(&str, &str); 3] = [
    ("RCS", "RCS Update"),
    ("RNE", "RNE Update"),
    ("INSEE", "INSEE Update"),
];

impl TableRegion {
    pub fn apply(&self, document: &Html, record: &mut CompanyRecord) -> Result<(), ExtractError> {
        let selector = Selector::parse(self.selector).unwrap();
        let Some(table) = document.select(&selector).next() else {
            return Ok(());
        };

        for row in table.select(&ROW) {
            let (label, value) = self.read_row(row)?;
            if let Some(rule) = self.rules.iter().find(|r| r.label.matches(&label)) {
                if let Some(v) = (rule.transform)(&value) {
                    record.set(rule.field, v);
                }
            }
        }
        Ok(())
    }

    fn read_row(&self, row: ElementRef<'_>) -> Result<(String, String), ExtractError> {
        let label = row
            .select(&LABEL_CELL)
            .next()
            .ok_or(ExtractError::MissingCell { region: self.name, cell: "th" })?;
        let value = row
            .select(&VALUE_CELL)
            .next()
            .ok_or(ExtractError::MissingCell { region: self.name, cell: "td" })?;
        Ok((text_of(label), text_of(value)))
    }
}

/// Fills the per-source update dates. A span naming a source but carrying
/// no date clears that source's field.
pub fn apply_update_dates(document: &Html, record: &mut CompanyRecord) {
    for span in document.select(&UPDATE_SPANS) {
        let text = text_of(span);
        let date = DATE
            .captures(&text)
            .map(|caps| caps[1].to_string())
            .unwrap_or_default();
        if let Some((_, field)) = UPDATE_SOURCES.iter().find(|(tag, _)| text.contains(tag)) {
            record.set(field, date);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(section: &str, rows: &[(&str, &str)]) -> Html {
        let rows: String = rows
            .iter()
            .map(|(k, v)| format!("<tr><th>{}</th><td>{}</td></tr>", k, v))
            .collect();
        Html::parse_document(&format!(
            r#"<html><body><section id="{}"><table>{}</table></section></body></html>"#,
            section, rows
        ))
    }

    #[test]
    fn test_value_transforms() {
        assert_eq!(headcount_range("Entre 10 et 19 salariés").as_deref(), Some("10-19"));
        assert_eq!(headcount_range("Non renseigné"), None);
        assert_eq!(before_comma("SAS, société par actions simplifiée").as_deref(), Some("SAS"));
        assert_eq!(vat_number("FR12552100554 Vérifier").as_deref(), Some("FR12552100554"));
        assert_eq!(vat_number("Non assujetti"), None);
        assert_eq!(rcs_number("552 100 554 R.C.S. Paris").as_deref(), Some("552100554"));
        assert_eq!(naf_code("70.22Z - Conseil pour les affaires").as_deref(), Some("7022Z"));
    }

    #[test]
    fn test_label_matchers() {
        assert!(LabelMatch::Exact("Adresse :").matches("Adresse :"));
        assert!(!LabelMatch::Exact("Adresse :").matches("Adresse postale :"));
        assert!(LabelMatch::Contains("TVA").matches("N° TVA Intracommunautaire :"));
    }

    #[test]
    fn test_summary_region_uses_exact_labels() {
        let doc = page(
            "resume",
            &[
                ("Adresse :", "1 rue de la Paix 75002 Paris"),
                ("Adresse postale :", "ignored"),
                ("Effectif :", "Entre 20 et 49 salariés"),
                ("Création :", "01/02/1999"),
            ],
        );
        let mut record = CompanyRecord::new("u");
        SUMMARY_REGION.apply(&doc, &mut record).unwrap();

        assert_eq!(record.get("Address"), Some("1 rue de la Paix 75002 Paris"));
        assert_eq!(record.get("Effectif"), Some("20-49"));
        assert_eq!(record.get("Creation Date"), Some("01/02/1999"));
        assert_eq!(record.get("Activity"), Some(""));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // "SIRET (siège)" must not fall through to a later rule.
        let doc = page(
            "informations",
            &[
                ("SIRET (siège) :", "552 100 554 00011"),
                ("Numéro RCS :", "552 100 554 R.C.S. Paris"),
            ],
        );
        let mut record = CompanyRecord::new("u");
        LEGAL_REGION.apply(&doc, &mut record).unwrap();

        assert_eq!(record.get("SIRET"), Some("552 100 554 00011"));
        assert_eq!(record.get("RCS"), Some("552100554"));
    }

    #[test]
    fn test_missing_region_is_not_an_error() {
        let doc = page("elsewhere", &[("Domaine :", "Conseil")]);
        let mut record = CompanyRecord::new("u");
        ACTIVITY_REGION.apply(&doc, &mut record).unwrap();
        assert_eq!(record.get("Domain"), Some(""));
    }

    #[test]
    fn test_row_without_value_cell_fails() {
        let doc = Html::parse_document(
            r#"<div id="activite"><table><tr><th>Domaine :</th></tr></table></div>"#,
        );
        let mut record = CompanyRecord::new("u");
        let err = ACTIVITY_REGION.apply(&doc, &mut record).unwrap_err();
        assert!(matches!(err, ExtractError::MissingCell { region: "activity", cell: "td" }));
    }

    #[test]
    fn test_update_dates_by_source() {
        let doc = Html::parse_document(
            r#"<p class="date-maj">
                <span>Mise à jour RCS : 12/03/2024</span>
                <span>Mise à jour INSEE : 01/01/2024</span>
                <span>Mise à jour RNE : inconnue</span>
            </p>"#,
        );
        let mut record = CompanyRecord::new("u");
        apply_update_dates(&doc, &mut record);

        assert_eq!(record.get("RCS Update"), Some("12/03/2024"));
        assert_eq!(record.get("INSEE Update"), Some("01/01/2024"));
        assert_eq!(record.get("RNE Update"), Some(""));
    }
}
