use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::record::{CompanyRecord, NOT_DISCLOSED};
use super::text_of;
use crate::normalize::normalize;

static RATIO_TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("#finances .ratios table").unwrap());
static HEADER_CELLS: Lazy<Selector> = Lazy::new(|| Selector::parse("tr.tr-header th").unwrap());
static DATA_ROWS: Lazy<Selector> = Lazy::new(|| Selector::parse("tr:not(.tr-header)").unwrap());
static CELLS: Lazy<Selector> = Lazy::new(|| Selector::parse("th, td").unwrap());

/// Ratio values of one company, per year then per label, labels in row order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct YearlyRatioTable {
    years: Vec<(String, Vec<(String, String)>)>,
}

impl YearlyRatioTable {
    fn insert(&mut self, year: &str, label: &str, value: String) {
        let idx = match self.years.iter().position(|(y, _)| y == year) {
            Some(idx) => idx,
            None => {
                self.years.push((year.to_string(), Vec::new()));
                self.years.len() - 1
            }
        };
        let labels = &mut self.years[idx].1;
        match labels.iter_mut().find(|(l, _)| l == label) {
            Some(slot) => slot.1 = value,
            None => labels.push((label.to_string(), value)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, year: &str, label: &str) -> Option<&str> {
        self.years
            .iter()
            .find(|(y, _)| y == year)?
            .1
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    /// Writes `<label>_<year>` fields, years in `preferred` order.
    pub fn flatten_into(self, record: &mut CompanyRecord, preferred: &[String]) {
        let mut years = self.years;
        for year in preferred {
            if let Some(idx) = years.iter().position(|(y, _)| y == year) {
                let (year, labels) = years.swap_remove(idx);
                for (label, value) in labels {
                    record.set(&format!("{}_{}", label, year), value);
                }
            }
        }
    }
}

/// Reads the multi-year ratio table, keeping only `preferred` years that the
/// table header offers. Each kept year reads its own header column.
pub fn parse_ratio_table(document: &Html, preferred: &[String]) -> Option<YearlyRatioTable> {
    let table = document.select(&RATIO_TABLE).next()?;

    let available: Vec<String> = table.select(&HEADER_CELLS).skip(1).map(text_of).collect();
    let kept: Vec<(&str, usize)> = preferred
        .iter()
        .filter_map(|year| {
            available
                .iter()
                .position(|y| y == year)
                .map(|pos| (year.as_str(), pos + 1))
        })
        .collect();

    let mut ratios = YearlyRatioTable::default();
    for row in table.select(&DATA_ROWS) {
        let cells: Vec<String> = row.select(&CELLS).map(text_of).collect();
        if cells.len() < 2 {
            continue;
        }
        let label = &cells[0];
        for &(year, column) in &kept {
            let Some(raw) = cells.get(column) else {
                continue;
            };
            let value = normalize(raw);
            let value = if value.is_empty() { NOT_DISCLOSED.to_string() } else { value };
            ratios.insert(year, label, value);
        }
    }
    Some(ratios)
}
