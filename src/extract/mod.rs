//! Company detail page -> `CompanyRecord`.

mod ratios;
mod record;
mod rules;

pub use ratios::parse_ratio_table;
pub use record::{CompanyRecord, BASE_FIELDS, NOT_DISCLOSED};
pub use rules::{apply_update_dates, ACTIVITY_REGION, LEGAL_REGION, SUMMARY_REGION};

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use crate::config::Config;
use crate::pacing::Pacing;
use crate::session::PageDriver;

static HEADLINE: Lazy<Selector> = Lazy::new(|| Selector::parse("h1.big-text").unwrap());
static SIREN: Lazy<Selector> = Lazy::new(|| Selector::parse("a.siren-to-copy").unwrap());
static ACTIVE_MARKER: Lazy<Selector> = Lazy::new(|| Selector::parse(".status .actif").unwrap());
static DIRECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("#dirigeants .dirigeant").unwrap());
static DIRECTOR_NAME: Lazy<Selector> = Lazy::new(|| Selector::parse(".nom a").unwrap());
static DIRECTOR_AGE: Lazy<Selector> = Lazy::new(|| Selector::parse(".age-siren span").unwrap());

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\(.*?\)").unwrap());
static AGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\s+ans").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("page load failed: {0}")]
    Page(String),
    #[error("{region} table row without a <{cell}> cell")]
    MissingCell {
        region: &'static str,
        cell: &'static str,
    },
}

#[derive(Debug)]
pub enum Outcome {
    Accepted(CompanyRecord),
    /// The company is no longer active; it is left out of the export.
    Inactive,
    /// Extraction stopped early. The record keeps what was read and is exported.
    Partial {
        record: CompanyRecord,
        error: ExtractError,
    },
}

impl Outcome {
    /// The record to export, if any.
    pub fn into_record(self) -> Option<CompanyRecord> {
        match self {
            Outcome::Accepted(record) | Outcome::Partial { record, .. } => Some(record),
            Outcome::Inactive => None,
        }
    }
}

/// Text content with each text node trimmed, joined without separator.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// Extracts a company from its rendered detail page.
pub fn parse_detail(html: &str, url: &str, preferred_years: &[String]) -> Outcome {
    let document = Html::parse_document(html);
    let mut record = CompanyRecord::new(url);

    match fill_record(&document, &mut record, preferred_years) {
        Ok(true) => Outcome::Accepted(record),
        Ok(false) => Outcome::Inactive,
        Err(error) => Outcome::Partial { record, error },
    }
}

/// Returns `Ok(false)` as soon as the company turns out to be inactive.
fn fill_record(
    document: &Html,
    record: &mut CompanyRecord,
    preferred_years: &[String],
) -> Result<bool, ExtractError> {
    if let Some(h1) = document.select(&HEADLINE).next() {
        let headline = text_of(h1);
        let mut parts = headline.split('(');
        if let Some(name) = parts.next() {
            record.set("Name", name.trim());
        }
        if let Some(alias) = parts.next() {
            record.set("Alias", alias.replace(')', "").trim());
        }
    }

    if let Some(siren) = document.select(&SIREN).next() {
        record.set("SIREN", text_of(siren));
    }

    let active = document.select(&ACTIVE_MARKER).next().is_some();
    record.set("Status", if active { "Active" } else { "Inactive" });
    if !active {
        return Ok(false);
    }

    // Page order: summary, directors, then the legal and activity tables.
    SUMMARY_REGION.apply(document, record)?;

    let (name, age) = director(document);
    record.set("Dirigeant Name", name);
    record.set("Dirigeant Age", age);

    for region in [&LEGAL_REGION, &ACTIVITY_REGION] {
        region.apply(document, record)?;
    }

    apply_update_dates(document, record);

    if let Some(ratios) = parse_ratio_table(document, preferred_years) {
        ratios.flatten_into(record, preferred_years);
    }

    Ok(true)
}

/// First listed director's name and age, "ND" for whatever is missing.
fn director(document: &Html) -> (String, String) {
    let Some(block) = document.select(&DIRECTOR).next() else {
        return (NOT_DISCLOSED.to_string(), NOT_DISCLOSED.to_string());
    };

    let name = block
        .select(&DIRECTOR_NAME)
        .next()
        .map(|a| PARENTHETICAL.replace_all(&text_of(a), "").into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| NOT_DISCLOSED.to_string());

    let age = block
        .select(&DIRECTOR_AGE)
        .next()
        .and_then(|span| {
            let text = text_of(span);
            AGE.captures(&text).map(|caps| caps[1].to_string())
        })
        .unwrap_or_else(|| NOT_DISCLOSED.to_string());

    (name, age)
}

/// Visits detail pages one at a time and turns them into records.
pub struct Extractor<'a, D: PageDriver> {
    driver: &'a D,
    preferred_years: &'a [String],
    pacing: Pacing,
}

impl<'a, D: PageDriver> Extractor<'a, D> {
    pub fn new(driver: &'a D, config: &'a Config) -> Self {
        Self {
            driver,
            preferred_years: &config.preferred_years,
            pacing: config.pacing,
        }
    }

    /// Never fails: a page that cannot be loaded or read yields a
    /// `Partial` record holding just the URL.
    pub async fn extract(&self, url: &str) -> Outcome {
        let outcome = match self.render(url).await {
            Ok(html) => parse_detail(&html, url, self.preferred_years),
            Err(e) => Outcome::Partial {
                record: CompanyRecord::new(url),
                error: ExtractError::Page(e.to_string()),
            },
        };
        self.pacing.jitter().await;
        outcome
    }

    async fn render(&self, url: &str) -> anyhow::Result<String> {
        self.driver.open(url)?;
        self.pacing.settle().await;
        self.driver.content()
    }

    /// Extracts every URL in order, keeping active and partial records.
    pub async fn extract_all<'u, I>(&self, urls: I) -> Vec<CompanyRecord>
    where
        I: IntoIterator<Item = &'u String>,
        I::IntoIter: ExactSizeIterator,
    {
        let urls = urls.into_iter();
        let total = urls.len();
        let mut records = Vec::with_capacity(total);

        for (idx, url) in urls.enumerate() {
            info!("[{}/{}] Scraping: {}", idx + 1, total, url);
            let outcome = self.extract(url).await;
            match &outcome {
                Outcome::Accepted(_) => {}
                Outcome::Inactive => info!(url = %url, "inactive company, skipped"),
                Outcome::Partial { error, .. } => {
                    warn!(url = %url, error = %error, "❌ extraction failed, keeping partial record")
                }
            }
            records.extend(outcome.into_record());
        }
        records
    }
}
