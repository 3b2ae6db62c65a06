use anyhow::Result;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::config::Config;
use crate::pacing::Pacing;
use crate::session::PageDriver;

/// Detail pages live under this path on the registry site.
pub const DETAIL_PATH_PREFIX: &str = "/entreprise/";
pub const NEXT_PAGE_SELECTOR: &str = ".pagination-image-right";

/// Deduplicated, sorted detail-page URLs.
pub type LinkSet = BTreeSet<String>;

/// Fixed search filters sent with every listing query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListingFilter {
    pub active_only: bool,
    pub income_min: u64,
    pub income_max: u64,
    pub headcount_min: u32,
    pub headcount_max: u32,
    pub director_age_min: u32,
    pub director_age_max: u32,
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            active_only: true,
            income_min: 100_000,
            income_max: 10_000_000,
            headcount_min: 3,
            headcount_max: 250,
            director_age_min: 50,
            director_age_max: 100,
        }
    }
}

pub fn listing_url(base_url: &str, filter: &ListingFilter, key: &str) -> String {
    format!(
        "{}/recherche?en_activite={}&resultat_min={}&resultat_max={}\
         &effectifs_min={}&effectifs_max={}\
         &age_dirigeant_min={}&age_dirigeant_max={}&ville={}",
        base_url,
        filter.active_only,
        filter.income_min,
        filter.income_max,
        filter.headcount_min,
        filter.headcount_max,
        filter.director_age_min,
        filter.director_age_max,
        urlencoding::encode(key),
    )
}

/// All detail-page links on a listing page, made absolute against `base_url`.
pub fn extract_links(html: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").unwrap();

    document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.starts_with(DETAIL_PATH_PREFIX))
        .map(|href| format!("{}{}", base_url, href))
        .collect()
}

/// Paginates listing pages for each search key and collects detail links.
pub struct Harvester<'a, D: PageDriver> {
    driver: &'a D,
    base_url: &'a str,
    filter: &'a ListingFilter,
    max_pages: u32,
    pacing: Pacing,
}

impl<'a, D: PageDriver> Harvester<'a, D> {
    pub fn new(driver: &'a D, config: &'a Config) -> Self {
        Self {
            driver,
            base_url: &config.base_url,
            filter: &config.filter,
            max_pages: config.max_pages,
            pacing: config.pacing,
        }
    }

    /// Runs every key in turn. A key whose first listing page cannot be
    /// opened is skipped.
    pub async fn harvest(&self, keys: &[String]) -> LinkSet {
        let mut links = LinkSet::new();
        for key in keys {
            info!(postal_code = %key, "Searching in postal code");
            match self.harvest_key(key, &mut links).await {
                Ok(pages) => info!(postal_code = %key, pages, total = links.len(), "postal code done"),
                Err(e) => warn!(postal_code = %key, error = %e, "⚠️ listing unavailable, skipping"),
            }
        }
        links
    }

    /// Walks one key's result pages, adding links to `links`. Returns the
    /// number of pages read. Only a failure to open the first page is an
    /// error; later failures end the walk with what was collected.
    pub async fn harvest_key(&self, key: &str, links: &mut LinkSet) -> Result<u32> {
        let url = listing_url(self.base_url, self.filter, key);
        self.driver.open(&url)?;
        self.pacing.settle().await;

        let mut page = 1;
        loop {
            let html = match self.driver.content() {
                Ok(html) => html,
                Err(e) => {
                    warn!(postal_code = %key, page, error = %e, "could not read listing page");
                    return Ok(page - 1);
                }
            };
            let found = extract_links(&html, self.base_url);
            info!(postal_code = %key, page, found = found.len(), "[{}] PAGE {}", key, page);
            links.extend(found);

            if page >= self.max_pages {
                info!(postal_code = %key, max_pages = self.max_pages, "page cap reached");
                return Ok(page);
            }

            self.pacing.jitter().await;
            match self.driver.activate(NEXT_PAGE_SELECTOR) {
                Ok(true) => {}
                Ok(false) => return Ok(page),
                Err(e) => {
                    warn!(postal_code = %key, page, error = %e, "could not open next listing page");
                    return Ok(page);
                }
            }
            self.pacing.settle().await;
            page += 1;
        }
    }
}
