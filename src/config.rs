use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::env;
use std::path::{Path, PathBuf};

use crate::harvest::ListingFilter;
use crate::pacing::Pacing;
use crate::session::BrowserOptions;

pub const DEFAULT_BASE_URL: &str = "https://www.pappers.fr";
pub const DEFAULT_MAX_PAGES: u32 = 20;
pub const DEFAULT_PREFERRED_YEARS: [&str; 4] = ["2023", "2022", "2021", "2020"];

/// Run configuration, read from `config.json` (or `$CRAWLER_CONFIG`).
/// Only `postalcodes` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "search_keys")]
    pub postalcodes: Vec<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Newest first.
    #[serde(default = "default_preferred_years")]
    pub preferred_years: Vec<String>,
    #[serde(default)]
    pub filter: ListingFilter,
    #[serde(default)]
    pub pacing: Pacing,
    #[serde(default)]
    pub browser: BrowserOptions,
    #[serde(default = "default_links_file")]
    pub links_file: PathBuf,
    #[serde(default = "default_csv_file")]
    pub csv_file: PathBuf,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_preferred_years() -> Vec<String> {
    DEFAULT_PREFERRED_YEARS.iter().map(|y| y.to_string()).collect()
}

fn default_links_file() -> PathBuf {
    PathBuf::from("linksfile.txt")
}

fn default_csv_file() -> PathBuf {
    PathBuf::from("companies.csv")
}

// Postal codes are often written as bare numbers in the JSON file.
fn search_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|value| match value {
            serde_json::Value::String(s) => Ok(s.trim().to_string()),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "postal code must be a string or a number, got {}",
                other
            ))),
        })
        .collect()
}

impl Config {
    /// Loads the config file named by `CRAWLER_CONFIG` (default `config.json`)
    /// and applies `LINKS_FILE` / `CSV_FILE` overrides from the environment.
    pub fn load() -> Result<Self> {
        let path = env::var("CRAWLER_CONFIG").unwrap_or_else(|_| "config.json".to_string());
        let mut config = Self::from_file(&path)?;

        if let Ok(links) = env::var("LINKS_FILE") {
            config.links_file = PathBuf::from(links);
        }
        if let Ok(csv) = env::var("CSV_FILE") {
            config.csv_file = PathBuf::from(csv);
        }
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let mut config: Config = serde_json::from_str(text)?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }
}
