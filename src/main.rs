mod config;
mod export;
mod extract;
mod harvest;
mod normalize;
mod pacing;
mod reconcile;
mod session;
#[cfg(test)]
mod testing;
mod translate;

use anyhow::Result;
use dotenv::dotenv;
use tracing::info;

use crate::config::Config;
use crate::extract::Extractor;
use crate::harvest::Harvester;
use crate::reconcile::reconcile;
use crate::session::{BrowserSession, PageDriver};

#[derive(Debug)]
struct Summary {
    links: usize,
    rows: usize,
    columns: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::load()?;
    info!(postal_codes = config.postalcodes.len(), "configuration loaded");
    export::reset_outputs(&[config.links_file.as_path(), config.csv_file.as_path()])?;

    let session = BrowserSession::launch(&config.browser)?;
    let result = crawl(&session, &config).await;
    session.close();
    let summary = result?;

    info!(
        links = summary.links,
        rows = summary.rows,
        columns = summary.columns,
        "Done - Links saved into '{}' > Data saved into '{}'",
        config.links_file.display(),
        config.csv_file.display()
    );
    Ok(())
}

/// Harvest, persist links, extract every detail page, then export the table.
async fn crawl<D: PageDriver>(driver: &D, config: &Config) -> Result<Summary> {
    let links = Harvester::new(driver, config).harvest(&config.postalcodes).await;
    export::write_links(&config.links_file, &links)?;
    info!(links = links.len(), path = %config.links_file.display(), "💾 links saved");

    let records = Extractor::new(driver, config).extract_all(&links).await;
    let table = reconcile(records, &config.preferred_years);
    export::write_table(&config.csv_file, &table)?;

    Ok(Summary {
        links: links.len(),
        rows: table.rows.len(),
        columns: table.schema.len(),
    })
}
