use anyhow::{Context, Result};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::harvest::LinkSet;
use crate::reconcile::Table;

/// Removes outputs left by a previous run.
pub fn reset_outputs(paths: &[&Path]) -> Result<()> {
    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => info!(path = %path.display(), "removed previous output"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("cannot remove {}", path.display())),
        }
    }
    Ok(())
}

/// One URL per line.
pub fn write_links(path: &Path, links: &LinkSet) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for link in links {
        writeln!(out, "{}", link)?;
    }
    out.flush()?;
    Ok(())
}

/// Display header first, then one line per record in schema order.
pub fn write_table_to<W: Write>(writer: W, table: &Table) -> Result<()> {
    let mut csv = csv::WriterBuilder::new().from_writer(writer);
    csv.write_record(&table.display)?;
    for row in &table.rows {
        csv.write_record(table.schema.iter().map(|field| row.get(field).unwrap_or("")))?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    write_table_to(file, table)
}
