// Flat-file Catalog Persistence
// Line-oriented comma-delimited reader/writer for the full record set,
// plus the auxiliary key listing. Bulk load goes through repeated
// single-record insertion, so the engine sees no special load path.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::contracts::{Catalog, Record};

/// Decode one line as `name,category,location,...`.
///
/// Missing fields decode as empty strings and an empty line decodes as an
/// all-empty record; the key is re-derived from whatever name was read.
pub fn decode_line(line: &str) -> Record {
    let mut fields = line.split(',').map(str::to_string);
    let name = fields.next().unwrap_or_default();
    let category = fields.next().unwrap_or_default();
    let locations: Vec<String> = fields.collect();
    Record::new(name, category, locations)
}

/// Encode a record back to the same delimited line format.
pub fn encode_line(record: &Record) -> String {
    let mut line = format!("{},{}", record.name(), record.category());
    for location in record.locations() {
        line.push(',');
        line.push_str(location);
    }
    line
}

/// Load every record from `path` into the catalog.
///
/// Returns the number of records inserted. An unreadable source is an
/// error and leaves the catalog untouched; callers are expected to report
/// it and carry on rather than abort.
pub async fn load_catalog(path: impl AsRef<Path>, catalog: &mut impl Catalog) -> Result<usize> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;

    let mut loaded = 0;
    for line in contents.lines() {
        catalog.insert(decode_line(line));
        loaded += 1;
    }

    debug!(file = %path.display(), records = loaded, "catalog loaded");
    Ok(loaded)
}

/// Write every record to `path` in traversal (key) order.
///
/// Returns the number of records written. An unwritable target is an
/// error; the catalog itself is never modified by saving.
pub async fn save_catalog(path: impl AsRef<Path>, catalog: &impl Catalog) -> Result<usize> {
    let path = path.as_ref();
    let records = catalog.traverse();

    let mut out = String::new();
    for record in &records {
        out.push_str(&encode_line(record));
        out.push('\n');
    }

    fs::write(path, out)
        .await
        .with_context(|| format!("Failed to write catalog file: {}", path.display()))?;

    debug!(file = %path.display(), records = records.len(), "catalog saved");
    Ok(records.len())
}

/// Write just the derived keys to `path`, one per line, in traversal order.
pub async fn save_keys(path: impl AsRef<Path>, catalog: &impl Catalog) -> Result<usize> {
    let path = path.as_ref();
    let records = catalog.traverse();

    let mut out = String::new();
    for record in &records {
        out.push_str(record.key().as_str());
        out.push('\n');
    }

    fs::write(path, out)
        .await
        .with_context(|| format!("Failed to write key listing: {}", path.display()))?;

    debug!(file = %path.display(), keys = records.len(), "key listing saved");
    Ok(records.len())
}
