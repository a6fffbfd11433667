use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Load a dataset from a CSV file.  The first row is the header; every cell
/// is type-guessed individually (integer, float, text, empty → null).
/// Ragged rows are rejected as malformed.
pub fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening CSV file {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() {
        bail!("CSV file has no header row");
    }

    let mut columns: BTreeMap<String, Vec<CellValue>> = headers
        .iter()
        .map(|h| (h.clone(), Vec::new()))
        .collect();

    // Columns are keyed by name, so duplicate headers would silently merge.
    if columns.len() != headers.len() {
        let mut seen = std::collections::BTreeSet::new();
        let dup = headers
            .iter()
            .find(|h| !seen.insert(h.as_str()))
            .map(String::as_str)
            .unwrap_or_default();
        bail!("CSV header has duplicate column '{dup}'");
    }

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: expected {} fields, found {}",
                headers.len(),
                record.len()
            );
        }
        for (header, field) in headers.iter().zip(record.iter()) {
            if let Some(cells) = columns.get_mut(header) {
                cells.push(CellValue::parse(field));
            }
        }
    }

    Ok(Dataset::from_columns(headers, columns))
}

// ---------------------------------------------------------------------------
// DatasetCache – memoized loading keyed by file path
// ---------------------------------------------------------------------------

/// Session cache of loaded datasets.  Each distinct path is parsed at most
/// once; repeated loads are cheap, so the UI can go through the cache on
/// every interaction.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: BTreeMap<PathBuf, Dataset>,
}

impl DatasetCache {
    /// Load the dataset at `path`, parsing the file only on first access.
    pub fn load(&mut self, path: &Path) -> Result<&Dataset> {
        match self.entries.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let dataset = load_csv(path)?;
                log::info!(
                    "Loaded {} rows, {} columns from {}",
                    dataset.len(),
                    dataset.column_names.len(),
                    path.display()
                );
                Ok(entry.insert(dataset))
            }
        }
    }

    /// Drop the cache entry for `path` so the next load re-reads the file.
    pub fn invalidate(&mut self, path: &Path) {
        self.entries.remove(path);
    }

    /// Drop all cached datasets.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }
}
