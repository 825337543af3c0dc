//src/metadata.rs

use std::io::Read;
use std::path::Path;

use ahash::AHashSet;
use calamine::{open_workbook_auto, Data, Reader};
use log::debug;

use crate::error::{OtuSubsetError, Result};
use crate::types::SAMPLE_ID_COLUMN;

/// Distinct sample IDs from a metadata sheet, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct SampleIds {
    ids: Vec<String>,
    lookup: AHashSet<String>,
}

impl SampleIds {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lookup.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    fn insert(&mut self, id: &str) {
        if self.lookup.insert(id.to_string()) {
            self.ids.push(id.to_string());
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for SampleIds {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut ids = SampleIds::default();
        for id in iter {
            ids.insert(id.as_ref());
        }
        ids
    }
}

/// Reads the `Sample ID` column of a metadata sheet.
///
/// `.xlsx`/`.xls` workbooks are read from their first worksheet; `.csv` is
/// comma-separated and anything else is treated as tab-separated.
pub fn load_sample_ids<P: AsRef<Path>>(path: P) -> Result<SampleIds> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let ids = match ext.as_str() {
        "xlsx" | "xls" => read_sample_ids_from_workbook(path)?,
        "csv" => read_sample_ids(std::fs::File::open(path)?, b',', path)?,
        _ => read_sample_ids(std::fs::File::open(path)?, b'\t', path)?,
    };
    debug!("Read {} distinct sample IDs from {}", ids.len(), path.display());
    Ok(ids)
}

/// Reads the `Sample ID` column from the first worksheet of a workbook.
///
/// Cells are taken as displayed: numeric IDs such as `101` come back as
/// `"101"`. Empty cells are skipped; other values are kept verbatim.
pub fn read_sample_ids_from_workbook(path: &Path) -> Result<SampleIds> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| OtuSubsetError::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: "workbook has no worksheets".to_string(),
        })??;

    let mut rows = range.rows();
    let header = rows.next().unwrap_or(&[]);
    let column = header
        .iter()
        .position(|cell| cell_text(cell) == SAMPLE_ID_COLUMN)
        .ok_or_else(|| OtuSubsetError::MissingColumn {
            column: SAMPLE_ID_COLUMN.to_string(),
            artifact: path.to_path_buf(),
        })?;

    let mut ids = SampleIds::default();
    for row in rows {
        if let Some(value) = row.get(column).map(cell_text) {
            if !value.is_empty() {
                ids.insert(&value);
            }
        }
    }
    Ok(ids)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Reads the `Sample ID` column from delimited text.
///
/// Values are kept verbatim, surrounding whitespace included, so they
/// compare against OTU table headers exactly. Empty cells are skipped.
pub fn read_sample_ids<R: Read>(reader: R, delimiter: u8, artifact: &Path) -> Result<SampleIds> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let column = rdr
        .headers()?
        .iter()
        .position(|h| h == SAMPLE_ID_COLUMN)
        .ok_or_else(|| OtuSubsetError::MissingColumn {
            column: SAMPLE_ID_COLUMN.to_string(),
            artifact: artifact.to_path_buf(),
        })?;

    let mut ids = SampleIds::default();
    for record in rdr.records() {
        let record = record?;
        if let Some(value) = record.get(column) {
            if !value.is_empty() {
                ids.insert(value);
            }
        }
    }
    Ok(ids)
}
