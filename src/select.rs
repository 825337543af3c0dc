//src/select.rs

use std::io::{self, BufRead};
use std::path::Path;

use ahash::AHashSet;
use log::debug;

use crate::error::Result;
use crate::fasta::{open_sequence_reader, FastaRecords};
use crate::types::SequenceRecord;

/// Collects, in input order, every record whose identifier is in `surviving`.
///
/// Records come back byte-identical to the input. Bodies of records that
/// are not kept are skipped without buffering.
pub fn select_records<R: BufRead>(
    reader: R,
    surviving: &AHashSet<String>,
) -> io::Result<Vec<SequenceRecord>> {
    FastaRecords::filtered(reader, |id: &str| surviving.contains(id)).collect()
}

/// Same as [`select_records`], reading from a (possibly gzipped) FASTA file.
pub fn select_records_from_file<P: AsRef<Path>>(
    path: P,
    surviving: &AHashSet<String>,
) -> Result<Vec<SequenceRecord>> {
    let path = path.as_ref();
    let reader = open_sequence_reader(path)?;
    let records = select_records(reader, surviving)?;
    debug!("Selected {} records from {}", records.len(), path.display());
    Ok(records)
}
