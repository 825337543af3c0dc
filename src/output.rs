//src/output.rs

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::metadata::SampleIds;
use crate::types::SequenceRecord;

/// File name without its last extension; a trailing `.gz` is removed first.
pub fn base_name<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    let path = if path.extension().map(|ext| ext == "gz").unwrap_or(false) {
        Path::new(path.file_stem().unwrap_or_default())
    } else {
        path
    };
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_count(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Recognises files this tool wrote, so reruns do not pick them up as inputs.
///
/// Only exact output shapes match: `extracted_sample_ids-<N>samples.txt`,
/// `<stem>-filtered-<S>samples-<R>otus.txt` and
/// `<stem>_filtered_<K>_sequences_min<T>reads.fa`.
pub fn is_generated_output(file_name: &str) -> bool {
    is_sample_ids_name(file_name)
        || is_reduced_table_name(file_name)
        || is_filtered_sequences_name(file_name)
}

fn is_sample_ids_name(name: &str) -> bool {
    name.strip_prefix("extracted_sample_ids-")
        .and_then(|rest| rest.strip_suffix("samples.txt"))
        .map(is_count)
        .unwrap_or(false)
}

fn is_reduced_table_name(name: &str) -> bool {
    let Some(rest) = name.strip_suffix("otus.txt") else {
        return false;
    };
    let Some((head, n_otus)) = rest.rsplit_once("samples-") else {
        return false;
    };
    match head.rsplit_once("-filtered-") {
        Some((stem, n_samples)) => !stem.is_empty() && is_count(n_samples) && is_count(n_otus),
        None => false,
    }
}

fn is_filtered_sequences_name(name: &str) -> bool {
    let Some(rest) = name.strip_suffix("reads.fa") else {
        return false;
    };
    let Some((head, threshold)) = rest.rsplit_once("_sequences_min") else {
        return false;
    };
    match head.rsplit_once("_filtered_") {
        Some((stem, n_sequences)) => {
            !stem.is_empty() && is_count(n_sequences) && is_count(threshold)
        }
        None => false,
    }
}

pub fn sample_ids_path(output_dir: &Path, n_samples: usize) -> PathBuf {
    output_dir.join(format!("extracted_sample_ids-{}samples.txt", n_samples))
}

pub fn reduced_table_path(
    output_dir: &Path,
    otu_table: &Path,
    n_samples: usize,
    n_otus: usize,
) -> PathBuf {
    output_dir.join(format!(
        "{}-filtered-{}samples-{}otus.txt",
        base_name(otu_table),
        n_samples,
        n_otus
    ))
}

pub fn filtered_sequences_path(
    output_dir: &Path,
    sequences: &Path,
    n_sequences: usize,
    threshold: u64,
) -> PathBuf {
    output_dir.join(format!(
        "{}_filtered_{}_sequences_min{}reads.fa",
        base_name(sequences),
        n_sequences,
        threshold
    ))
}

/// One sample ID per line.
pub fn write_sample_ids<P: AsRef<Path>>(path: P, ids: &SampleIds) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for id in ids.iter() {
        writeln!(writer, "{}", id)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes each record's original text back to back.
pub fn write_records<P: AsRef<Path>>(path: P, records: &[SequenceRecord]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        writer.write_all(&record.text)?;
    }
    writer.flush()?;
    Ok(())
}
