//src/config.rs

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{OtuSubsetError, Result};
use crate::membership::RetentionPolicy;
use crate::output::is_generated_output;

const METADATA_EXTENSIONS: &[&str] = &[".xlsx", ".xls", ".csv", ".tsv"];
const OTU_TABLE_EXTENSIONS: &[&str] = &[".txt"];
const SEQUENCE_EXTENSIONS: &[&str] = &[".fa", ".fasta", ".fa.gz", ".fasta.gz"];

/// Locations of the three required input artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub metadata: PathBuf,
    pub otu_table: PathBuf,
    pub sequences: PathBuf,
}

/// Explicitly supplied paths; `None` entries are discovered.
#[derive(Debug, Clone, Default)]
pub struct InputOverrides {
    pub metadata: Option<PathBuf>,
    pub otu_table: Option<PathBuf>,
    pub sequences: Option<PathBuf>,
}

impl InputPaths {
    /// Fills in every artifact not given in `overrides` by scanning `dir`.
    ///
    /// The first matching file name (sorted) wins; files written by earlier
    /// runs are skipped. All artifacts that cannot be located are reported
    /// together.
    pub fn discover<P: AsRef<Path>>(dir: P, overrides: InputOverrides) -> Result<Self> {
        let dir = dir.as_ref();
        let needs_scan = overrides.metadata.is_none()
            || overrides.otu_table.is_none()
            || overrides.sequences.is_none();
        let mut names: Vec<PathBuf> = if needs_scan && dir.is_dir() {
            fs::read_dir(dir)?
                .filter_map(|entry| {
                    let path = entry.ok()?.path();
                    let name = path.file_name()?.to_string_lossy().into_owned();
                    if path.is_file() && !is_generated_output(&name) {
                        Some(path)
                    } else {
                        None
                    }
                })
                .collect()
        } else {
            Vec::new()
        };
        names.sort();

        let find = |exts: &[&str]| -> Option<PathBuf> {
            names
                .iter()
                .find(|path| {
                    let filename = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_lowercase())
                        .unwrap_or_default();
                    exts.iter().any(|ext| filename.ends_with(ext))
                })
                .cloned()
        };

        let metadata = overrides.metadata.or_else(|| find(METADATA_EXTENSIONS));
        let otu_table = overrides.otu_table.or_else(|| find(OTU_TABLE_EXTENSIONS));
        let sequences = overrides.sequences.or_else(|| find(SEQUENCE_EXTENSIONS));
        debug!(
            "Discovered in {}: metadata={:?} otu_table={:?} sequences={:?}",
            dir.display(),
            metadata,
            otu_table,
            sequences
        );

        match (metadata, otu_table, sequences) {
            (Some(metadata), Some(otu_table), Some(sequences)) => {
                let paths = Self {
                    metadata,
                    otu_table,
                    sequences,
                };
                paths.ensure_exist()?;
                Ok(paths)
            }
            (metadata, otu_table, sequences) => {
                let mut missing = Vec::new();
                if metadata.is_none() {
                    missing.push(format!("metadata sheet (.xlsx/.xls/.csv/.tsv) in {}", dir.display()));
                }
                if otu_table.is_none() {
                    missing.push(format!("OTU table (.txt) in {}", dir.display()));
                }
                if sequences.is_none() {
                    missing.push(format!("FASTA file (.fa/.fasta) in {}", dir.display()));
                }
                Err(OtuSubsetError::MissingInput(missing))
            }
        }
    }

    /// Fails with `MissingInput` naming every path that is not a file.
    pub fn ensure_exist(&self) -> Result<()> {
        let missing: Vec<String> = [
            ("metadata sheet", &self.metadata),
            ("OTU table", &self.otu_table),
            ("FASTA file", &self.sequences),
        ]
        .iter()
        .filter(|(_, path)| !path.is_file())
        .map(|(what, path)| format!("{} {}", what, path.display()))
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(OtuSubsetError::MissingInput(missing))
        }
    }
}

/// Why the operator's threshold was replaced by the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThresholdNotice {
    Empty,
    Invalid(String),
}

impl fmt::Display for ThresholdNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdNotice::Empty => {
                write!(f, "No minimum read threshold given. Using default minimum threshold of > 0.")
            }
            ThresholdNotice::Invalid(raw) => write!(
                f,
                "Invalid input '{}'. Using default minimum threshold of > 0.",
                raw
            ),
        }
    }
}

/// Minimum-read threshold as entered by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdInput {
    pub value: u64,
    pub notice: Option<ThresholdNotice>,
}

impl ThresholdInput {
    /// Never fails: blank or non-integer input falls back to 0 with a notice.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self {
                value: 0,
                notice: Some(ThresholdNotice::Empty),
            };
        }
        match trimmed.parse::<u64>() {
            Ok(value) => Self {
                value,
                notice: None,
            },
            Err(_) => Self {
                value: 0,
                notice: Some(ThresholdNotice::Invalid(trimmed.to_string())),
            },
        }
    }
}

impl Default for ThresholdInput {
    fn default() -> Self {
        Self::parse("")
    }
}

/// Everything a filtering run needs.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub inputs: InputPaths,
    pub output_dir: PathBuf,
    pub policy: RetentionPolicy,
    pub threshold: ThresholdInput,
}
