// src/lib.rs
pub mod config;
pub mod error;
pub mod fasta;
pub mod membership;
pub mod metadata;
pub mod otu_table;
pub mod output;
pub mod select;
pub mod types;

use std::fs;
use std::path::PathBuf;

use log::{info, warn};

use crate::config::FilterConfig;
use crate::error::Result;
use crate::membership::{compute_membership, RetentionPolicy};
use crate::metadata::load_sample_ids;
use crate::otu_table::OtuTable;
use crate::output::{
    filtered_sequences_path, reduced_table_path, sample_ids_path, write_records,
    write_sample_ids,
};
use crate::select::select_records_from_file;

/// What a run produced: artifact paths and the counts encoded in them.
#[derive(Debug, Clone)]
pub struct FilterReport {
    pub policy: RetentionPolicy,
    /// Threshold the operator ended up with (0 when defaulted).
    pub threshold: u64,

    /// Distinct sample IDs in the metadata sheet.
    pub metadata_samples: usize,
    /// Sample ID list, written under the sum policy only.
    pub sample_ids_path: Option<PathBuf>,

    /// Sample columns shared by the metadata and the OTU table.
    pub n_samples: usize,
    /// OTUs that passed the retention rule.
    pub n_otus: usize,
    /// Reduced OTU table, written under the sum policy only.
    pub reduced_table_path: Option<PathBuf>,

    pub n_sequences: usize,
    pub sequences_path: PathBuf,
}

impl FilterReport {
    /// Console summary, one artifact or count per line.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(path) = &self.sample_ids_path {
            lines.push(format!("Sample IDs file saved as: {}", path.display()));
        }
        if let Some(path) = &self.reduced_table_path {
            lines.push(format!("Intermediary OTU table saved as: {}", path.display()));
        }
        lines.push(format!(
            "Filtered FASTA file saved as: {}",
            self.sequences_path.display()
        ));
        lines.push(format!(
            "Total sequences in the filtered FASTA file: {}",
            self.n_sequences
        ));
        lines.push(format!("Number of samples retained: {}", self.n_samples));
        lines.push(format!(
            "Number of OTUs retained ({} policy, min reads {}): {}",
            self.policy, self.threshold, self.n_otus
        ));
        lines
    }
}

/// Runs the whole filter: metadata -> OTU table -> surviving OTUs -> FASTA.
///
/// Every input is read and validated before the first output file is
/// created, so a failed run leaves nothing behind.
pub fn filter_otu_subset(config: &FilterConfig) -> Result<FilterReport> {
    // 1. All inputs must be present
    config.inputs.ensure_exist()?;

    if let Some(notice) = &config.threshold.notice {
        warn!("{}", notice);
    }
    let threshold = config.threshold.value;

    // 2. Metadata and OTU table
    let sample_ids = load_sample_ids(&config.inputs.metadata)?;
    info!("Metadata lists {} sample IDs", sample_ids.len());
    let table = OtuTable::from_tsv(&config.inputs.otu_table)?;

    // 3. Surviving OTUs
    let membership = compute_membership(&table, &sample_ids, config.policy, threshold);
    let n_samples = membership.allowed_samples().len();
    let n_otus = membership.surviving.len();

    // 4. Matching sequences
    let records = select_records_from_file(&config.inputs.sequences, &membership.surviving)?;
    info!("Retained {} sequences", records.len());

    // 5. Outputs
    fs::create_dir_all(&config.output_dir)?;

    let (ids_path, table_path) = if config.policy.writes_intermediates() {
        let ids_path = sample_ids_path(&config.output_dir, sample_ids.len());
        write_sample_ids(&ids_path, &sample_ids)?;

        let table_path = reduced_table_path(
            &config.output_dir,
            &config.inputs.otu_table,
            n_samples,
            n_otus,
        );
        membership.table.to_tsv(&table_path)?;
        (Some(ids_path), Some(table_path))
    } else {
        (None, None)
    };

    let sequences_path = filtered_sequences_path(
        &config.output_dir,
        &config.inputs.sequences,
        records.len(),
        threshold,
    );
    write_records(&sequences_path, &records)?;

    Ok(FilterReport {
        policy: config.policy,
        threshold,
        metadata_samples: sample_ids.len(),
        sample_ids_path: ids_path,
        n_samples,
        n_otus,
        reduced_table_path: table_path,
        n_sequences: records.len(),
        sequences_path,
    })
}
