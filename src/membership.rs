//src/membership.rs

use std::fmt;

use ahash::AHashSet;
use log::{debug, info};

use crate::metadata::SampleIds;
use crate::otu_table::{OtuRow, OtuTable};

/// Rule deciding whether an OTU row survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionPolicy {
    /// Keep rows whose reduced-sample total is above zero. The operator
    /// threshold is recorded in output names but not applied. Also writes
    /// the sample ID list and the reduced table.
    #[default]
    Sum,
    /// Keep rows where at least one reduced-sample count exceeds the
    /// threshold. No intermediate artifacts.
    Threshold,
}

impl RetentionPolicy {
    pub fn retains(&self, row: &OtuRow, threshold: u64) -> bool {
        match self {
            RetentionPolicy::Sum => row.total() > 0,
            RetentionPolicy::Threshold => row.max_count() > threshold,
        }
    }

    /// Whether the sample ID list and reduced table are written.
    pub fn writes_intermediates(&self) -> bool {
        matches!(self, RetentionPolicy::Sum)
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetentionPolicy::Sum => write!(f, "sum"),
            RetentionPolicy::Threshold => write!(f, "threshold"),
        }
    }
}

/// Result of joining the metadata against the OTU table.
#[derive(Debug, Clone)]
pub struct Membership {
    /// Table restricted to allowed samples and surviving rows.
    pub table: OtuTable,
    /// `SH_name`s of the surviving rows.
    pub surviving: AHashSet<String>,
}

impl Membership {
    pub fn allowed_samples(&self) -> &[String] {
        self.table.sample_ids()
    }

    pub fn is_surviving(&self, otu_id: &str) -> bool {
        self.surviving.contains(otu_id)
    }
}

/// Reduces `table` to the samples named in `samples` and applies `policy`.
pub fn compute_membership(
    table: &OtuTable,
    samples: &SampleIds,
    policy: RetentionPolicy,
    threshold: u64,
) -> Membership {
    let reduced = table.reduce_to_samples(samples);
    debug!(
        "{} of {} table samples are listed in the metadata",
        reduced.n_samples(),
        table.n_samples()
    );

    let kept = reduced.retain_rows(|row| policy.retains(row, threshold));
    let surviving: AHashSet<String> = kept.rows().iter().map(|row| row.name.clone()).collect();
    info!(
        "{} policy kept {} of {} OTUs",
        policy,
        kept.n_otus(),
        reduced.n_otus()
    );

    Membership {
        table: kept,
        surviving,
    }
}
