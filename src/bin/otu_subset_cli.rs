use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use otu_subset::config::{FilterConfig, InputOverrides, InputPaths, ThresholdInput};
use otu_subset::error::Result;
use otu_subset::filter_otu_subset;
use otu_subset::membership::RetentionPolicy;

/// CLI-friendly retention policy
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPolicy {
    /// Keep OTUs whose summed reads over the retained samples are above zero
    Sum,
    /// Keep OTUs with more than --min-reads reads in at least one retained sample
    Threshold,
}

impl From<CliPolicy> for RetentionPolicy {
    fn from(policy: CliPolicy) -> Self {
        match policy {
            CliPolicy::Sum => RetentionPolicy::Sum,
            CliPolicy::Threshold => RetentionPolicy::Threshold,
        }
    }
}

/// Subset an OTU table and its FASTA sequences to the samples in a metadata sheet
#[derive(Parser)]
#[command(name = "otu-subset")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory searched for any input not given explicitly
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Metadata sheet (CSV or TSV) with a "Sample ID" column
    #[arg(short, long)]
    metadata: Option<PathBuf>,

    /// Tab-separated OTU table with an "SH_name" column
    #[arg(short = 't', long)]
    otu_table: Option<PathBuf>,

    /// FASTA file, optionally gzipped
    #[arg(short, long)]
    sequences: Option<PathBuf>,

    /// Where outputs are written (default: --dir)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Retention policy
    #[arg(short, long, value_enum, default_value = "sum")]
    policy: CliPolicy,

    /// Minimum number of reads; blank or invalid values fall back to 0
    #[arg(long, allow_hyphen_values = true)]
    min_reads: Option<String>,

    /// Ask for the minimum number of reads on stdin
    #[arg(long, conflicts_with = "min_reads")]
    prompt: bool,
}

fn spinner(color: &str, msg: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&[
                "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
            ])
            .template(&format!("{{spinner:.{}}} {{msg}}", color))
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(msg.to_string());
    spinner
}

fn read_threshold_from_stdin() -> Result<String> {
    print!("Enter the minimum number of reads to include OTUs (default is > 0): ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

fn run(cli: Cli) -> Result<()> {
    // 1. Locate inputs
    let spinner_find = spinner("blue", "Locating input files...");
    let inputs = InputPaths::discover(
        &cli.dir,
        InputOverrides {
            metadata: cli.metadata,
            otu_table: cli.otu_table,
            sequences: cli.sequences,
        },
    );
    let inputs = match inputs {
        Ok(inputs) => inputs,
        Err(e) => {
            spinner_find.finish_and_clear();
            return Err(e);
        }
    };
    spinner_find.finish_with_message(format!(
        "Using {}, {}, {}",
        inputs.metadata.display(),
        inputs.otu_table.display(),
        inputs.sequences.display()
    ));

    // 2. Threshold
    let raw_threshold = if cli.prompt {
        read_threshold_from_stdin()?
    } else {
        cli.min_reads.unwrap_or_default()
    };

    let config = FilterConfig {
        inputs,
        output_dir: cli.output_dir.unwrap_or_else(|| cli.dir.clone()),
        policy: cli.policy.into(),
        threshold: ThresholdInput::parse(&raw_threshold),
    };

    // 3. Filter and write
    let spinner_run = spinner("green", "Filtering OTUs and sequences...");
    let report = match filter_otu_subset(&config) {
        Ok(report) => report,
        Err(e) => {
            spinner_run.finish_and_clear();
            return Err(e);
        }
    };
    spinner_run.finish_with_message("Output files created.");

    // 4. Summary
    for line in report.summary_lines() {
        println!("{}", line);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
