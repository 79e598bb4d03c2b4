//! Jeopardy Stats - question dataset analysis CLI
//!
//! Loads the question CSV, derives features and prints term significance results.

use anyhow::Context;
use clap::Parser;
use jeopardy_stats::config::{HIGH_VALUE_THRESHOLD, MIN_TERM_LENGTH, SAMPLE_SIZE, SIGNIFICANCE_THRESHOLD};
use jeopardy_stats::{AnalysisConfig, DataLoader};
use polars::prelude::*;
use std::fs::File;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Question CSV with Show Number, Air Date, Round, Category, Value, Question, Answer
    input: PathBuf,

    /// Number of history terms to test
    #[arg(long, default_value_t = SAMPLE_SIZE)]
    sample_size: usize,

    /// Clean value above which a question is high-value
    #[arg(long, default_value_t = HIGH_VALUE_THRESHOLD)]
    threshold: u64,

    /// Question terms must be longer than this to be tracked
    #[arg(long, default_value_t = MIN_TERM_LENGTH)]
    min_term_length: usize,

    /// Significance level for the chi-squared test
    #[arg(long, default_value_t = SIGNIFICANCE_THRESHOLD)]
    alpha: f64,

    /// Rows of the enriched frame to print
    #[arg(long, default_value_t = 5)]
    head: usize,

    /// Write the report as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write the enriched frame as CSV
    #[arg(long)]
    export: Option<PathBuf>,

    /// Debug logging unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            high_value_threshold: self.threshold,
            min_term_length: self.min_term_length,
            sample_size: self.sample_size,
            significance_level: self.alpha,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "jeopardy_stats=debug"
    } else {
        "jeopardy_stats=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let config = args.config();

    let table = DataLoader::load_table(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    let (processed, report) =
        jeopardy_stats::analyze(table, &config).context("running term tests")?;

    let mut df = processed
        .to_dataframe()
        .context("building enriched frame")?;
    println!("{}", df.head(Some(args.head)));
    println!();
    print!("{}", report.render());

    if let Some(path) = &args.json {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &report).context("writing JSON report")?;
        info!(path = %path.display(), "wrote report");
    }

    if let Some(path) = &args.export {
        let mut file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        CsvWriter::new(&mut file)
            .finish(&mut df)
            .context("writing enriched CSV")?;
        info!(path = %path.display(), rows = df.height(), "exported frame");
    }

    Ok(())
}
