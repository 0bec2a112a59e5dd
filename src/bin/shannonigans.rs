//! Command line front end: segment a file and print a per-segment report.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use shannonigans::changepoint::{
    segment_with_cost, CostKind, DynpConfig, PeltConfig, Segmentation, SegmentationConfig,
};
use shannonigans::logging;
use shannonigans::summary::{summarize, SegmentSummary};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogOutputFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CostArg {
    Entropy,
    L2,
}

impl From<CostArg> for CostKind {
    fn from(value: CostArg) -> Self {
        match value {
            CostArg::Entropy => CostKind::Entropy,
            CostArg::L2 => CostKind::L2,
        }
    }
}

/// Detect entropy change points in a binary file.
///
/// Without `--penalty` the exact search places `--n-bkps` breakpoints; with
/// it the penalized search picks the number of breakpoints itself.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the binary file to analyse.
    file: PathBuf,

    /// Number of breakpoints for the exact search.
    #[arg(long, default_value_t = 5, env = "SHANNONIGANS_N_BKPS")]
    n_bkps: usize,

    /// Per-breakpoint penalty; selects the penalized search.
    #[arg(long, env = "SHANNONIGANS_PENALTY", conflicts_with = "n_bkps")]
    penalty: Option<f64>,

    /// Minimum segment length in bytes.
    #[arg(long, default_value_t = 2, env = "SHANNONIGANS_MIN_SIZE")]
    min_size: usize,

    /// Only place breakpoints at multiples of this many bytes.
    #[arg(long, default_value_t = 1, env = "SHANNONIGANS_JUMP")]
    jump: usize,

    #[arg(long, value_enum, default_value = "entropy")]
    cost: CostArg,

    #[arg(short = 'f', long, value_enum, default_value = "table")]
    format: OutputFormat,

    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    log_format: LogOutputFormat,
}

impl Args {
    fn config(&self) -> SegmentationConfig {
        match self.penalty {
            Some(penalty) => SegmentationConfig::Penalized(
                PeltConfig::new(penalty)
                    .min_size(self.min_size)
                    .jump(self.jump),
            ),
            None => SegmentationConfig::Exact(
                DynpConfig::new(self.n_bkps)
                    .min_size(self.min_size)
                    .jump(self.jump),
            ),
        }
    }
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    file: String,
    len: usize,
    cost_function: &'static str,
    penalty: Option<f64>,
    breakpoints: &'a [usize],
    cost: f64,
    segments: &'a SegmentSummary,
}

fn print_table(summary: &SegmentSummary) {
    let header = format!(
        "| {:>7} | {:>10} | {:>10} | {:>10} | {:>9} | {:>10} | {:>5} |",
        "Segment", "Start", "End", "Length", "Bits/byte", "Normalized", "Class"
    );
    let rule: String = header
        .chars()
        .map(|c| if c == '|' { '+' } else { '-' })
        .collect();

    println!("{rule}");
    println!("{header}");
    println!("{rule}");
    for segment in summary {
        let class = segment
            .class
            .map(|c| c.to_string())
            .unwrap_or_default();
        println!(
            "| {:>7} | {:>10} | {:>10} | {:>10} | {:>9.6} | {:>10.6} | {:>5} |",
            segment.index + 1,
            segment.start,
            segment.end,
            segment.length,
            segment.entropy_bits(),
            segment.entropy,
            class
        );
    }
    println!("{rule}");
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.log_format {
        LogOutputFormat::Json => logging::init_tracing_json("warn"),
        LogOutputFormat::Pretty => logging::init_tracing("warn"),
    }

    let buffer = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    tracing::info!(file = %args.file.display(), len = buffer.len(), "loaded input");

    let kind = CostKind::from(args.cost);
    let config = args.config();
    let mut cost = kind.build(config.min_size_value());

    let Segmentation {
        breakpoints,
        cost: total,
        penalty,
    } = segment_with_cost(cost.as_mut(), &buffer, &config)
        .with_context(|| format!("segmentation of {} failed", args.file.display()))?;

    let summary = summarize(&buffer, breakpoints.as_slice())?;

    match args.format {
        OutputFormat::Json => {
            let report = Report {
                file: args.file.display().to_string(),
                len: buffer.len(),
                cost_function: kind.name(),
                penalty,
                breakpoints: breakpoints.as_slice(),
                cost: total,
                segments: &summary,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            println!("detected change points: {:?}", breakpoints.as_slice());
            println!("total cost: {total:.6}");
            println!();
            print_table(&summary);
        }
    }

    Ok(())
}
