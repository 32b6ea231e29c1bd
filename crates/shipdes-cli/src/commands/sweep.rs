//! `sweep` subcommand: range analysis written as CSV.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use shipdes_lib::{run_sweep, write_sweep_csv, SweepParameter};

use crate::commands::RequestArgs;

#[derive(Args, Debug, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Input to vary: speed, deadweight, teu, lb-ratio, breadth, bt-ratio or block.
    #[arg(long, value_parser = parse_parameter)]
    pub parameter: SweepParameter,

    #[arg(long)]
    pub start: f64,

    #[arg(long)]
    pub end: f64,

    /// Number of samples, both ends included.
    #[arg(long, default_value_t = 10)]
    pub steps: usize,

    /// CSV destination; stdout when omitted.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

fn parse_parameter(value: &str) -> std::result::Result<SweepParameter, String> {
    value
        .parse()
        .map_err(|err: shipdes_lib::Error| err.to_string())
}

/// Handle the sweep subcommand.
pub fn handle_sweep(args: &SweepArgs) -> Result<()> {
    let request = args.request.build()?;
    let run = run_sweep(&request, args.parameter, args.start, args.end, args.steps)
        .context("invalid sweep")?;

    let solved = run.points.iter().filter(|p| p.solved().is_some()).count();
    info!(samples = run.points.len(), solved, "sweep finished");

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_sweep_csv(BufWriter::new(file), &run)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "Wrote {} rows ({} solved) to {}",
                run.points.len(),
                solved,
                path.display()
            );
        }
        None => {
            write_sweep_csv(io::stdout().lock(), &run).context("failed to write CSV")?;
        }
    }
    Ok(())
}
