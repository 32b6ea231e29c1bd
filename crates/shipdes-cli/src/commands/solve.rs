//! `solve` subcommand: one design case.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use shipdes_lib::{save_request, solve, ReportItem, ReportOptions};

use crate::commands::RequestArgs;
use crate::output::{render_design, OutputFormat};
use crate::terminal::ColorPalette;

/// Exit code for a request that solved to a failure status.
pub const EXIT_SOLVE_FAILED: u8 = 2;

#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Report item to leave out (repeatable), e.g. `range` or `emissions`.
    #[arg(long = "hide", value_parser = parse_item)]
    pub hide: Vec<ReportItem>,

    /// Case number printed in the report heading.
    #[arg(long, default_value_t = 1)]
    pub case: u32,

    /// Record a trace event per solver iteration (JSON output).
    #[arg(long)]
    pub trace: bool,

    /// Write the effective request to this file before solving.
    #[arg(long)]
    pub save: Option<PathBuf>,
}

fn parse_item(value: &str) -> std::result::Result<ReportItem, String> {
    value.parse().map_err(|err: shipdes_lib::Error| err.to_string())
}

/// Handle the solve subcommand.
///
/// Prints the report (or JSON result) and returns a failing exit code when
/// the solver did not reach a successful status.
pub fn handle_solve(args: &SolveArgs, format: OutputFormat, palette: &ColorPalette) -> Result<ExitCode> {
    let mut request = args.request.build()?;
    if args.trace {
        request.options.record_trace = true;
    }

    if let Some(path) = &args.save {
        save_request(path, &request)
            .with_context(|| format!("failed to save request to {}", path.display()))?;
    }

    let result = solve(&request).context("request rejected")?;
    info!(status = %result.status, iterations = result.iterations, "solve finished");

    let options = args
        .hide
        .iter()
        .fold(ReportOptions::default(), |options, item| options.hide(*item));
    let options = ReportOptions {
        case_number: args.case,
        ..options
    };
    print!("{}", render_design(&request, &result, &options, format, palette)?);
    if format == OutputFormat::Json {
        println!();
    }

    if result.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_SOLVE_FAILED))
    }
}
