use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use shipdes_cli::commands::route::{handle_route, RouteArgs};
use shipdes_cli::commands::solve::{handle_solve, SolveArgs};
use shipdes_cli::commands::sweep::{handle_sweep, SweepArgs};
use shipdes_cli::commands::types::handle_types;
use shipdes_cli::logging::{init_tracing, LogFormat};
use shipdes_cli::output::OutputFormat;
use shipdes_cli::terminal::ColorPalette;

#[derive(Parser, Debug)]
#[command(author, version, about = "Preliminary ship design calculator")]
struct Cli {
    /// Output format for results.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve one design case and print the report.
    Solve(SolveArgs),
    /// Solve a range of cases varying one input and write CSV.
    Sweep(SweepArgs),
    /// List the available ship and fuel types.
    Types,
    /// Estimate voyages per year on a trade route.
    Route(RouteArgs),
}

fn main() -> Result<ExitCode> {
    init_tracing(LogFormat::from_env());
    let cli = Cli::parse();
    let palette = if cli.no_color {
        ColorPalette::plain()
    } else {
        ColorPalette::detect()
    };

    match &cli.command {
        Command::Solve(args) => handle_solve(args, cli.format, &palette),
        Command::Sweep(args) => handle_sweep(args).map(|()| ExitCode::SUCCESS),
        Command::Types => handle_types(cli.format).map(|()| ExitCode::SUCCESS),
        Command::Route(args) => handle_route(args, cli.format).map(|()| ExitCode::SUCCESS),
    }
}
