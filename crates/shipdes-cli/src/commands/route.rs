//! `route` subcommand: voyages per year on a standard or custom route.

use anyhow::{Context, Result};
use clap::Args;

use shipdes_lib::{Route, RouteCatalog, SpeedProfile, VoyagePlan};

use crate::output::{render_voyage, OutputFormat};

#[derive(Args, Debug, Clone)]
pub struct RouteArgs {
    /// Standard route key or name; ignored when --ocean is given.
    #[arg(long, default_value = "custom")]
    pub route: String,

    /// List the standard routes and exit.
    #[arg(long)]
    pub list: bool,

    /// Custom route ocean distance (nm).
    #[arg(long)]
    pub ocean: Option<f64>,

    /// Custom route canal distance (nm).
    #[arg(long, default_value_t = 0.0)]
    pub canal: f64,

    /// Custom route port approach distance (nm).
    #[arg(long, default_value_t = 100.0)]
    pub approach: f64,

    /// Service speed (knots).
    #[arg(long, default_value_t = 15.0)]
    pub speed: f64,

    /// Percentage of service speed in canals.
    #[arg(long, default_value_t = 20.0)]
    pub canal_pct: f64,

    /// Percentage of service speed in port approaches.
    #[arg(long, default_value_t = 10.0)]
    pub port_pct: f64,

    /// Days at sea per year.
    #[arg(long, default_value_t = 340.0)]
    pub sea_days: f64,
}

pub fn handle_route(args: &RouteArgs, format: OutputFormat) -> Result<()> {
    let catalog = RouteCatalog::standard();
    if args.list {
        print_catalog(catalog);
        return Ok(());
    }

    let route = match args.ocean {
        Some(ocean) => Route::custom(args.approach, args.canal, ocean),
        None => catalog.find(&args.route)?.clone(),
    };
    let profile = SpeedProfile {
        canal_pct: args.canal_pct,
        port_pct: args.port_pct,
        ..SpeedProfile::default()
    };
    let plan = VoyagePlan::new(route, args.speed, profile).context("invalid voyage plan")?;
    print!("{}", render_voyage(&plan, args.sea_days, format)?);
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}

fn print_catalog(catalog: &RouteCatalog) {
    println!("Standard routes ({}):", catalog.routes.len());
    println!("{:<24} {:>10} {:>10} {:>10}", "Key", "Approach", "Canal", "Ocean");
    for route in &catalog.routes {
        println!(
            "{:<24} {:>10.0} {:>10.0} {:>10.0}",
            route.key, route.port_approach_nm, route.canal_nm, route.ocean_nm
        );
    }
}
