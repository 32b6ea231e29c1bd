//! `types` subcommand: list ship and fuel profiles.

use anyhow::Result;

use shipdes_lib::{fuel_types, ship_types};

use crate::output::{render_profiles, OutputFormat};

pub fn handle_types(format: OutputFormat) -> Result<()> {
    print!("{}", render_profiles(ship_types(), fuel_types(), format)?);
    if format == OutputFormat::Json {
        println!();
    }
    Ok(())
}
