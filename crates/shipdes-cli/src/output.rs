//! Output formatting for solve results, profile listings and voyage plans.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use shipdes_lib::{
    render_report, DesignRequest, DesignResult, FuelProfile, ReportOptions, ShipTypeProfile,
    VoyagePlan,
};

use crate::terminal::{format_quantity, ColorPalette};

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-layout text report.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Render one solve in the requested format.
pub fn render_design(
    request: &DesignRequest,
    result: &DesignResult,
    options: &ReportOptions,
    format: OutputFormat,
    palette: &ColorPalette,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Text => Ok(colorize_report(
            &render_report(request, result, options),
            palette,
        )),
    }
}

/// Highlight status and warning lines of a text report.
pub fn colorize_report(report: &str, palette: &ColorPalette) -> String {
    let mut out = String::with_capacity(report.len());
    for line in report.lines() {
        let color = if line.starts_with("Case") {
            palette.white_bold
        } else if line.contains("*** Warning") {
            palette.yellow
        } else if line.trim_start().starts_with("***") {
            palette.red
        } else if line.starts_with("  -------") || line.starts_with("-------") {
            palette.gray
        } else {
            ""
        };
        if color.is_empty() {
            out.push_str(line);
        } else {
            out.push_str(color);
            out.push_str(line);
            out.push_str(palette.reset);
        }
        out.push('\n');
    }
    out
}

#[derive(Serialize)]
struct ProfileListing<'a> {
    ship_types: &'a [ShipTypeProfile],
    fuel_types: &'a [FuelProfile],
}

/// Render the registered ship and fuel profiles.
pub fn render_profiles(
    ships: &[ShipTypeProfile],
    fuels: &[FuelProfile],
    format: OutputFormat,
) -> Result<String> {
    if format == OutputFormat::Json {
        let listing = ProfileListing {
            ship_types: ships,
            fuel_types: fuels,
        };
        return Ok(serde_json::to_string_pretty(&listing)?);
    }

    let mut out = String::new();
    out.push_str(&format!("Ship types ({}):\n", ships.len()));
    out.push_str(&format!(
        "{:<16} {:>8} {:>14} {:>8}\n",
        "Name", "Basis", "Cargo (t/m3)", "Profile"
    ));
    for ship in ships {
        out.push_str(&format!(
            "{:<16} {:>8} {:>14.3} {:>8.2}\n",
            ship.name,
            format!("{:?}", ship.design_basis).to_lowercase(),
            ship.cargo_density,
            ship.profile_factor
        ));
    }

    out.push_str(&format!("\nFuel types ({}):\n", fuels.len()));
    out.push_str(&format!(
        "{:<22} {:>10} {:>10} {:>8} {:>8}\n",
        "Name", "LHV MJ/kg", "SFC kg/kWh", "Cf", "Drive"
    ));
    for fuel in fuels {
        let drive = if fuel.direct_drive { "direct" } else { "geared" };
        out.push_str(&format!(
            "{:<22} {:>10.1} {:>10.3} {:>8.3} {:>8}\n",
            fuel.name,
            fuel.lower_heating_value,
            fuel.specific_consumption_kg_per_kwh(),
            fuel.carbon_factor,
            drive
        ));
    }
    Ok(out)
}

#[derive(Serialize)]
struct VoyageSummary<'a> {
    route: &'a str,
    name: &'a str,
    distance_nm: f64,
    speed_kn: f64,
    one_way_days: f64,
    voyage_days: f64,
    sea_days_per_year: f64,
    voyages_per_year: f64,
}

/// Render the voyage figures of a route plan.
pub fn render_voyage(plan: &VoyagePlan, sea_days: f64, format: OutputFormat) -> Result<String> {
    let summary = VoyageSummary {
        route: &plan.route.key,
        name: &plan.route.name,
        distance_nm: plan.route.total_distance(),
        speed_kn: plan.speed_kn,
        one_way_days: plan.one_way_days(),
        voyage_days: plan.voyage_days(),
        sea_days_per_year: sea_days,
        voyages_per_year: plan.annual_voyages(sea_days),
    };
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&summary)?);
    }
    Ok(format!(
        "Route: {}\n  Distance = {} nm at {:.1} knots\n  One way = {:.2} days, round voyage = {:.2} days\n  Voyages per year = {:.2} ({:.0} sea days)\n",
        summary.name,
        format_quantity(summary.distance_nm),
        summary.speed_kn,
        summary.one_way_days,
        summary.voyage_days,
        summary.voyages_per_year,
        summary.sea_days_per_year
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_palette_leaves_report_untouched() {
        let report = "Case   1: Tanker with Direct diesel engine\n  *** Warning: low GM\n";
        assert_eq!(colorize_report(report, &ColorPalette::plain()), report);
    }

    #[test]
    fn warnings_are_highlighted() {
        let colored = colorize_report("  *** Warning: low GM\n", &ColorPalette::colored());
        assert!(colored.starts_with(crate::terminal::colors::YELLOW));
        assert!(colored.trim_end().ends_with(crate::terminal::colors::RESET));
    }

    #[test]
    fn profile_table_lists_every_type() {
        let text = render_profiles(
            shipdes_lib::ship_types(),
            shipdes_lib::fuel_types(),
            OutputFormat::Text,
        )
        .unwrap();
        assert!(text.contains("Container ship"));
        assert!(text.contains("Nuclear Steam Turbine"));
    }
}
