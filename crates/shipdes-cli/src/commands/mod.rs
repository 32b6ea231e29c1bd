//! Subcommand handlers. `main.rs` parses arguments and dispatches here.

pub mod route;
pub mod solve;
pub mod sweep;
pub mod types;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};

use shipdes_lib::{resolve_request, DesignMode, DesignRequest, EconomicParameters};

/// Design mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Deadweight,
    Dimensions,
    Teu,
}

impl From<ModeArg> for DesignMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Deadweight => DesignMode::Deadweight,
            ModeArg::Dimensions => DesignMode::Dimensions,
            ModeArg::Teu => DesignMode::Teu,
        }
    }
}

/// Request inputs shared by `solve` and `sweep`.
///
/// The base request comes from `--request`, then `SHIPDES_PARAMS`, then the
/// user's config directory, then built-in defaults. Flags override it.
#[derive(Args, Debug, Clone, Default)]
pub struct RequestArgs {
    /// JSON request file used as the base case.
    #[arg(long)]
    pub request: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Ship type name, e.g. "Tanker" or "Container ship".
    #[arg(long = "ship")]
    pub ship_type: Option<String>,

    /// Propulsion/fuel name, e.g. "Direct diesel" or "LNG".
    #[arg(long = "fuel")]
    pub fuel_type: Option<String>,

    /// Target cargo deadweight (t).
    #[arg(long)]
    pub deadweight: Option<f64>,

    /// Allowable deadweight error (% of target).
    #[arg(long = "error")]
    pub error_pct: Option<f64>,

    /// Container count in TEU mode.
    #[arg(long)]
    pub teu: Option<f64>,

    /// Average laden weight per TEU (t).
    #[arg(long)]
    pub teu_weight: Option<f64>,

    /// Hull for dimensions mode: L,B,D,T,CB.
    #[arg(long, value_delimiter = ',')]
    pub hull: Option<Vec<f64>>,

    /// Fix L/B during the length search.
    #[arg(long)]
    pub lb_ratio: Option<f64>,

    /// Fix breadth (m) during the length search.
    #[arg(long)]
    pub breadth: Option<f64>,

    /// Fix B/T during the length search.
    #[arg(long)]
    pub bt_ratio: Option<f64>,

    /// Fix the block coefficient during the length search.
    #[arg(long)]
    pub block: Option<f64>,

    /// Service speed (knots).
    #[arg(long)]
    pub speed: Option<f64>,

    /// Endurance (nautical miles).
    #[arg(long)]
    pub range: Option<f64>,

    #[arg(long)]
    pub engine_rpm: Option<f64>,

    #[arg(long)]
    pub propeller_rpm: Option<f64>,

    /// Enable the economic model with default parameters if none are set.
    #[arg(long)]
    pub economics: bool,

    /// Fuel price ($/t); implies --economics.
    #[arg(long)]
    pub fuel_price: Option<f64>,

    /// Check hull volume for every ship type.
    #[arg(long)]
    pub volume_limit: bool,

    /// Cargo stowage density (t/m³).
    #[arg(long)]
    pub cargo_density: Option<f64>,

    /// Continue the length search through speed-coefficient violations.
    #[arg(long)]
    pub ignore_speed: bool,

    /// Continue the length search through pitch-ratio violations.
    #[arg(long)]
    pub ignore_pitch: bool,
}

impl RequestArgs {
    /// Load the base request and apply command-line overrides.
    pub fn build(&self) -> Result<DesignRequest> {
        let mut request = resolve_request(self.request.as_deref()).with_context(|| match &self.request {
            Some(path) => format!("failed to load request from {}", path.display()),
            None => "failed to load the default request".to_string(),
        })?;

        if let Some(mode) = self.mode {
            request.design_mode = mode.into();
        }
        if let Some(ship) = &self.ship_type {
            request.ship_type = ship.clone();
        }
        if let Some(fuel) = &self.fuel_type {
            request.fuel_type = fuel.clone();
        }
        set(&mut request.target_deadweight, self.deadweight);
        set(&mut request.error_pct, self.error_pct);
        set(&mut request.teu_count, self.teu);
        set(&mut request.teu_avg_weight, self.teu_weight);
        if let Some(hull) = self.hull.as_deref() {
            let [length, breadth, depth, draught, block] = *hull else {
                bail!("--hull expects five values: L,B,D,T,CB");
            };
            request.dimensions.length = length;
            request.dimensions.breadth = breadth;
            request.dimensions.depth = depth;
            request.dimensions.draught = draught;
            request.dimensions.block = block;
        }

        let constraints = &mut request.constraints;
        if self.lb_ratio.is_some() {
            constraints.lb_ratio = self.lb_ratio;
        }
        if self.breadth.is_some() {
            constraints.breadth = self.breadth;
        }
        if self.bt_ratio.is_some() {
            constraints.bt_ratio = self.bt_ratio;
        }
        if self.block.is_some() {
            constraints.block = self.block;
        }

        set(&mut request.speed_kn, self.speed);
        set(&mut request.range_nm, self.range);
        set(&mut request.engine_rpm, self.engine_rpm);
        set(&mut request.propeller_rpm, self.propeller_rpm);

        if self.economics || self.fuel_price.is_some() {
            let econ = request.economics.get_or_insert_with(EconomicParameters::default);
            set(&mut econ.fuel_price, self.fuel_price);
        }
        if self.volume_limit {
            request.volume_limit_enabled = true;
        }
        if self.cargo_density.is_some() {
            request.cargo_density_override = self.cargo_density;
        }
        if self.ignore_speed {
            request.options.ignore_speed_violation = true;
        }
        if self.ignore_pitch {
            request.options.ignore_pitch_violation = true;
        }
        Ok(request)
    }
}

fn set(target: &mut f64, value: Option<f64>) {
    if let Some(value) = value {
        *target = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = RequestArgs {
            mode: Some(ModeArg::Teu),
            ship_type: Some("Container ship".to_string()),
            teu: Some(2_500.0),
            speed: Some(18.0),
            fuel_price: Some(120.0),
            ..RequestArgs::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("base.json");
        std::fs::write(&path, "{}").unwrap();
        let args = RequestArgs {
            request: Some(path),
            ..args
        };

        let request = args.build().unwrap();
        assert_eq!(request.design_mode, DesignMode::Teu);
        assert_eq!(request.ship_type, "Container ship");
        assert_eq!(request.teu_count, 2_500.0);
        assert_eq!(request.speed_kn, 18.0);
        assert_eq!(request.economics.map(|e| e.fuel_price), Some(120.0));
    }

    #[test]
    fn hull_flag_sets_all_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("base.json");
        std::fs::write(&path, "{}").unwrap();
        let args = RequestArgs {
            request: Some(path),
            hull: Some(vec![150.0, 24.0, 12.0, 8.5, 0.7]),
            ..RequestArgs::default()
        };
        let request = args.build().unwrap();
        assert_eq!(request.dimensions.length, 150.0);
        assert_eq!(request.dimensions.block, 0.7);

        let short = RequestArgs {
            hull: Some(vec![150.0, 24.0]),
            ..args
        };
        assert!(short.build().is_err());
    }
}
