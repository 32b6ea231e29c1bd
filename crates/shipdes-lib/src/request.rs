//! Solver input: the design request and its tunable parameter sets.
//!
//! Every struct here deserializes from JSON with defaults for missing fields,
//! so a request file only needs to name what differs from the standard case.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::profiles::{
    self, BlockRegression, BreadthRegression, FuelProfile, LengthRegression, ShipTypeProfile,
};

/// How the target of a solve is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignMode {
    /// Search hull length for a target cargo deadweight.
    #[default]
    Deadweight,
    /// Evaluate one fixed hull.
    Dimensions,
    /// Search hull length for a container count at an average weight per box.
    Teu,
}

impl fmt::Display for DesignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            DesignMode::Deadweight => "deadweight",
            DesignMode::Dimensions => "dimensions",
            DesignMode::Teu => "teu",
        };
        f.write_str(value)
    }
}

/// Main hull dimensions (m) and block coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HullDimensions {
    pub length: f64,
    pub breadth: f64,
    pub depth: f64,
    pub draught: f64,
    pub block: f64,
}

impl Default for HullDimensions {
    fn default() -> Self {
        Self {
            length: 207.34301,
            breadth: 31.898924,
            depth: 15.358741,
            draught: 11.725275,
            block: 0.818525,
        }
    }
}

/// Optional geometric constraints applied during a length search.
///
/// `lb_ratio` and `breadth` both fix the breadth and cannot be combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometricConstraints {
    pub lb_ratio: Option<f64>,
    pub breadth: Option<f64>,
    pub bt_ratio: Option<f64>,
    pub block: Option<f64>,
}

/// Iteration limits and violation tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    pub ignore_speed_violation: bool,
    pub ignore_pitch_violation: bool,
    pub max_dimension_iterations: u32,
    pub max_pitch_iterations: u32,
    pub max_volume_iterations: u32,
    /// Power failures tolerated per volume expansion before giving up.
    pub power_retry_limit: u32,
    /// Collect a [`crate::TraceEvent`] per iteration on the result.
    pub record_trace: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            ignore_speed_violation: false,
            ignore_pitch_violation: false,
            max_dimension_iterations: 500,
            max_pitch_iterations: 1000,
            max_volume_iterations: 50,
            power_retry_limit: 5,
            record_trace: false,
        }
    }
}

/// Overrides for the empirical sizing regressions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub breadth: Option<BreadthRegression>,
    pub block: Option<BlockRegression>,
    pub length: Option<LengthRegression>,
}

impl Calibration {
    pub fn breadth_regression(&self) -> BreadthRegression {
        self.breadth.unwrap_or_default()
    }

    pub fn block_regression(&self, ship: &ShipTypeProfile) -> BlockRegression {
        self.block.unwrap_or(ship.block)
    }

    pub fn length_regression(&self, ship: &ShipTypeProfile) -> LengthRegression {
        self.length.unwrap_or(ship.length)
    }
}

/// Capital and running cost coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostParameters {
    pub steel_1: f64,
    pub steel_2: f64,
    pub outfit_1: f64,
    pub outfit_2: f64,
    pub machinery_1: f64,
    pub machinery_2: f64,
    /// Annual maintenance as a fraction of build cost.
    pub maintenance_fraction: f64,
    pub crew: f64,
    pub port: f64,
    pub stores: f64,
    pub overhead: f64,
    pub other: f64,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            steel_1: 16_000.0,
            steel_2: 2_420.0,
            outfit_1: 180_000.0,
            outfit_2: 35_000.0,
            machinery_1: 7_500.0,
            machinery_2: 17_000.0,
            maintenance_fraction: 0.05,
            crew: 3_000_000.0,
            port: 1_500_000.0,
            stores: 500_000.0,
            overhead: 1_250_000.0,
            other: 0.0,
        }
    }
}

/// Economic inputs; present on a request only when economics are wanted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicParameters {
    pub voyages_per_year: f64,
    pub sea_days_per_year: f64,
    /// Fuel price ($/t).
    pub fuel_price: f64,
    /// Interest rate (%).
    pub interest_pct: f64,
    pub repayment_years: u32,
    pub reactor_cost_per_kw: f64,
    pub core_life_years: f64,
    /// Decommissioning cost (M$).
    pub decommissioning_cost: f64,
    /// Annual revenue earned on top of the freight rate ($/yr).
    pub premium_revenue: f64,
    /// Carbon price ($/t CO₂).
    pub carbon_price: f64,
    /// CII reduction factor relative to the reference line (%).
    pub cii_reduction_pct: f64,
    pub costs: CostParameters,
}

impl Default for EconomicParameters {
    fn default() -> Self {
        Self {
            voyages_per_year: 17.0,
            sea_days_per_year: 340.0,
            fuel_price: 80.0,
            interest_pct: 10.0,
            repayment_years: 15,
            reactor_cost_per_kw: 4_000.0,
            core_life_years: 20.0,
            decommissioning_cost: 200.0,
            premium_revenue: 0.0,
            carbon_price: 0.0,
            cii_reduction_pct: 11.0,
            costs: CostParameters::default(),
        }
    }
}

/// The solver's sole input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignRequest {
    pub design_mode: DesignMode,
    pub ship_type: String,
    pub fuel_type: String,
    /// Target cargo deadweight (t).
    pub target_deadweight: f64,
    /// Allowable deadweight error (% of target).
    pub error_pct: f64,
    pub teu_count: f64,
    /// Average laden weight per TEU (t).
    pub teu_avg_weight: f64,
    /// Hull evaluated in dimensions mode.
    pub dimensions: HullDimensions,
    pub constraints: GeometricConstraints,
    /// Propeller diameter as a fraction of draught.
    pub prop_diameter_ratio: f64,
    pub speed_kn: f64,
    pub range_nm: f64,
    pub engine_rpm: f64,
    pub propeller_rpm: f64,
    pub economics: Option<EconomicParameters>,
    pub volume_limit_enabled: bool,
    /// Cargo stowage density (t/m³) replacing the ship type's value.
    pub cargo_density_override: Option<f64>,
    pub options: SolverOptions,
    pub calibration: Calibration,
}

impl Default for DesignRequest {
    fn default() -> Self {
        Self {
            design_mode: DesignMode::Deadweight,
            ship_type: "Tanker".to_string(),
            fuel_type: "Direct diesel".to_string(),
            target_deadweight: 50_000.0,
            error_pct: 0.001,
            teu_count: 3_000.0,
            teu_avg_weight: 14.0,
            dimensions: HullDimensions::default(),
            constraints: GeometricConstraints::default(),
            prop_diameter_ratio: 0.6,
            speed_kn: 15.0,
            range_nm: 12_000.0,
            engine_rpm: 120.0,
            propeller_rpm: 120.0,
            economics: None,
            volume_limit_enabled: false,
            cargo_density_override: None,
            options: SolverOptions::default(),
            calibration: Calibration::default(),
        }
    }
}

/// Profiles and derived targets of a request that passed validation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedRequest<'a> {
    pub request: &'a DesignRequest,
    pub ship: &'static ShipTypeProfile,
    pub fuel: &'static FuelProfile,
    /// Target cargo deadweight for searching modes (t).
    pub target_weight: f64,
    /// Absolute deadweight tolerance (t).
    pub tolerance: f64,
    /// Propeller rpm after applying direct drive.
    pub propeller_rpm: f64,
}

impl DesignRequest {
    /// Check every numeric input once, before any solving begins.
    pub fn validate(&self) -> Result<()> {
        self.resolve().map(|_| ())
    }

    /// Target cargo deadweight implied by the design mode.
    pub fn target_weight(&self) -> f64 {
        match self.design_mode {
            DesignMode::Teu => self.teu_count * self.teu_avg_weight,
            _ => self.target_deadweight,
        }
    }

    pub(crate) fn resolve(&self) -> Result<ResolvedRequest<'_>> {
        let ship = profiles::ship_type(&self.ship_type)?;
        let fuel = profiles::fuel_type(&self.fuel_type)?;

        match self.design_mode {
            DesignMode::Deadweight => {
                positive("target_deadweight", self.target_deadweight)?;
                positive("error_pct", self.error_pct)?;
            }
            DesignMode::Teu => {
                positive("teu_count", self.teu_count)?;
                positive("teu_avg_weight", self.teu_avg_weight)?;
                positive("error_pct", self.error_pct)?;
            }
            DesignMode::Dimensions => {
                let dims = &self.dimensions;
                positive("dimensions.length", dims.length)?;
                positive("dimensions.breadth", dims.breadth)?;
                positive("dimensions.depth", dims.depth)?;
                positive("dimensions.draught", dims.draught)?;
                block_coefficient("dimensions.block", dims.block)?;
                if dims.draught >= dims.depth {
                    return Err(Error::invalid(
                        "dimensions.draught",
                        "draught must be less than depth",
                    ));
                }
            }
        }

        if self.design_mode != DesignMode::Dimensions {
            let c = &self.constraints;
            if c.lb_ratio.is_some() && c.breadth.is_some() {
                return Err(Error::invalid(
                    "constraints",
                    "lb_ratio and breadth cannot both be fixed",
                ));
            }
            optional_positive("constraints.lb_ratio", c.lb_ratio)?;
            optional_positive("constraints.breadth", c.breadth)?;
            optional_positive("constraints.bt_ratio", c.bt_ratio)?;
            if let Some(block) = c.block {
                block_coefficient("constraints.block", block)?;
            }
            self.validate_calibration()?;
        }

        positive("prop_diameter_ratio", self.prop_diameter_ratio)?;
        positive("speed_kn", self.speed_kn)?;
        positive("range_nm", self.range_nm)?;
        positive("engine_rpm", self.engine_rpm)?;
        positive("propeller_rpm", self.propeller_rpm)?;
        optional_positive("cargo_density_override", self.cargo_density_override)?;

        let opts = &self.options;
        if opts.max_dimension_iterations == 0
            || opts.max_pitch_iterations == 0
            || opts.max_volume_iterations == 0
        {
            return Err(Error::invalid(
                "options",
                "iteration limits must be at least 1",
            ));
        }

        if let Some(econ) = &self.economics {
            validate_economics(econ, fuel)?;
        }

        let target_weight = self.target_weight();
        let propeller_rpm = if fuel.direct_drive {
            self.engine_rpm
        } else {
            self.propeller_rpm
        };

        Ok(ResolvedRequest {
            request: self,
            ship,
            fuel,
            target_weight,
            tolerance: 0.01 * target_weight * self.error_pct,
            propeller_rpm,
        })
    }

    fn validate_calibration(&self) -> Result<()> {
        if let Some(length) = &self.calibration.length {
            positive("calibration.length.divisor", length.divisor)?;
        }
        if let Some(breadth) = &self.calibration.breadth {
            positive("calibration.breadth.high_ratio", breadth.high_ratio)?;
        }
        Ok(())
    }
}

fn validate_economics(econ: &EconomicParameters, fuel: &FuelProfile) -> Result<()> {
    positive("economics.voyages_per_year", econ.voyages_per_year)?;
    positive("economics.sea_days_per_year", econ.sea_days_per_year)?;
    if !econ.interest_pct.is_finite() || econ.interest_pct < 0.0 {
        return Err(Error::invalid(
            "economics.interest_pct",
            "must be a finite non-negative number",
        ));
    }
    if econ.repayment_years < 1 {
        return Err(Error::invalid(
            "economics.repayment_years",
            "must be at least 1",
        ));
    }
    if fuel.nuclear {
        positive("economics.reactor_cost_per_kw", econ.reactor_cost_per_kw)?;
        positive("economics.core_life_years", econ.core_life_years)?;
        non_negative("economics.decommissioning_cost", econ.decommissioning_cost)?;
    } else {
        positive("economics.fuel_price", econ.fuel_price)?;
    }
    non_negative("economics.carbon_price", econ.carbon_price)?;
    Ok(())
}

fn positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::invalid(field, "must be a finite positive number"));
    }
    Ok(())
}

fn non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::invalid(field, "must be a finite non-negative number"));
    }
    Ok(())
}

fn optional_positive(field: &str, value: Option<f64>) -> Result<()> {
    value.map_or(Ok(()), |v| positive(field, v))
}

fn block_coefficient(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 || value > 1.0 {
        return Err(Error::invalid(field, "block coefficient must be in (0, 1]"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_is_valid() {
        DesignRequest::default().validate().expect("defaults validate");
    }

    #[test]
    fn zero_speed_is_rejected() {
        let request = DesignRequest {
            speed_kn: 0.0,
            ..DesignRequest::default()
        };
        let err = request.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidInput { ref field, .. } if field == "speed_kn"));
    }

    #[test]
    fn breadth_and_lb_ratio_are_exclusive() {
        let request = DesignRequest {
            constraints: GeometricConstraints {
                lb_ratio: Some(6.5),
                breadth: Some(32.0),
                ..GeometricConstraints::default()
            },
            ..DesignRequest::default()
        };
        assert!(matches!(
            request.validate(),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn direct_drive_forces_propeller_rpm() {
        let request = DesignRequest {
            engine_rpm: 100.0,
            propeller_rpm: 80.0,
            ..DesignRequest::default()
        };
        let resolved = request.resolve().expect("valid");
        assert_eq!(resolved.propeller_rpm, 100.0);

        let geared = DesignRequest {
            fuel_type: "Geared diesel".to_string(),
            ..request
        };
        assert_eq!(geared.resolve().expect("valid").propeller_rpm, 80.0);
    }

    #[test]
    fn teu_mode_derives_target_weight() {
        let request = DesignRequest {
            design_mode: DesignMode::Teu,
            teu_count: 3_000.0,
            teu_avg_weight: 14.0,
            ..DesignRequest::default()
        };
        assert_eq!(request.target_weight(), 42_000.0);
    }

    #[test]
    fn fuel_price_not_required_for_nuclear() {
        let request = DesignRequest {
            fuel_type: "Nuclear Steam Turbine".to_string(),
            economics: Some(EconomicParameters {
                fuel_price: 0.0,
                ..EconomicParameters::default()
            }),
            ..DesignRequest::default()
        };
        request.validate().expect("nuclear ignores fuel price");
    }

    #[test]
    fn partial_json_request_uses_defaults() {
        let request: DesignRequest =
            serde_json::from_str(r#"{"ship_type": "Bulk carrier", "speed_kn": 14.0}"#)
                .expect("parses");
        assert_eq!(request.ship_type, "Bulk carrier");
        assert_eq!(request.range_nm, 12_000.0);
        assert_eq!(request.options.max_dimension_iterations, 500);
    }
}
