//! Ship-type and fuel-type profile registries.
//!
//! Each stage of the solver reads its coefficients from a [`ShipTypeProfile`]
//! or a [`FuelProfile`] instead of branching on a type code. Both registries
//! are built once on first use and never mutated; adding a ship or fuel type
//! is a new table entry.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which standard freeboard table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FreeboardClass {
    Tanker,
    NonTanker,
}

/// Whether a ship type is sized by the weight it carries or the space it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignBasis {
    Deadweight,
    Volume,
}

/// Capacity measure used by a regulatory reference line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityBasis {
    Deadweight,
    GrossTonnage,
}

/// Initial length guess `L = intercept + scale·(W/divisor)^(1/3)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthRegression {
    pub intercept: f64,
    pub scale: f64,
    pub divisor: f64,
}

impl LengthRegression {
    pub fn initial_length(&self, target_weight: f64) -> f64 {
        self.intercept + self.scale * (target_weight / self.divisor).cbrt()
    }
}

/// Block coefficient as a piecewise-linear function of `V/sqrt(L)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockRegression {
    pub low_intercept: f64,
    pub low_slope: f64,
    pub high_intercept: f64,
    pub high_slope: f64,
    /// Speed-length ratio at which the high-speed line takes over.
    pub switch: f64,
}

impl BlockRegression {
    pub fn block_coefficient(&self, speed_length_ratio: f64) -> f64 {
        if speed_length_ratio < self.switch {
            self.low_intercept - self.low_slope * speed_length_ratio
        } else {
            self.high_intercept - self.high_slope * speed_length_ratio
        }
    }
}

/// Breadth from length when no breadth constraint is set.
///
/// `B = L/(base + slope·(L − origin))` up to `switch_length`, `B = L/high_ratio` above it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreadthRegression {
    pub base: f64,
    pub slope: f64,
    pub origin: f64,
    pub high_ratio: f64,
    pub switch_length: f64,
}

impl Default for BreadthRegression {
    fn default() -> Self {
        Self {
            base: 4.0,
            slope: 0.025,
            origin: 30.0,
            high_ratio: 6.5,
            switch_length: 130.0,
        }
    }
}

impl BreadthRegression {
    pub fn breadth(&self, length: f64) -> f64 {
        if length <= self.switch_length {
            length / (self.base + self.slope * (length - self.origin))
        } else {
            length / self.high_ratio
        }
    }
}

/// Depth when no breadth/draught constraint is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "rule")]
pub enum DepthRule {
    /// `D = L / ratio`.
    LengthRatio { ratio: f64 },
    /// `D = (B − offset) / divisor`.
    BreadthLinear { offset: f64, divisor: f64 },
}

impl DepthRule {
    pub fn depth(&self, length: f64, breadth: f64) -> f64 {
        match *self {
            DepthRule::LengthRatio { ratio } => length / ratio,
            DepthRule::BreadthLinear { offset, divisor } => (breadth - offset) / divisor,
        }
    }
}

/// Outfit coefficient `K2 = intercept − L/length_divisor` (constant when no divisor).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutfitRegression {
    pub intercept: f64,
    pub length_divisor: Option<f64>,
}

impl OutfitRegression {
    pub fn coefficient(&self, length: f64) -> f64 {
        match self.length_divisor {
            Some(divisor) => self.intercept - length / divisor,
            None => self.intercept,
        }
    }
}

/// Regulatory reference line `a·capacity^(−c)·(1 − reduction/100)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub a: f64,
    pub c: f64,
    pub basis: CapacityBasis,
    pub reduction_pct: f64,
}

impl ReferenceLine {
    pub fn reference_value(&self, capacity: f64) -> f64 {
        if capacity <= 0.0 {
            return 0.0;
        }
        self.a * capacity.powf(-self.c)
    }

    pub fn required_value(&self, capacity: f64, reduction_pct: f64) -> f64 {
        self.reference_value(capacity) * (1.0 - reduction_pct / 100.0)
    }
}

/// Immutable per-ship-type constants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipTypeProfile {
    pub name: &'static str,
    #[serde(skip)]
    pub aliases: &'static [&'static str],
    pub freeboard_class: FreeboardClass,
    /// Draught is cut back to `D − freeboard` after the depth rule.
    pub draught_from_freeboard: bool,
    pub length: LengthRegression,
    pub block: BlockRegression,
    pub depth_rule: DepthRule,
    /// `T/D` used with the depth rule and the B/T constraint.
    pub draught_ratio: f64,
    /// Vertical centre of gravity as a fraction of depth.
    pub kg_factor: f64,
    pub steel_coefficient: f64,
    pub outfit: OutfitRegression,
    /// Second term coefficient of the diesel machinery regression.
    pub diesel_machinery_coefficient: f64,
    pub design_basis: DesignBasis,
    /// Stowage density of the cargo (t/m³).
    pub cargo_density: f64,
    /// Enclosed volume as a multiple of the hull volume below the deck.
    pub profile_factor: f64,
    pub eedi: ReferenceLine,
    pub cii: ReferenceLine,
}

/// How machinery mass scales with power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "model")]
pub enum MachineryModel {
    /// `9.38(P/N)^0.84 + K3·P^0.7`, P in bhp, N engine rpm.
    DieselRegression,
    /// `0.16·P^0.89`, P in bhp.
    SteamRegression,
    /// Fixed reactor plant plus a per-kW term.
    Reactor { base_t: f64, per_kw_t: f64 },
    /// Linear specific mass per installed kW.
    Specific { per_kw_t: f64 },
}

/// Immutable per-propulsion constants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelProfile {
    pub name: &'static str,
    #[serde(skip)]
    pub aliases: &'static [&'static str],
    /// Lower heating value (MJ/kg).
    pub lower_heating_value: f64,
    /// Stored density (t/m³).
    pub density: f64,
    pub thermal_efficiency: f64,
    pub tank_weight_multiplier: f64,
    pub tank_volume_multiplier: f64,
    /// Tonnes of CO₂ per tonne of fuel.
    pub carbon_factor: f64,
    pub machinery: MachineryModel,
    pub transmission_efficiency: f64,
    /// Multiplier on the conventional machinery capital cost.
    pub machinery_cost_factor: f64,
    pub nuclear: bool,
    /// Propeller turns at engine speed.
    pub direct_drive: bool,
}

impl FuelProfile {
    /// Specific fuel consumption in kg/kWh of shaft power.
    pub fn specific_consumption_kg_per_kwh(&self) -> f64 {
        if self.nuclear {
            return 0.0;
        }
        3.6 / (self.lower_heating_value * self.thermal_efficiency)
    }
}

const GT_CRUISE_EEDI: ReferenceLine = ReferenceLine {
    a: 170.84,
    c: 0.214,
    basis: CapacityBasis::GrossTonnage,
    reduction_pct: 30.0,
};

const GT_CRUISE_CII: ReferenceLine = ReferenceLine {
    a: 930.0,
    c: 0.383,
    basis: CapacityBasis::GrossTonnage,
    reduction_pct: 11.0,
};

static SHIP_TYPES: Lazy<Vec<ShipTypeProfile>> = Lazy::new(|| {
    vec![
        ShipTypeProfile {
            name: "Tanker",
            aliases: &["oil tanker"],
            freeboard_class: FreeboardClass::Tanker,
            draught_from_freeboard: true,
            length: LengthRegression {
                intercept: 0.0,
                scale: 5.0,
                divisor: 0.8,
            },
            block: BlockRegression {
                low_intercept: 0.93,
                low_slope: 0.110,
                high_intercept: 1.23,
                high_slope: 0.395,
                switch: 1.0,
            },
            depth_rule: DepthRule::LengthRatio { ratio: 13.5 },
            draught_ratio: 0.78,
            kg_factor: 0.63,
            steel_coefficient: 0.032,
            outfit: OutfitRegression {
                intercept: 0.37,
                length_divisor: Some(1765.0),
            },
            diesel_machinery_coefficient: 0.59,
            design_basis: DesignBasis::Deadweight,
            cargo_density: 0.85,
            profile_factor: 1.0,
            eedi: ReferenceLine {
                a: 1218.80,
                c: 0.488,
                basis: CapacityBasis::Deadweight,
                reduction_pct: 30.0,
            },
            cii: ReferenceLine {
                a: 5247.0,
                c: 0.610,
                basis: CapacityBasis::Deadweight,
                reduction_pct: 11.0,
            },
        },
        ShipTypeProfile {
            name: "Bulk carrier",
            aliases: &["bulk", "bulker"],
            freeboard_class: FreeboardClass::NonTanker,
            draught_from_freeboard: true,
            length: LengthRegression {
                intercept: 0.0,
                scale: 5.0,
                divisor: 0.8,
            },
            block: BlockRegression {
                low_intercept: 0.93,
                low_slope: 0.110,
                high_intercept: 1.23,
                high_slope: 0.395,
                switch: 1.0,
            },
            depth_rule: DepthRule::LengthRatio { ratio: 11.75 },
            draught_ratio: 0.70,
            kg_factor: 0.57,
            steel_coefficient: 0.032,
            outfit: OutfitRegression {
                intercept: 0.32,
                length_divisor: Some(1765.0),
            },
            diesel_machinery_coefficient: 0.56,
            design_basis: DesignBasis::Deadweight,
            cargo_density: 0.80,
            profile_factor: 1.0,
            eedi: ReferenceLine {
                a: 961.79,
                c: 0.477,
                basis: CapacityBasis::Deadweight,
                reduction_pct: 30.0,
            },
            cii: ReferenceLine {
                a: 4745.0,
                c: 0.622,
                basis: CapacityBasis::Deadweight,
                reduction_pct: 11.0,
            },
        },
        ShipTypeProfile {
            name: "Cargo vessel",
            aliases: &["cargo", "general cargo"],
            freeboard_class: FreeboardClass::NonTanker,
            draught_from_freeboard: false,
            length: LengthRegression {
                intercept: 0.0,
                scale: 5.0,
                divisor: 0.7,
            },
            block: BlockRegression {
                low_intercept: 1.23,
                low_slope: 0.395,
                high_intercept: 1.23,
                high_slope: 0.395,
                switch: 1.0,
            },
            depth_rule: DepthRule::BreadthLinear {
                offset: 2.74,
                divisor: 1.4,
            },
            draught_ratio: 0.70,
            kg_factor: 0.62,
            steel_coefficient: 0.034,
            outfit: OutfitRegression {
                intercept: 0.41,
                length_divisor: None,
            },
            diesel_machinery_coefficient: 0.56,
            design_basis: DesignBasis::Deadweight,
            cargo_density: 0.55,
            profile_factor: 1.05,
            eedi: ReferenceLine {
                a: 107.48,
                c: 0.216,
                basis: CapacityBasis::Deadweight,
                reduction_pct: 30.0,
            },
            cii: ReferenceLine {
                a: 588.0,
                c: 0.3885,
                basis: CapacityBasis::Deadweight,
                reduction_pct: 11.0,
            },
        },
        ShipTypeProfile {
            name: "Container ship",
            aliases: &["container", "boxship"],
            freeboard_class: FreeboardClass::NonTanker,
            draught_from_freeboard: false,
            length: LengthRegression {
                intercept: 0.0,
                scale: 5.5,
                divisor: 0.7,
            },
            block: BlockRegression {
                low_intercept: 1.20,
                low_slope: 0.395,
                high_intercept: 1.20,
                high_slope: 0.395,
                switch: 1.0,
            },
            depth_rule: DepthRule::BreadthLinear {
                offset: 2.74,
                divisor: 1.4,
            },
            draught_ratio: 0.60,
            kg_factor: 0.58,
            steel_coefficient: 0.036,
            outfit: OutfitRegression {
                intercept: 0.38,
                length_divisor: None,
            },
            diesel_machinery_coefficient: 0.56,
            design_basis: DesignBasis::Volume,
            cargo_density: 0.30,
            profile_factor: 1.30,
            eedi: ReferenceLine {
                a: 174.22,
                c: 0.201,
                basis: CapacityBasis::Deadweight,
                reduction_pct: 30.0,
            },
            cii: ReferenceLine {
                a: 1984.0,
                c: 0.489,
                basis: CapacityBasis::Deadweight,
                reduction_pct: 11.0,
            },
        },
        ShipTypeProfile {
            name: "Cruise ship",
            aliases: &["cruise", "passenger"],
            freeboard_class: FreeboardClass::NonTanker,
            draught_from_freeboard: false,
            length: LengthRegression {
                intercept: 0.0,
                scale: 12.0,
                divisor: 0.7,
            },
            block: BlockRegression {
                low_intercept: 1.10,
                low_slope: 0.33,
                high_intercept: 1.10,
                high_slope: 0.33,
                switch: 1.0,
            },
            depth_rule: DepthRule::LengthRatio { ratio: 21.0 },
            draught_ratio: 0.60,
            kg_factor: 0.85,
            steel_coefficient: 0.040,
            outfit: OutfitRegression {
                intercept: 1.2,
                length_divisor: None,
            },
            diesel_machinery_coefficient: 0.60,
            design_basis: DesignBasis::Volume,
            cargo_density: 0.08,
            profile_factor: 2.5,
            eedi: GT_CRUISE_EEDI,
            cii: GT_CRUISE_CII,
        },
        ShipTypeProfile {
            name: "Superyacht",
            aliases: &["yacht", "mega yacht"],
            freeboard_class: FreeboardClass::NonTanker,
            draught_from_freeboard: false,
            length: LengthRegression {
                intercept: 0.0,
                scale: 10.5,
                divisor: 0.7,
            },
            block: BlockRegression {
                low_intercept: 0.80,
                low_slope: 0.15,
                high_intercept: 0.80,
                high_slope: 0.15,
                switch: 1.0,
            },
            depth_rule: DepthRule::LengthRatio { ratio: 11.0 },
            draught_ratio: 0.60,
            kg_factor: 0.75,
            steel_coefficient: 0.034,
            outfit: OutfitRegression {
                intercept: 0.6,
                length_divisor: None,
            },
            diesel_machinery_coefficient: 0.60,
            design_basis: DesignBasis::Volume,
            cargo_density: 0.06,
            profile_factor: 2.0,
            eedi: ReferenceLine {
                reduction_pct: 0.0,
                ..GT_CRUISE_EEDI
            },
            cii: GT_CRUISE_CII,
        },
    ]
});

static FUEL_TYPES: Lazy<Vec<FuelProfile>> = Lazy::new(|| {
    let diesel = FuelProfile {
        name: "Direct diesel",
        aliases: &["diesel", "direct"],
        lower_heating_value: 42.7,
        density: 0.89,
        thermal_efficiency: 0.419,
        tank_weight_multiplier: 1.0,
        tank_volume_multiplier: 1.0,
        carbon_factor: 3.206,
        machinery: MachineryModel::DieselRegression,
        transmission_efficiency: 0.98,
        machinery_cost_factor: 1.0,
        nuclear: false,
        direct_drive: true,
    };
    vec![
        diesel.clone(),
        FuelProfile {
            name: "Geared diesel",
            aliases: &["geared"],
            transmission_efficiency: 0.95,
            direct_drive: false,
            ..diesel.clone()
        },
        FuelProfile {
            name: "Steam turbines",
            aliases: &["steam", "steam turbine"],
            lower_heating_value: 40.5,
            density: 0.98,
            thermal_efficiency: 0.237,
            carbon_factor: 3.114,
            machinery: MachineryModel::SteamRegression,
            transmission_efficiency: 0.95,
            direct_drive: false,
            ..diesel.clone()
        },
        FuelProfile {
            name: "Nuclear Steam Turbine",
            aliases: &["nuclear"],
            lower_heating_value: 0.0,
            density: 1.0,
            thermal_efficiency: 0.0,
            carbon_factor: 0.0,
            machinery: MachineryModel::Reactor {
                base_t: 4000.0,
                per_kw_t: 0.2,
            },
            transmission_efficiency: 0.95,
            nuclear: true,
            direct_drive: false,
            ..diesel.clone()
        },
        FuelProfile {
            name: "Methanol",
            aliases: &["meoh"],
            lower_heating_value: 19.9,
            density: 0.79,
            thermal_efficiency: 0.45,
            tank_weight_multiplier: 1.05,
            tank_volume_multiplier: 1.1,
            carbon_factor: 1.375,
            machinery: MachineryModel::Specific { per_kw_t: 0.095 },
            transmission_efficiency: 0.95,
            machinery_cost_factor: 1.15,
            direct_drive: false,
            ..diesel.clone()
        },
        FuelProfile {
            name: "LNG",
            aliases: &["liquefied natural gas"],
            lower_heating_value: 48.6,
            density: 0.45,
            thermal_efficiency: 0.45,
            tank_weight_multiplier: 1.35,
            tank_volume_multiplier: 1.8,
            carbon_factor: 2.750,
            machinery: MachineryModel::Specific { per_kw_t: 0.10 },
            transmission_efficiency: 0.95,
            machinery_cost_factor: 1.3,
            direct_drive: false,
            ..diesel.clone()
        },
        FuelProfile {
            name: "Ammonia",
            aliases: &["nh3"],
            lower_heating_value: 18.6,
            density: 0.68,
            thermal_efficiency: 0.42,
            tank_weight_multiplier: 1.2,
            tank_volume_multiplier: 1.3,
            carbon_factor: 0.0,
            machinery: MachineryModel::Specific { per_kw_t: 0.105 },
            transmission_efficiency: 0.95,
            machinery_cost_factor: 1.35,
            direct_drive: false,
            ..diesel.clone()
        },
        FuelProfile {
            name: "Hydrogen ICE",
            aliases: &["hydrogen", "h2 ice"],
            lower_heating_value: 120.0,
            density: 0.071,
            thermal_efficiency: 0.42,
            tank_weight_multiplier: 6.0,
            tank_volume_multiplier: 1.8,
            carbon_factor: 0.0,
            machinery: MachineryModel::Specific { per_kw_t: 0.10 },
            transmission_efficiency: 0.95,
            machinery_cost_factor: 1.5,
            direct_drive: false,
            ..diesel.clone()
        },
        FuelProfile {
            name: "Hydrogen fuel cell",
            aliases: &["fuel cell", "h2 fuel cell"],
            lower_heating_value: 120.0,
            density: 0.071,
            thermal_efficiency: 0.50,
            tank_weight_multiplier: 6.0,
            tank_volume_multiplier: 1.8,
            carbon_factor: 0.0,
            machinery: MachineryModel::Specific { per_kw_t: 0.05 },
            transmission_efficiency: 0.92,
            machinery_cost_factor: 2.0,
            direct_drive: false,
            ..diesel.clone()
        },
        FuelProfile {
            name: "Battery electric",
            aliases: &["battery", "electric"],
            lower_heating_value: 0.72,
            density: 2.0,
            thermal_efficiency: 0.9,
            tank_weight_multiplier: 1.0,
            tank_volume_multiplier: 1.2,
            carbon_factor: 0.0,
            machinery: MachineryModel::Specific { per_kw_t: 0.02 },
            transmission_efficiency: 0.95,
            machinery_cost_factor: 1.8,
            direct_drive: false,
            ..diesel
        },
    ]
});

/// All registered ship types in display order.
pub fn ship_types() -> &'static [ShipTypeProfile] {
    SHIP_TYPES.as_slice()
}

/// All registered propulsion/fuel types in display order.
pub fn fuel_types() -> &'static [FuelProfile] {
    FUEL_TYPES.as_slice()
}

/// Look up a ship type by name or alias, case-insensitively.
pub fn ship_type(name: &str) -> Result<&'static ShipTypeProfile> {
    let key = normalize_name(name);
    ship_types()
        .iter()
        .find(|p| matches_name(&key, p.name, p.aliases))
        .ok_or_else(|| Error::UnknownShipType {
            name: name.to_string(),
            suggestions: fuzzy_matches(&key, ship_types().iter().map(|p| p.name), 3),
        })
}

/// Look up a fuel type by name or alias, case-insensitively.
pub fn fuel_type(name: &str) -> Result<&'static FuelProfile> {
    let key = normalize_name(name);
    fuel_types()
        .iter()
        .find(|p| matches_name(&key, p.name, p.aliases))
        .ok_or_else(|| Error::UnknownFuelType {
            name: name.to_string(),
            suggestions: fuzzy_matches(&key, fuel_types().iter().map(|p| p.name), 3),
        })
}

fn matches_name(key: &str, name: &str, aliases: &[&str]) -> bool {
    normalize_name(name) == key || aliases.iter().any(|a| normalize_name(a) == key)
}

pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Rank candidate names by Jaro-Winkler similarity to `key`.
pub(crate) fn fuzzy_matches<'a>(
    key: &str,
    candidates: impl Iterator<Item = &'a str>,
    limit: usize,
) -> Vec<String> {
    let mut scored: Vec<(f64, &str)> = candidates
        .map(|c| (strsim::jaro_winkler(key, &normalize_name(c)), c))
        .filter(|(score, _)| *score >= 0.7)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, name)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(ship_type("container SHIP").unwrap().name, "Container ship");
        assert_eq!(fuel_type("  nuclear ").unwrap().name, "Nuclear Steam Turbine");
    }

    #[test]
    fn unknown_ship_type_suggests_close_names() {
        let err = ship_type("Tankr").unwrap_err();
        match err {
            Error::UnknownShipType { suggestions, .. } => {
                assert_eq!(suggestions.first().map(String::as_str), Some("Tanker"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn diesel_consumption_matches_legacy_rate() {
        let diesel = fuel_type("Direct diesel").unwrap();
        let per_hp_hour = diesel.specific_consumption_kg_per_kwh() * crate::tables::KW_PER_HP;
        assert!((per_hp_hour - 0.15).abs() < 1e-3);

        let steam = fuel_type("Steam turbines").unwrap();
        let per_hp_hour = steam.specific_consumption_kg_per_kwh() * crate::tables::KW_PER_HP;
        assert!((per_hp_hour - 0.28).abs() < 1e-3);
    }

    #[test]
    fn breadth_regression_switches_at_130m() {
        let regression = BreadthRegression::default();
        assert!((regression.breadth(30.0) - 7.5).abs() < 1e-12);
        assert!((regression.breadth(195.0) - 30.0).abs() < 1e-12);
    }
}
