//! Weight estimate and deadweight balance.

use serde::Serialize;

use crate::power::PowerEstimate;
use crate::profiles::{FuelProfile, MachineryModel, ShipTypeProfile};
use crate::request::HullDimensions;
use crate::tables::{non_zero, KW_PER_HP, LIGHTSHIP_MARGIN};

/// Voyage margin applied on top of the fuel burnt over the design range.
pub const FUEL_RESERVE: f64 = 1.1;

/// Mass breakdown (t) of one design.
///
/// `displacement` equals the sum of every other component except
/// `total_deadweight`, which is `cargo + fuel + stores`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MassBreakdown {
    pub displacement: f64,
    pub steel: f64,
    pub outfit: f64,
    pub machinery: f64,
    pub lightship_margin: f64,
    pub fuel: f64,
    pub stores: f64,
    pub cargo_deadweight: f64,
    pub total_deadweight: f64,
}

impl MassBreakdown {
    pub fn lightship(&self) -> f64 {
        self.steel + self.outfit + self.machinery + self.lightship_margin
    }
}

/// Operating inputs the mass stage needs beyond hull and power.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassInputs {
    pub engine_rpm: f64,
    pub speed_kn: f64,
    pub range_nm: f64,
}

pub fn steel_mass(hull: &HullDimensions, ship: &ShipTypeProfile) -> f64 {
    let HullDimensions {
        length,
        breadth,
        depth,
        draught,
        block,
    } = *hull;
    let envelope = length * (breadth + draught) + 0.85 * length * (depth - draught) + 250.0;
    let block_at_depth = block + (0.8 * depth - draught) / (10.0 * non_zero(draught));
    ship.steel_coefficient * envelope.powf(1.36) * (1.0 + 0.5 * (block_at_depth - 0.7))
}

pub fn outfit_mass(hull: &HullDimensions, ship: &ShipTypeProfile) -> f64 {
    ship.outfit.coefficient(hull.length) * hull.length * hull.breadth
}

/// Machinery mass from installed power (hp).
pub fn machinery_mass(
    installed_power: f64,
    engine_rpm: f64,
    ship: &ShipTypeProfile,
    fuel: &FuelProfile,
) -> f64 {
    let installed_kw = installed_power * KW_PER_HP;
    match fuel.machinery {
        MachineryModel::DieselRegression => {
            9.38 * (installed_power / non_zero(engine_rpm)).powf(0.84)
                + ship.diesel_machinery_coefficient * installed_power.powf(0.7)
        }
        MachineryModel::SteamRegression => 0.16 * installed_power.powf(0.89),
        MachineryModel::Reactor { base_t, per_kw_t } => base_t + per_kw_t * installed_kw,
        MachineryModel::Specific { per_kw_t } => per_kw_t * installed_kw,
    }
}

/// Fuel carried for the design range, including tankage penalty (t).
pub fn fuel_mass(service_power: f64, speed_kn: f64, range_nm: f64, fuel: &FuelProfile) -> f64 {
    if fuel.nuclear {
        return 0.0;
    }
    let hours = range_nm / non_zero(speed_kn);
    let burnt_kg = fuel.specific_consumption_kg_per_kwh() * service_power * KW_PER_HP * hours;
    FUEL_RESERVE * burnt_kg / 1000.0 * fuel.tank_weight_multiplier
}

pub fn stores_mass(displacement: f64) -> f64 {
    13.0 * displacement.max(0.0).powf(0.35)
}

/// Complete mass breakdown; cargo deadweight is the residual and may be negative.
pub fn estimate_masses(
    hull: &HullDimensions,
    displacement: f64,
    power: &PowerEstimate,
    ship: &ShipTypeProfile,
    fuel: &FuelProfile,
    inputs: &MassInputs,
) -> MassBreakdown {
    let steel = steel_mass(hull, ship);
    let outfit = outfit_mass(hull, ship);
    let machinery = machinery_mass(power.installed_power, inputs.engine_rpm, ship, fuel);
    let lightship_margin = LIGHTSHIP_MARGIN * (steel + outfit + machinery);
    let fuel_t = fuel_mass(power.service_power, inputs.speed_kn, inputs.range_nm, fuel);
    let stores = stores_mass(displacement);
    let lightship = steel + outfit + machinery + lightship_margin;

    MassBreakdown {
        displacement,
        steel,
        outfit,
        machinery,
        lightship_margin,
        fuel: fuel_t,
        stores,
        cargo_deadweight: displacement - lightship - fuel_t - stores,
        total_deadweight: displacement - lightship,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::{fuel_type, ship_type};

    #[test]
    fn nuclear_carries_no_fuel() {
        let nuclear = fuel_type("Nuclear Steam Turbine").unwrap();
        assert_eq!(fuel_mass(20_000.0, 15.0, 12_000.0, nuclear), 0.0);
    }

    #[test]
    fn diesel_fuel_matches_legacy_rate() {
        let diesel = fuel_type("Direct diesel").unwrap();
        let legacy = 0.0011 * 0.15 * 15_000.0 * 12_000.0 / 15.0;
        let got = fuel_mass(15_000.0, 15.0, 12_000.0, diesel);
        assert!((got - legacy).abs() / legacy < 1e-3);
    }

    #[test]
    fn hydrogen_tankage_is_heavier_than_lng() {
        let h2 = fuel_type("Hydrogen ICE").unwrap();
        let lng = fuel_type("LNG").unwrap();
        let h2_mass = fuel_mass(15_000.0, 15.0, 12_000.0, h2);
        let lng_mass = fuel_mass(15_000.0, 15.0, 12_000.0, lng);
        assert!(h2_mass > lng_mass);
    }

    #[test]
    fn reactor_machinery_has_fixed_base() {
        let ship = ship_type("Tanker").unwrap();
        let nuclear = fuel_type("Nuclear Steam Turbine").unwrap();
        let installed_hp = 20_000.0 / KW_PER_HP;
        let mass = machinery_mass(installed_hp, 120.0, ship, nuclear);
        assert!((mass - 8_000.0).abs() < 1e-6);
    }

    #[test]
    fn outfit_of_cargo_vessel_ignores_length_slope() {
        let ship = ship_type("Cargo vessel").unwrap();
        let hull = HullDimensions::default();
        let expected = 0.41 * hull.length * hull.breadth;
        assert!((outfit_mass(&hull, ship) - expected).abs() < 1e-9);
    }
}
