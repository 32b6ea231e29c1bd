//! Build cost, annual cost, required freight rate and the regulatory
//! efficiency indices (gross tonnage, EEDI, CII).
//!
//! Everything here is direct formula evaluation over a solved
//! [`DesignState`]; divisions by quantities that may be zero go through
//! [`non_zero`].

use std::fmt;

use serde::Serialize;

use crate::profiles::{CapacityBasis, FuelProfile, ReferenceLine, ShipTypeProfile};
use crate::request::EconomicParameters;
use crate::state::DesignState;
use crate::tables::non_zero;
use crate::volume::available_volume;

/// Capital cost split ($).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CapitalCost {
    pub steel: f64,
    pub outfit: f64,
    /// Conventional machinery or the reactor plant.
    pub machinery: f64,
}

impl CapitalCost {
    pub fn total(&self) -> f64 {
        self.steel + self.outfit + self.machinery
    }
}

/// Annual cost split ($/yr).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnualCost {
    pub capital_charge: f64,
    pub crew: f64,
    pub maintenance: f64,
    pub port: f64,
    pub stores: f64,
    pub overhead: f64,
    pub other: f64,
    /// Fuel bill, or core replacement plus decommissioning fund for nuclear.
    pub energy: f64,
    pub carbon: f64,
    /// Subtracted from the total.
    pub premium_revenue: f64,
}

impl AnnualCost {
    pub fn total(&self) -> f64 {
        self.capital_charge
            + self.crew
            + self.maintenance
            + self.port
            + self.stores
            + self.overhead
            + self.other
            + self.energy
            + self.carbon
            - self.premium_revenue
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EconomicsSummary {
    pub capital: CapitalCost,
    /// Build cost (M$).
    pub build_cost_musd: f64,
    pub capital_recovery_factor: f64,
    pub annual: AnnualCost,
    pub annual_fuel_tonnes: f64,
    pub annual_co2_tonnes: f64,
    /// Required freight rate ($/t of cargo).
    pub required_freight_rate: f64,
    /// Required freight rate per box, TEU mode only ($/TEU).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_rate_per_teu: Option<f64>,
}

/// Carbon intensity rating band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum CiiRating {
    A,
    B,
    C,
    D,
    E,
}

impl CiiRating {
    /// Band for attained/required ratio.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < 0.83 {
            CiiRating::A
        } else if ratio < 0.94 {
            CiiRating::B
        } else if ratio < 1.06 {
            CiiRating::C
        } else if ratio < 1.19 {
            CiiRating::D
        } else {
            CiiRating::E
        }
    }
}

impl fmt::Display for CiiRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            CiiRating::A => "A",
            CiiRating::B => "B",
            CiiRating::C => "C",
            CiiRating::D => "D",
            CiiRating::E => "E",
        };
        f.write_str(value)
    }
}

/// Attained against required value of one index (g CO₂ per capacity-mile).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexCheck {
    pub attained: f64,
    pub required: f64,
    pub capacity: f64,
}

impl IndexCheck {
    pub fn ratio(&self) -> f64 {
        self.attained / non_zero(self.required)
    }

    pub fn complies(&self) -> bool {
        self.attained <= self.required
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CiiCheck {
    #[serde(flatten)]
    pub index: IndexCheck,
    pub rating: CiiRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmissionsSummary {
    pub gross_tonnage: f64,
    pub eedi: IndexCheck,
    /// Requires economics for the annual operating profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cii: Option<CiiCheck>,
}

/// `i(1+i)^N / ((1+i)^N − 1)`; `1/N` at zero interest.
pub fn capital_recovery_factor(interest_pct: f64, years: u32) -> f64 {
    let years = years.max(1);
    let rate = interest_pct / 100.0;
    if rate.abs() < f64::EPSILON {
        return 1.0 / f64::from(years);
    }
    let growth = (1.0 + rate).powi(years as i32);
    rate * growth / non_zero(growth - 1.0)
}

/// Reactor plant capital cost ($).
pub fn nuclear_reactor_cost(installed_kw: f64, cost_per_kw: f64) -> f64 {
    cost_per_kw * installed_kw
}

/// Gross tonnage from enclosed volume (m³).
pub fn gross_tonnage(enclosed_volume: f64) -> f64 {
    if enclosed_volume <= 0.0 {
        return 0.0;
    }
    (0.2 + 0.02 * enclosed_volume.log10()) * enclosed_volume
}

/// Fuel burnt in a year at service power (t).
pub fn annual_fuel_tonnes(service_kw: f64, sea_days: f64, fuel: &FuelProfile) -> f64 {
    fuel.specific_consumption_kg_per_kwh() * service_kw * sea_days * 24.0 / 1000.0
}

pub fn capital_cost(
    state: &DesignState,
    fuel: &FuelProfile,
    econ: &EconomicParameters,
) -> CapitalCost {
    let costs = &econ.costs;
    let steel_t = state.masses.steel;
    let outfit_t = state.masses.outfit;
    let length = state.hull.length;

    let steel = costs.steel_1 * steel_t.max(0.0).powf(2.0 / 3.0) * length.max(0.0).cbrt()
        / non_zero(state.hull.block)
        + costs.steel_2 * steel_t;
    let outfit = costs.outfit_1 * outfit_t.max(0.0).powf(2.0 / 3.0)
        + costs.outfit_2 * outfit_t.max(0.0).powf(0.95);
    let machinery = if fuel.nuclear {
        nuclear_reactor_cost(state.power.installed_power_kw(), econ.reactor_cost_per_kw)
    } else {
        (costs.machinery_1 + costs.machinery_2)
            * state.power.service_power.max(0.0).powf(0.82)
            * fuel.machinery_cost_factor
    };

    CapitalCost {
        steel,
        outfit,
        machinery,
    }
}

/// Capital, annual cost and required freight rate of a solved design.
///
/// `teu_avg_weight` is set in TEU mode to also quote the rate per box.
pub fn evaluate_economics(
    state: &DesignState,
    fuel: &FuelProfile,
    econ: &EconomicParameters,
    teu_avg_weight: Option<f64>,
) -> EconomicsSummary {
    let costs = &econ.costs;
    let capital = capital_cost(state, fuel, econ);
    let build_cost = capital.total();
    let crf = capital_recovery_factor(econ.interest_pct, econ.repayment_years);

    let fuel_tonnes = annual_fuel_tonnes(
        state.power.service_power_kw(),
        econ.sea_days_per_year,
        fuel,
    );
    let energy = if fuel.nuclear {
        capital.machinery / non_zero(econ.core_life_years)
            + econ.decommissioning_cost * 1.0e6 / f64::from(econ.repayment_years.max(1))
    } else {
        fuel_tonnes * econ.fuel_price
    };
    let co2 = fuel_tonnes * fuel.carbon_factor;

    let annual = AnnualCost {
        capital_charge: crf * build_cost,
        crew: costs.crew,
        maintenance: costs.maintenance_fraction * build_cost,
        port: costs.port,
        stores: costs.stores,
        overhead: costs.overhead,
        other: costs.other,
        energy,
        carbon: co2 * econ.carbon_price,
        premium_revenue: econ.premium_revenue,
    };

    let carried = non_zero(econ.voyages_per_year * state.masses.cargo_deadweight);
    let rfr = annual.total() / carried;

    EconomicsSummary {
        capital,
        build_cost_musd: build_cost * 1.0e-6,
        capital_recovery_factor: crf,
        annual,
        annual_fuel_tonnes: fuel_tonnes,
        annual_co2_tonnes: co2,
        required_freight_rate: rfr,
        required_rate_per_teu: teu_avg_weight.map(|w| rfr * w),
    }
}

fn capacity(line: &ReferenceLine, state: &DesignState, gross_tonnage: f64) -> f64 {
    match line.basis {
        CapacityBasis::Deadweight => state.masses.total_deadweight,
        CapacityBasis::GrossTonnage => gross_tonnage,
    }
}

/// Gross tonnage, EEDI and (with economics) CII of a solved design.
pub fn evaluate_emissions(
    state: &DesignState,
    ship: &ShipTypeProfile,
    fuel: &FuelProfile,
    speed_kn: f64,
    econ: Option<&EconomicParameters>,
) -> EmissionsSummary {
    let gt = gross_tonnage(available_volume(&state.hull, ship));
    let speed = non_zero(speed_kn);

    let sfc_g_per_kwh = fuel.specific_consumption_kg_per_kwh() * 1000.0;
    let eedi_capacity = capacity(&ship.eedi, state, gt);
    let eedi = IndexCheck {
        attained: 0.75 * state.power.installed_power_kw() * sfc_g_per_kwh * fuel.carbon_factor
            / non_zero(eedi_capacity * speed),
        required: ship
            .eedi
            .required_value(eedi_capacity, ship.eedi.reduction_pct),
        capacity: eedi_capacity,
    };

    let cii = econ.map(|econ| {
        let cii_capacity = capacity(&ship.cii, state, gt);
        let co2_grams = annual_fuel_tonnes(
            state.power.service_power_kw(),
            econ.sea_days_per_year,
            fuel,
        ) * fuel.carbon_factor
            * 1.0e6;
        let distance = econ.sea_days_per_year * 24.0 * speed;
        let index = IndexCheck {
            attained: co2_grams / non_zero(cii_capacity * distance),
            required: ship.cii.required_value(cii_capacity, econ.cii_reduction_pct),
            capacity: cii_capacity,
        };
        CiiCheck {
            rating: CiiRating::from_ratio(index.ratio()),
            index,
        }
    });

    EmissionsSummary {
        gross_tonnage: gt,
        eedi,
        cii,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovery_factor_matches_annuity_formula() {
        let crf = capital_recovery_factor(10.0, 15);
        assert!((crf - 0.131_473_776).abs() < 1e-8);
    }

    #[test]
    fn zero_interest_spreads_capital_evenly() {
        assert_eq!(capital_recovery_factor(0.0, 20), 0.05);
    }

    #[test]
    fn reactor_cost_scales_with_installed_power() {
        let capex = nuclear_reactor_cost(20_000.0, 9_000.0);
        assert_eq!(capex, 180_000_000.0);
        assert_eq!(capex / 20.0, 9_000_000.0);
    }

    #[test]
    fn gross_tonnage_follows_tonnage_rule() {
        let gt = gross_tonnage(10_000.0);
        assert!((gt - 2_800.0).abs() < 1e-9);
        assert_eq!(gross_tonnage(0.0), 0.0);
    }

    #[test]
    fn rating_bands() {
        assert_eq!(CiiRating::from_ratio(0.5), CiiRating::A);
        assert_eq!(CiiRating::from_ratio(0.9), CiiRating::B);
        assert_eq!(CiiRating::from_ratio(1.0), CiiRating::C);
        assert_eq!(CiiRating::from_ratio(1.1), CiiRating::D);
        assert_eq!(CiiRating::from_ratio(1.19), CiiRating::E);
    }

    #[test]
    fn annual_fuel_uses_specific_consumption() {
        let diesel = crate::profiles::fuel_type("Direct diesel").unwrap();
        let tonnes = annual_fuel_tonnes(10_000.0, 340.0, diesel);
        let expected = diesel.specific_consumption_kg_per_kwh() * 10_000.0 * 340.0 * 24.0 / 1000.0;
        assert!((tonnes - expected).abs() < 1e-9);
        let nuclear = crate::profiles::fuel_type("nuclear").unwrap();
        assert_eq!(annual_fuel_tonnes(10_000.0, 340.0, nuclear), 0.0);
    }
}
