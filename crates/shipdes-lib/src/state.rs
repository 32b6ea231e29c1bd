//! Working state of one solve and the stage pipeline that produces it.

use serde::Serialize;

use crate::freeboard::minimum_freeboard;
use crate::mass::{estimate_masses, MassBreakdown, MassInputs};
use crate::power::{displaced_volume, estimate_power, PowerEstimate, PowerFailure, PowerPolicy, PropulsionInputs};
use crate::profiles::{FuelProfile, ShipTypeProfile};
use crate::request::{HullDimensions, ResolvedRequest};
use crate::stability::metacentric_height;
use crate::tables::SEA_WATER_DENSITY;

/// Geometry, powering and masses of one evaluated hull.
///
/// Produced by value for every trial and owned by the solve that created it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignState {
    pub hull: HullDimensions,
    /// Displacement (t).
    pub displacement: f64,
    /// Minimum freeboard (m).
    pub freeboard: f64,
    /// Approximate metacentric height (m).
    pub metacentric_height: f64,
    pub power: PowerEstimate,
    pub masses: MassBreakdown,
}

impl DesignState {
    pub fn length_breadth_ratio(&self) -> f64 {
        self.hull.length / self.hull.breadth
    }

    pub fn breadth_draught_ratio(&self) -> f64 {
        self.hull.breadth / self.hull.draught
    }
}

/// Everything the stages need besides the hull.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StageContext {
    pub ship: &'static ShipTypeProfile,
    pub fuel: &'static FuelProfile,
    pub propulsion: PropulsionInputs,
    pub policy: PowerPolicy,
    pub mass_inputs: MassInputs,
}

impl StageContext {
    pub fn new(resolved: &ResolvedRequest<'_>, policy: PowerPolicy) -> Self {
        let request = resolved.request;
        Self {
            ship: resolved.ship,
            fuel: resolved.fuel,
            propulsion: PropulsionInputs {
                speed_kn: request.speed_kn,
                propeller_rpm: resolved.propeller_rpm,
                prop_diameter_ratio: request.prop_diameter_ratio,
                transmission_efficiency: resolved.fuel.transmission_efficiency,
            },
            policy,
            mass_inputs: MassInputs {
                engine_rpm: request.engine_rpm,
                speed_kn: request.speed_kn,
                range_nm: request.range_nm,
            },
        }
    }

    /// Freeboard for a hull whose draught is already final.
    pub fn freeboard(&self, hull: &HullDimensions) -> f64 {
        minimum_freeboard(
            hull.length,
            hull.block,
            hull.draught,
            hull.depth,
            self.ship.freeboard_class,
        )
    }

    /// Stability, power and mass stages for one hull.
    pub fn evaluate(
        &self,
        hull: HullDimensions,
        freeboard: f64,
    ) -> Result<DesignState, PowerFailure> {
        let power = estimate_power(&hull, &self.propulsion, &self.policy)?;
        Ok(self.assemble(hull, freeboard, power))
    }

    /// Stability and mass stages with a power estimate supplied by the caller.
    pub fn assemble(&self, hull: HullDimensions, freeboard: f64, power: PowerEstimate) -> DesignState {
        let displacement = SEA_WATER_DENSITY * displaced_volume(&hull);
        let metacentric_height = metacentric_height(
            hull.breadth,
            hull.depth,
            hull.draught,
            hull.block,
            self.ship.kg_factor,
        );
        let masses = estimate_masses(
            &hull,
            displacement,
            &power,
            self.ship,
            self.fuel,
            &self.mass_inputs,
        );
        DesignState {
            hull,
            displacement,
            freeboard,
            metacentric_height,
            power,
            masses,
        }
    }
}
