//! Resistance regression, propeller operating point and installed power.
//!
//! The effective power comes from a resistance coefficient regressed on four
//! non-dimensional hull factors at seven speed-coefficient breakpoints and
//! interpolated linearly in between. The propeller pitch ratio that delivers
//! the required thrust is then found by Newton-Raphson on the open-water thrust
//! polynomial, which fixes the propulsive efficiency and hence service power.
//!
//! Out-of-range speed or pitch are typed [`PowerFailure`]s. A caller may ask
//! for them to be tolerated through [`PowerPolicy`], in which case the
//! computation continues by extrapolation and the violation is recorded on the
//! returned [`PowerEstimate`].

use std::f64::consts::PI;
use std::fmt;

use serde::Serialize;

use crate::request::HullDimensions;
use crate::tables::{
    non_zero, propeller, KW_PER_HP, POWER_MARGIN, RESISTANCE_OFFSET, RESISTANCE_SCALE,
    RESISTANCE_WEIGHTS, SEA_WATER_DENSITY, SPEED_BREAKPOINTS,
};

/// Valid band of the speed coefficient `V/sqrt(3.28 L)`.
pub const SPEED_COEFFICIENT_RANGE: (f64, f64) = (0.35, 0.90);
/// Valid band of the propeller pitch ratio.
pub const PITCH_RATIO_RANGE: (f64, f64) = (0.5, 1.4);
/// Residual at which the pitch iteration stops.
pub const PITCH_TOLERANCE: f64 = 1e-5;

/// Named reasons the power stage can reject a hull.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PowerFailure {
    SpeedLow { v0: f64 },
    SpeedHigh { v0: f64 },
    PitchLow { pitch_ratio: f64 },
    PitchHigh { pitch_ratio: f64 },
    NotConverge { iterations: u32 },
}

impl PowerFailure {
    pub fn is_speed(&self) -> bool {
        matches!(self, PowerFailure::SpeedLow { .. } | PowerFailure::SpeedHigh { .. })
    }

    pub fn is_pitch(&self) -> bool {
        matches!(self, PowerFailure::PitchLow { .. } | PowerFailure::PitchHigh { .. })
    }
}

impl fmt::Display for PowerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerFailure::SpeedLow { v0 } => write!(f, "ship speed too low (V0 = {v0:.3})"),
            PowerFailure::SpeedHigh { v0 } => write!(f, "ship speed too high (V0 = {v0:.3})"),
            PowerFailure::PitchLow { pitch_ratio } => {
                write!(f, "propeller pitch ratio too low ({pitch_ratio:.4})")
            }
            PowerFailure::PitchHigh { pitch_ratio } => {
                write!(f, "propeller pitch ratio too high ({pitch_ratio:.4})")
            }
            PowerFailure::NotConverge { iterations } => {
                write!(f, "pitch iteration did not converge after {iterations} steps")
            }
        }
    }
}

/// Operating inputs of the power stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropulsionInputs {
    pub speed_kn: f64,
    pub propeller_rpm: f64,
    pub prop_diameter_ratio: f64,
    pub transmission_efficiency: f64,
}

/// Which violations to tolerate and how long to iterate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerPolicy {
    pub ignore_speed: bool,
    pub ignore_pitch: bool,
    pub max_pitch_iterations: u32,
}

impl Default for PowerPolicy {
    fn default() -> Self {
        Self {
            ignore_speed: false,
            ignore_pitch: false,
            max_pitch_iterations: 1000,
        }
    }
}

/// Powering result for one hull. Powers are in metric horsepower.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerEstimate {
    pub speed_coefficient: f64,
    pub effective_power: f64,
    pub service_power: f64,
    pub installed_power: f64,
    pub pitch_ratio: f64,
    pub open_water_efficiency: f64,
    pub hull_efficiency: f64,
    pub quasi_propulsive_coefficient: f64,
    pub correlation_factor: f64,
    pub transmission_efficiency: f64,
    pub wake_fraction: f64,
    pub thrust_deduction: f64,
    pub pitch_iterations: u32,
    /// Violations that were tolerated under the active policy.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tolerated: Vec<PowerFailure>,
}

impl PowerEstimate {
    pub fn effective_power_kw(&self) -> f64 {
        self.effective_power * KW_PER_HP
    }

    pub fn service_power_kw(&self) -> f64 {
        self.service_power * KW_PER_HP
    }

    pub fn installed_power_kw(&self) -> f64 {
        self.installed_power * KW_PER_HP
    }

    /// Copy with all powers multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            effective_power: self.effective_power * factor,
            service_power: self.service_power * factor,
            installed_power: self.installed_power * factor,
            ..self.clone()
        }
    }
}

/// Normalised hull-proportion variables of the resistance regression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullFactors {
    /// Slenderness `L/∇^(1/3)`.
    pub z2: f64,
    /// Breadth-draught ratio.
    pub z3: f64,
    /// Block coefficient.
    pub z4: f64,
    /// Prismatic term.
    pub z5: f64,
}

impl HullFactors {
    pub fn new(hull: &HullDimensions) -> Self {
        let volume_root = non_zero(displaced_volume(hull).cbrt());
        let prismatic = 20.0 * (hull.block - 0.675);
        Self {
            z2: (hull.length / volume_root - 5.296) / 1.064,
            z3: 10.0 * (hull.breadth / non_zero(hull.draught) - 3.025) / 9.05,
            z4: 1000.0 * (hull.block - 0.725) / 75.0,
            z5: (prismatic - 0.77) / 2.77,
        }
    }
}

/// Resistance coefficient at speed breakpoint `set`.
pub fn resistance_coefficient(set: usize, f: &HullFactors) -> f64 {
    let x = &RESISTANCE_WEIGHTS[set];
    let HullFactors { z2, z3, z4, z5 } = *f;
    let value = x[0]
        + x[1] * z2
        + x[2] * z3
        + x[3] * z4
        + x[4] * z5
        + x[5] * z2 * z2
        + x[6] * z3 * z3
        + x[7] * z4 * z4
        + x[8] * z5 * z5
        + x[9] * z2 * z3
        + x[10] * z2 * z4
        + x[11] * z2 * z5
        + x[12] * z3 * z4
        + x[13] * z3 * z5
        + x[14] * z4 * z5
        + x[15] * z5 * z4 * z4;
    value * RESISTANCE_SCALE + RESISTANCE_OFFSET
}

/// Index of the lower breakpoint bracketing `v0`, clamped to the edge segments.
pub fn speed_segment(v0: f64) -> usize {
    SPEED_BREAKPOINTS
        .iter()
        .filter(|&&b| v0 > b)
        .count()
        .saturating_sub(1)
        .min(SPEED_BREAKPOINTS.len() - 2)
}

/// Effective (towing) power in horsepower.
pub fn effective_power(hull: &HullDimensions, speed_kn: f64) -> f64 {
    let length = non_zero(hull.length);
    let v0 = speed_kn / (3.28 * length).sqrt();
    let factors = HullFactors::new(hull);
    let segment = speed_segment(v0);
    let (b0, b1) = (SPEED_BREAKPOINTS[segment], SPEED_BREAKPOINTS[segment + 1]);
    let a0 = resistance_coefficient(segment, &factors);
    let a1 = resistance_coefficient(segment + 1, &factors);
    let interpolated = a0 + (v0 - b0) * (a1 - a0) / (b1 - b0);

    let volume = displaced_volume(hull);
    let scaled = interpolated * non_zero(volume.cbrt()) / (2.4938 * length);
    let corrected = if hull.length >= 122.0 {
        scaled - 0.1 * (hull.length - 122.0) / (hull.length + 66.0)
    } else {
        scaled + 1.8e-4 * (122.0 - hull.length).powf(1.3)
    };
    let displacement_long_tons = SEA_WATER_DENSITY * volume * 2204.0 / 2240.0;
    corrected * speed_kn.powi(3) * displacement_long_tons.powf(2.0 / 3.0) / 427.1
}

/// Solved propeller operating point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropellerPoint {
    pub pitch_ratio: f64,
    pub thrust_coefficient: f64,
    pub torque_coefficient: f64,
    pub advance_ratio: f64,
    pub wake_fraction: f64,
    pub thrust_deduction: f64,
    pub iterations: u32,
}

/// Find the pitch ratio at which the propeller delivers the required thrust.
pub fn solve_propeller(
    hull: &HullDimensions,
    effective_power: f64,
    inputs: &PropulsionInputs,
    max_iterations: u32,
) -> Result<PropellerPoint, PowerFailure> {
    use propeller::*;

    let diameter = non_zero(inputs.prop_diameter_ratio * hull.draught);
    let revs = non_zero(inputs.propeller_rpm / 60.0);
    let speed = non_zero(inputs.speed_kn);
    let block = hull.block;
    let wake = 1.1 - 3.4 * block + 3.1 * block.powf(1.9);
    let thrust_deduction = 0.6 * wake;
    let advance_speed = speed * 0.515 * (1.0 - wake);
    let thrust = 0.7461 * effective_power / (0.515 * speed * (1.0 - thrust_deduction));
    let advance_ratio = advance_speed / (revs * diameter);
    let j = advance_ratio - ADVANCE_ORIGIN;
    let required_kt = thrust / (SEA_WATER_DENSITY * revs.powi(2) * diameter.powi(4));

    let kt0 = KT_0[0] + j * (KT_0[1] + j * (KT_0[2] + j * KT_0[3]));
    let kt1 = KT_1[0] + j * (KT_1[1] + j * KT_1[2]);
    let kt2 = KT_2[0] + j * KT_2[1];
    let kq0 = KQ_0[0] + j * (KQ_0[1] + j * (KQ_0[2] + j * KQ_0[3]));
    let kq1 = KQ_1[0] + j * (KQ_1[1] + j * KQ_1[2]);
    let kq2 = KQ_2[0] + j * KQ_2[1];
    let kt = |p: f64| kt0 + p * (kt1 + p * (kt2 + p * KT_3));

    let mut p = 1.0 - PITCH_ORIGIN;
    let mut residual = kt(p) - required_kt;
    let mut iterations = 0;
    while iterations < max_iterations && residual.abs() > PITCH_TOLERANCE {
        iterations += 1;
        let slope = non_zero(kt1 + p * (2.0 * kt2 + 3.0 * p * KT_3));
        p -= residual / slope;
        residual = kt(p) - required_kt;
    }
    if iterations >= max_iterations {
        return Err(PowerFailure::NotConverge { iterations });
    }

    Ok(PropellerPoint {
        pitch_ratio: p + PITCH_ORIGIN,
        thrust_coefficient: kt(p),
        torque_coefficient: kq0 + p * (kq1 + p * (kq2 + p * KQ_3)),
        advance_ratio,
        wake_fraction: wake,
        thrust_deduction,
        iterations,
    })
}

/// Full power estimate for one hull.
pub fn estimate_power(
    hull: &HullDimensions,
    inputs: &PropulsionInputs,
    policy: &PowerPolicy,
) -> Result<PowerEstimate, PowerFailure> {
    let mut tolerated = Vec::new();

    let v0 = inputs.speed_kn / (3.28 * non_zero(hull.length)).sqrt();
    let (v_min, v_max) = SPEED_COEFFICIENT_RANGE;
    let speed_violation = if v0 < v_min {
        Some(PowerFailure::SpeedLow { v0 })
    } else if v0 > v_max {
        Some(PowerFailure::SpeedHigh { v0 })
    } else {
        None
    };
    if let Some(violation) = speed_violation {
        if !policy.ignore_speed {
            return Err(violation);
        }
        tolerated.push(violation);
    }

    let effective = effective_power(hull, inputs.speed_kn);
    let point = solve_propeller(hull, effective, inputs, policy.max_pitch_iterations)?;

    let (p_min, p_max) = PITCH_RATIO_RANGE;
    let pitch_violation = if point.pitch_ratio > p_max {
        Some(PowerFailure::PitchHigh {
            pitch_ratio: point.pitch_ratio,
        })
    } else if point.pitch_ratio < p_min {
        Some(PowerFailure::PitchLow {
            pitch_ratio: point.pitch_ratio,
        })
    } else {
        None
    };
    if let Some(violation) = pitch_violation {
        if !policy.ignore_pitch {
            return Err(violation);
        }
        tolerated.push(violation);
    }

    let open_water = point.thrust_coefficient * point.advance_ratio
        / (2.0 * PI * non_zero(point.torque_coefficient));
    let hull_efficiency = (1.0 - point.thrust_deduction) / (1.0 - point.wake_fraction);
    let qpc = open_water * hull_efficiency;
    let correlation = 1.2 - hull.length.max(0.0).sqrt() / 47.0;
    let service =
        effective / non_zero(qpc) * correlation / non_zero(inputs.transmission_efficiency);

    Ok(PowerEstimate {
        speed_coefficient: v0,
        effective_power: effective,
        service_power: service,
        installed_power: service * (1.0 + POWER_MARGIN),
        pitch_ratio: point.pitch_ratio,
        open_water_efficiency: open_water,
        hull_efficiency,
        quasi_propulsive_coefficient: qpc,
        correlation_factor: correlation,
        transmission_efficiency: inputs.transmission_efficiency,
        wake_fraction: point.wake_fraction,
        thrust_deduction: point.thrust_deduction,
        pitch_iterations: point.iterations,
        tolerated,
    })
}

/// Displaced volume `L·B·T·CB` (m³).
pub fn displaced_volume(hull: &HullDimensions) -> f64 {
    hull.length * hull.breadth * hull.draught * hull.block
}
