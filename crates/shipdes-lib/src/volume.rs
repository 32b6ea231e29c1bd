//! Hull volume check and the expansion loop that repairs a volume-limited design.
//!
//! After the weight balance is met the cargo, fuel, machinery and stores must
//! also fit. When they do not, length, breadth and depth grow by a fixed factor
//! per step and the draught is re-derived so the larger hull still carries the
//! same cargo deadweight. Power and masses are re-evaluated at every step.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::mass::MassBreakdown;
use crate::power::{estimate_power, PowerEstimate, PowerFailure, PowerPolicy};
use crate::profiles::{FuelProfile, ShipTypeProfile};
use crate::request::{GeometricConstraints, HullDimensions};
use crate::result::{DesignWarning, TraceEvent};
use crate::state::{DesignState, StageContext};
use crate::tables::{non_zero, teu, SEA_WATER_DENSITY};

/// Linear growth of each dimension per expansion step.
pub const EXPANSION_FACTOR: f64 = 1.02;
/// Stowage density assumed for machinery spaces (t/m³).
pub const MACHINERY_DENSITY: f64 = 0.6;
/// Stowage density assumed for stores (t/m³).
pub const STORES_DENSITY: f64 = 1.0;

const DRAUGHT_ITERATIONS: u32 = 50;
/// Draught limits as fractions of depth while rebalancing.
const MIN_DRAUGHT_DEPTH_RATIO: f64 = 0.1;
const MAX_DRAUGHT_DEPTH_RATIO: f64 = 0.95;

/// Space required by each load (m³).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeDemand {
    pub cargo: f64,
    pub fuel: f64,
    pub machinery: f64,
    pub stores: f64,
}

impl VolumeDemand {
    pub fn total(&self) -> f64 {
        self.cargo + self.fuel + self.machinery + self.stores
    }
}

/// Result of the volume check on the final hull.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeCheck {
    pub required: f64,
    pub available: f64,
    pub ratio: f64,
    /// Expansion steps taken (0 when the first hull fitted).
    pub steps: u32,
    pub feasible: bool,
}

/// Volume required for the loads of a mass breakdown.
pub fn required_volume(
    masses: &MassBreakdown,
    fuel: &FuelProfile,
    cargo_density: f64,
) -> VolumeDemand {
    let fuel_volume = if fuel.nuclear {
        0.0
    } else {
        masses.fuel / non_zero(fuel.tank_weight_multiplier) / non_zero(fuel.density)
            * fuel.tank_volume_multiplier
    };
    VolumeDemand {
        cargo: masses.cargo_deadweight.max(0.0) / non_zero(cargo_density),
        fuel: fuel_volume,
        machinery: masses.machinery / MACHINERY_DENSITY,
        stores: masses.stores / STORES_DENSITY,
    }
}

/// Moulded hull volume to the depth, using the block coefficient at depth.
pub fn hull_volume(hull: &HullDimensions) -> f64 {
    let block_at_depth =
        hull.block + (1.0 - hull.block) * (0.8 * hull.depth - hull.draught) / (3.0 * non_zero(hull.draught));
    hull.length * hull.breadth * hull.depth * block_at_depth.min(1.0)
}

/// Enclosed volume including superstructure (m³).
pub fn available_volume(hull: &HullDimensions, ship: &ShipTypeProfile) -> f64 {
    hull_volume(hull) * ship.profile_factor
}

/// Container capacity of a hull from `L·B·D` (TEU).
pub fn teu_capacity(length: f64, breadth: f64, depth: f64) -> f64 {
    let base = (length * breadth * depth - teu::INTERCEPT) / teu::SLOPE;
    if base <= 0.0 {
        return 0.0;
    }
    base.powf(1.0 / teu::EXPONENT)
}

/// Required over available volume for a state.
pub fn volume_ratio(state: &DesignState, ship: &ShipTypeProfile, fuel: &FuelProfile, cargo_density: f64) -> f64 {
    required_volume(&state.masses, fuel, cargo_density).total()
        / non_zero(available_volume(&state.hull, ship))
}

/// Settings of one expansion run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ExpansionSettings {
    pub max_steps: u32,
    /// Power fallbacks allowed before expansion stops.
    pub power_retry_limit: u32,
    /// Cargo deadweight each grown hull must carry (t).
    pub cargo_target: f64,
    /// Allowed cargo deadweight error after the draught rebalance (t).
    pub cargo_tolerance: f64,
}

/// State and diagnostics after the volume repair.
#[derive(Debug, Clone)]
pub(crate) struct ExpansionOutcome {
    pub state: DesignState,
    pub check: VolumeCheck,
    pub warnings: Vec<DesignWarning>,
}

/// Grow the hull until the loads fit or the step limit is reached.
///
/// Power violations are never tolerated here: a step whose hull fails the
/// power stage runs on scaled power from the previous step, at most
/// `power_retry_limit` times. Idempotent for a hull that already fits.
pub(crate) fn expand_for_volume(
    state: DesignState,
    context: &StageContext,
    constraints: &GeometricConstraints,
    cargo_density: f64,
    settings: ExpansionSettings,
    mut trace: Option<&mut Vec<TraceEvent>>,
) -> ExpansionOutcome {
    let ship = context.ship;
    let fuel = context.fuel;
    let strict = StageContext {
        policy: PowerPolicy {
            ignore_speed: false,
            ignore_pitch: false,
            ..context.policy
        },
        ..*context
    };
    let mut warnings = Vec::new();
    let mut retries = 0;
    let mut steps = 0;
    let mut cargo_error = 0.0;
    let mut current = state;
    let mut ratio = volume_ratio(&current, ship, fuel, cargo_density);

    if ratio <= 1.0 {
        return ExpansionOutcome {
            check: check_for(&current, ship, fuel, cargo_density, 0),
            state: current,
            warnings,
        };
    }

    debug!(ratio, length = current.hull.length, "hull volume insufficient, expanding");

    while ratio > 1.0 && steps < settings.max_steps {
        let step = steps + 1;
        let hull = grow(&current.hull, constraints);
        let rebalanced = rebalance_draught(hull, &current.power, &settings, &strict);
        if let Some(failure) = rebalanced.failure {
            if retries >= settings.power_retry_limit {
                warn!(step, retries, %failure, "power retry limit reached, stopping expansion");
                break;
            }
            retries += 1;
            warn!(step, %failure, "power failed during volume expansion, scaling previous power");
            warnings.push(DesignWarning::PowerRetry { step, failure });
        }
        steps = step;
        current = rebalanced.state;
        cargo_error = rebalanced.cargo_error;
        ratio = volume_ratio(&current, ship, fuel, cargo_density);
        if let Some(events) = trace.as_deref_mut() {
            events.push(TraceEvent::VolumeStep {
                step,
                length: current.hull.length,
                breadth: current.hull.breadth,
                depth: current.hull.depth,
                draught: current.hull.draught,
                volume_ratio: ratio,
            });
        }
    }

    if cargo_error.abs() > settings.cargo_tolerance {
        warn!(
            steps,
            cargo_error,
            tolerance = settings.cargo_tolerance,
            "draught rebalance missed the cargo deadweight"
        );
        warnings.push(DesignWarning::DraughtUnbalanced { steps, cargo_error });
    }

    let check = check_for(&current, ship, fuel, cargo_density, steps);
    if check.feasible {
        info!(steps, length = current.hull.length, "volume expansion fitted all loads");
    } else {
        warn!(steps, ratio = check.ratio, "volume expansion stopped before loads fitted");
        warnings.push(DesignWarning::VolumeInfeasible {
            ratio: check.ratio,
            steps,
        });
    }

    ExpansionOutcome {
        state: current,
        check,
        warnings,
    }
}

fn check_for(
    state: &DesignState,
    ship: &ShipTypeProfile,
    fuel: &FuelProfile,
    cargo_density: f64,
    steps: u32,
) -> VolumeCheck {
    let required = required_volume(&state.masses, fuel, cargo_density).total();
    let available = available_volume(&state.hull, ship);
    let ratio = required / non_zero(available);
    VolumeCheck {
        required,
        available,
        ratio,
        steps,
        feasible: ratio <= 1.0,
    }
}

fn grow(hull: &HullDimensions, constraints: &GeometricConstraints) -> HullDimensions {
    let length = hull.length * EXPANSION_FACTOR;
    let breadth = if let Some(ratio) = constraints.lb_ratio {
        length / ratio
    } else if constraints.breadth.is_some() {
        hull.breadth
    } else {
        hull.breadth * EXPANSION_FACTOR
    };
    HullDimensions {
        length,
        breadth,
        depth: hull.depth * EXPANSION_FACTOR,
        ..*hull
    }
}

/// A grown hull after its draught was re-derived.
struct Rebalanced {
    state: DesignState,
    /// Power failure of the final draught, when fallback power was used.
    failure: Option<PowerFailure>,
    /// Cargo deadweight minus target at the final draught (t).
    cargo_error: f64,
}

/// Find the draught at which the grown hull carries the cargo target.
///
/// Secant iteration on the cargo deadweight error, started from the
/// immersion rate `ρ·L·B·CB` and kept within `[0.1·D, 0.95·D]`. When the
/// power stage fails, the previous power scaled by the square of the
/// expansion factor stands in.
fn rebalance_draught(
    hull: HullDimensions,
    previous_power: &PowerEstimate,
    settings: &ExpansionSettings,
    context: &StageContext,
) -> Rebalanced {
    let mut hull = hull;
    let fallback = previous_power.scaled(EXPANSION_FACTOR * EXPANSION_FACTOR);
    let immersion = non_zero(SEA_WATER_DENSITY * hull.length * hull.breadth * hull.block);
    let min_draught = MIN_DRAUGHT_DEPTH_RATIO * hull.depth;
    let max_draught = MAX_DRAUGHT_DEPTH_RATIO * hull.depth;

    let (mut state, mut failure) = evaluate_or_fallback(hull, &fallback, context);
    let mut error = state.masses.cargo_deadweight - settings.cargo_target;
    let mut previous: Option<(f64, f64)> = None;

    for _ in 0..DRAUGHT_ITERATIONS {
        if error.abs() <= settings.cargo_tolerance {
            break;
        }
        let slope = match previous {
            Some((draught, last_error)) if draught != hull.draught && last_error != error => {
                (error - last_error) / (hull.draught - draught)
            }
            _ => immersion,
        };
        // Cargo capacity grows with draught.
        let slope = if slope > 0.0 { slope } else { immersion };
        let draught = (hull.draught - error / slope).clamp(min_draught, max_draught);
        if draught == hull.draught {
            debug!(draught, cargo_error = error, "draught pinned at its limit");
            break;
        }
        previous = Some((hull.draught, error));
        hull.draught = draught;
        (state, failure) = evaluate_or_fallback(hull, &fallback, context);
        error = state.masses.cargo_deadweight - settings.cargo_target;
    }

    Rebalanced {
        state,
        failure,
        cargo_error: error,
    }
}

fn evaluate_or_fallback(
    hull: HullDimensions,
    fallback: &PowerEstimate,
    context: &StageContext,
) -> (DesignState, Option<PowerFailure>) {
    let freeboard = context.freeboard(&hull);
    match estimate_power(&hull, &context.propulsion, &context.policy) {
        Ok(power) => (context.assemble(hull, freeboard, power), None),
        Err(failure) => (context.assemble(hull, freeboard, fallback.clone()), Some(failure)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::DesignRequest;

    fn context_for(request: &DesignRequest, policy: PowerPolicy) -> StageContext {
        let resolved = request.resolve().expect("valid request");
        StageContext::new(&resolved, policy)
    }

    fn evaluated(context: &StageContext) -> DesignState {
        let hull = HullDimensions::default();
        context
            .evaluate(hull, context.freeboard(&hull))
            .expect("reference hull is powered")
    }

    fn settings(cargo_target: f64) -> ExpansionSettings {
        ExpansionSettings {
            max_steps: 5,
            power_retry_limit: 5,
            cargo_target,
            cargo_tolerance: 0.5,
        }
    }

    fn retries(warnings: &[DesignWarning]) -> usize {
        warnings
            .iter()
            .filter(|w| matches!(w, DesignWarning::PowerRetry { .. }))
            .count()
    }

    #[test]
    fn grown_hull_is_rebalanced_to_the_cargo_target() {
        let context = context_for(&DesignRequest::default(), PowerPolicy::default());
        let state = evaluated(&context);
        let target = state.masses.cargo_deadweight;
        let grown = grow(&state.hull, &GeometricConstraints::default());

        let rebalanced = rebalance_draught(grown, &state.power, &settings(target), &context);
        assert!(rebalanced.cargo_error.abs() <= 0.5, "error {}", rebalanced.cargo_error);
        assert!((rebalanced.state.masses.cargo_deadweight - target).abs() <= 0.5);
        assert!(rebalanced.state.hull.draught < state.hull.draught);
    }

    #[test]
    fn unreachable_cargo_pins_draught_and_warns() {
        let context = context_for(&DesignRequest::default(), PowerPolicy::default());
        let state = evaluated(&context);
        let target = 3.0 * state.masses.cargo_deadweight;

        let grown = grow(&state.hull, &GeometricConstraints::default());
        let rebalanced = rebalance_draught(grown, &state.power, &settings(target), &context);
        assert!(rebalanced.cargo_error < -0.5);
        assert!((rebalanced.state.hull.draught - 0.95 * grown.depth).abs() < 1e-9);

        let outcome = expand_for_volume(
            state,
            &context,
            &GeometricConstraints::default(),
            0.01,
            ExpansionSettings {
                max_steps: 1,
                ..settings(target)
            },
            None,
        );
        assert!(outcome.warnings.iter().any(|w| matches!(
            w,
            DesignWarning::DraughtUnbalanced { steps: 1, cargo_error } if *cargo_error < 0.0
        )));
        assert!(outcome
            .warnings
            .iter()
            .any(|w| matches!(w, DesignWarning::VolumeInfeasible { .. })));
    }

    #[test]
    fn tolerated_pitch_is_retried_during_expansion() {
        let request = DesignRequest {
            engine_rpm: 200.0,
            propeller_rpm: 200.0,
            ..DesignRequest::default()
        };
        let tolerant = PowerPolicy {
            ignore_speed: true,
            ignore_pitch: true,
            ..PowerPolicy::default()
        };
        let context = context_for(&request, tolerant);
        let state = evaluated(&context);
        assert!(state.power.tolerated.iter().any(PowerFailure::is_pitch));
        let target = state.masses.cargo_deadweight;

        let outcome = expand_for_volume(
            state,
            &context,
            &GeometricConstraints::default(),
            0.01,
            settings(target),
            None,
        );
        assert_eq!(retries(&outcome.warnings), 5);
        assert!(outcome.warnings.iter().all(|w| match w {
            DesignWarning::PowerRetry { failure, .. } => failure.is_pitch(),
            _ => true,
        }));
    }

    #[test]
    fn retry_limit_caps_fallback_steps() {
        let request = DesignRequest {
            engine_rpm: 200.0,
            propeller_rpm: 200.0,
            ..DesignRequest::default()
        };
        let tolerant = PowerPolicy {
            ignore_pitch: true,
            ..PowerPolicy::default()
        };
        let context = context_for(&request, tolerant);
        let state = evaluated(&context);
        let target = state.masses.cargo_deadweight;

        for limit in [0, 1, 3] {
            let outcome = expand_for_volume(
                state.clone(),
                &context,
                &GeometricConstraints::default(),
                0.01,
                ExpansionSettings {
                    power_retry_limit: limit,
                    ..settings(target)
                },
                None,
            );
            assert_eq!(retries(&outcome.warnings), limit as usize);
            assert_eq!(outcome.check.steps, limit);
            assert!(!outcome.check.feasible);
        }

        let untouched = expand_for_volume(
            state.clone(),
            &context,
            &GeometricConstraints::default(),
            0.01,
            ExpansionSettings {
                power_retry_limit: 0,
                ..settings(target)
            },
            None,
        );
        assert_eq!(untouched.state.hull, state.hull);
    }

    #[test]
    fn block_at_depth_grows_above_waterline() {
        let hull = HullDimensions {
            length: 100.0,
            breadth: 20.0,
            depth: 10.0,
            draught: 6.0,
            block: 0.7,
        };
        let volume = hull_volume(&hull);
        assert!(volume > 100.0 * 20.0 * 10.0 * 0.7);
        assert!(volume < 100.0 * 20.0 * 10.0);
    }

    #[test]
    fn teu_capacity_inverts_volume_regression() {
        let boxes = 3_000.0_f64;
        let lbd = -20_143.62 + 104.422 * boxes.powf(0.9);
        let breadth = 32.0;
        let depth = 18.0;
        let length = lbd / (breadth * depth);
        assert!((teu_capacity(length, breadth, depth) - boxes).abs() < 1e-6);
    }

    #[test]
    fn breadth_is_held_when_fixed() {
        let hull = HullDimensions::default();
        let constraints = GeometricConstraints {
            breadth: Some(hull.breadth),
            ..GeometricConstraints::default()
        };
        let grown = grow(&hull, &constraints);
        assert_eq!(grown.breadth, hull.breadth);
        assert!((grown.length - hull.length * 1.02).abs() < 1e-12);
    }

    #[test]
    fn lb_ratio_is_held_when_constrained() {
        let hull = HullDimensions {
            breadth: 207.34301 / 6.5,
            ..HullDimensions::default()
        };
        let constraints = GeometricConstraints {
            lb_ratio: Some(6.5),
            ..GeometricConstraints::default()
        };
        let grown = grow(&hull, &constraints);
        assert!((grown.length / grown.breadth - 6.5).abs() < 1e-12);
    }
}
