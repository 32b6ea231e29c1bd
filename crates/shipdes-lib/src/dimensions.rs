//! Trial hull geometry and the outer length search.
//!
//! The search reproduces the legacy bracket-and-secant policy: step length by
//! a fixed increment while the predicted cargo deadweight stays short of the
//! target, interpolate once the target is bracketed, then step back by half the
//! increment and continue with a quartered increment. The regression surface
//! is not monotonic, so the policy is kept as is rather than replaced by a
//! general-purpose root finder.

use tracing::{debug, info, warn};

use crate::power::PowerFailure;
use crate::profiles::ShipTypeProfile;
use crate::request::{Calibration, GeometricConstraints, HullDimensions};
use crate::result::TraceEvent;
use crate::state::{DesignState, StageContext};
use crate::tables::{non_zero, EPSILON};

/// Initial length increment of the search (m).
pub const INITIAL_STEP: f64 = 10.0;

/// Hull and freeboard derived from a trial length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialGeometry {
    pub hull: HullDimensions,
    pub freeboard: f64,
}

/// Derive breadth, block, depth and draught for a trial length.
pub fn trial_geometry(
    length: f64,
    speed_kn: f64,
    ship: &ShipTypeProfile,
    constraints: &GeometricConstraints,
    calibration: &Calibration,
) -> TrialGeometry {
    let length = non_zero(length);
    let breadth = if let Some(ratio) = constraints.lb_ratio {
        length / ratio
    } else if let Some(breadth) = constraints.breadth {
        breadth
    } else {
        calibration.breadth_regression().breadth(length)
    };

    let speed_length_ratio = speed_kn / non_zero(length.max(0.0).sqrt());
    let block = constraints.block.unwrap_or_else(|| {
        calibration
            .block_regression(ship)
            .block_coefficient(speed_length_ratio)
    });

    let freeboard_for = |depth: f64, draught: f64| {
        crate::freeboard::minimum_freeboard(length, block, draught, depth, ship.freeboard_class)
    };

    let (depth, draught, freeboard) = if let Some(ratio) = constraints.bt_ratio {
        let draught = breadth / ratio;
        let depth = draught / ship.draught_ratio;
        (depth, draught, freeboard_for(depth, draught))
    } else {
        let depth = ship.depth_rule.depth(length, breadth);
        let draught = ship.draught_ratio * depth;
        let freeboard = freeboard_for(depth, draught);
        let draught = if ship.draught_from_freeboard {
            depth - freeboard
        } else {
            draught
        };
        (depth, draught, freeboard)
    };

    TrialGeometry {
        hull: HullDimensions {
            length,
            breadth,
            depth,
            draught,
            block,
        },
        freeboard,
    }
}

/// How the length search ended.
#[derive(Debug, Clone)]
pub(crate) enum SearchOutcome {
    Converged {
        state: DesignState,
        iterations: u32,
    },
    CapReached {
        state: DesignState,
        iterations: u32,
        last_error: f64,
    },
    Failed {
        failure: PowerFailure,
        iterations: u32,
    },
}

/// Inputs of one length search.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LengthSearch<'a> {
    pub context: &'a StageContext,
    pub constraints: &'a GeometricConstraints,
    pub calibration: &'a Calibration,
    pub target_weight: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl LengthSearch<'_> {
    pub fn initial_length(&self) -> f64 {
        self.calibration
            .length_regression(self.context.ship)
            .initial_length(self.target_weight)
    }

    /// Run the search. Tolerated power violations are pushed to `tolerated`
    /// the first time each kind appears.
    pub fn run(
        &self,
        mut trace: Option<&mut Vec<TraceEvent>>,
        tolerated: &mut Vec<PowerFailure>,
    ) -> SearchOutcome {
        let target = self.target_weight;
        let mut length = self.initial_length();
        let mut predicted = target + 2.0 * self.tolerance + 10.0;
        let mut bracket_count: i32 = 0;
        let mut step_count: i32 = 1;
        let mut step = INITIAL_STEP;
        let mut bracket_length = 0.0;
        let mut bracket_weight = 0.0;
        let mut iterations = 0;
        let mut last: Option<DesignState> = None;

        debug!(
            ship = self.context.ship.name,
            target_weight = target,
            tolerance = self.tolerance,
            initial_length = length,
            "starting length search"
        );

        while iterations < self.max_iterations && (target - predicted).abs() > self.tolerance {
            iterations += 1;
            if iterations > 1 {
                if step_count != bracket_count + 1 {
                    length -= 0.5 * step;
                    step_count += 1;
                } else if target >= predicted {
                    bracket_length = length;
                    bracket_weight = predicted;
                    length += step;
                } else {
                    if predicted - bracket_weight == 0.0 {
                        predicted = bracket_weight + EPSILON;
                    }
                    length = bracket_length
                        + (target - bracket_weight) * (length - bracket_length)
                            / (predicted - bracket_weight);
                    step *= 0.25;
                    step_count += 1;
                    bracket_count += 2;
                }
            }

            let geometry = trial_geometry(
                length,
                self.context.propulsion.speed_kn,
                self.context.ship,
                self.constraints,
                self.calibration,
            );
            length = geometry.hull.length;

            let state = match self.context.evaluate(geometry.hull, geometry.freeboard) {
                Ok(state) => state,
                Err(failure) => {
                    debug!(iteration = iterations, length, %failure, "length search aborted");
                    return SearchOutcome::Failed {
                        failure,
                        iterations,
                    };
                }
            };

            for violation in &state.power.tolerated {
                let seen = tolerated.iter().any(|t| {
                    (t.is_speed() && violation.is_speed()) || (t.is_pitch() && violation.is_pitch())
                });
                if !seen {
                    warn!(iteration = iterations, length, %violation, "tolerating power violation");
                    tolerated.push(*violation);
                }
            }

            predicted = state.masses.cargo_deadweight;
            debug!(
                iteration = iterations,
                length,
                breadth = state.hull.breadth,
                draught = state.hull.draught,
                block = state.hull.block,
                cargo_deadweight = predicted,
                "length iteration"
            );
            if let Some(events) = trace.as_deref_mut() {
                events.push(TraceEvent::LengthIteration {
                    iteration: iterations,
                    length,
                    breadth: state.hull.breadth,
                    depth: state.hull.depth,
                    draught: state.hull.draught,
                    block: state.hull.block,
                    cargo_deadweight: predicted,
                    tolerated: state.power.tolerated.first().copied(),
                });
            }
            last = Some(state);
        }

        let Some(state) = last else {
            return SearchOutcome::Failed {
                failure: PowerFailure::NotConverge { iterations: 0 },
                iterations,
            };
        };

        // A violation still present on the final trial is fatal even when tolerated.
        if let Some(failure) = state.power.tolerated.first().copied() {
            warn!(iterations, %failure, "final length trial still violates a power constraint");
            return SearchOutcome::Failed {
                failure,
                iterations,
            };
        }

        let last_error = (target - predicted).abs();
        if last_error > self.tolerance {
            warn!(
                iterations,
                last_error,
                tolerance = self.tolerance,
                "length search hit its iteration cap"
            );
            return SearchOutcome::CapReached {
                state,
                iterations,
                last_error,
            };
        }

        info!(
            iterations,
            length = state.hull.length,
            cargo_deadweight = predicted,
            "length search converged"
        );
        SearchOutcome::Converged { state, iterations }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::ship_type;

    #[test]
    fn tanker_draught_is_cut_to_freeboard() {
        let ship = ship_type("Tanker").unwrap();
        let geometry = trial_geometry(
            200.0,
            15.0,
            ship,
            &GeometricConstraints::default(),
            &Calibration::default(),
        );
        let hull = geometry.hull;
        assert!((hull.depth - 200.0 / 13.5).abs() < 1e-12);
        assert!((hull.draught - (hull.depth - geometry.freeboard)).abs() < 1e-12);
        assert!((hull.breadth - 200.0 / 6.5).abs() < 1e-12);
    }

    #[test]
    fn cargo_vessel_keeps_ratio_draught() {
        let ship = ship_type("Cargo vessel").unwrap();
        let geometry = trial_geometry(
            120.0,
            15.0,
            ship,
            &GeometricConstraints::default(),
            &Calibration::default(),
        );
        let hull = geometry.hull;
        let breadth = 120.0 / (4.0 + 0.025 * 90.0);
        assert!((hull.breadth - breadth).abs() < 1e-12);
        assert!((hull.depth - (breadth - 2.74) / 1.4).abs() < 1e-12);
        assert!((hull.draught - 0.7 * hull.depth).abs() < 1e-12);
    }

    #[test]
    fn constraints_override_regressions() {
        let ship = ship_type("Bulk carrier").unwrap();
        let constraints = GeometricConstraints {
            lb_ratio: Some(6.0),
            bt_ratio: Some(2.5),
            block: Some(0.8),
            ..GeometricConstraints::default()
        };
        let geometry = trial_geometry(180.0, 14.0, ship, &constraints, &Calibration::default());
        let hull = geometry.hull;
        assert_eq!(hull.breadth, 30.0);
        assert_eq!(hull.draught, 12.0);
        assert!((hull.depth - 12.0 / 0.7).abs() < 1e-12);
        assert_eq!(hull.block, 0.8);
    }

    #[test]
    fn calibrated_breadth_regression_is_used() {
        let ship = ship_type("Tanker").unwrap();
        let calibration = Calibration {
            breadth: Some(crate::profiles::BreadthRegression {
                high_ratio: 5.0,
                ..Default::default()
            }),
            ..Calibration::default()
        };
        let geometry = trial_geometry(
            200.0,
            15.0,
            ship,
            &GeometricConstraints::default(),
            &calibration,
        );
        assert_eq!(geometry.hull.breadth, 40.0);
    }
}
