//! Single-case solve: validation, length search or fixed-hull evaluation,
//! volume repair, economics and the post-solve checks.

use tracing::{debug, info, warn};

use crate::dimensions::{LengthSearch, SearchOutcome};
use crate::economics::{evaluate_economics, evaluate_emissions};
use crate::error::Result;
use crate::power::{PowerFailure, PowerPolicy};
use crate::profiles::DesignBasis;
use crate::request::{DesignMode, DesignRequest, ResolvedRequest};
use crate::result::{DesignResult, DesignWarning, SolveStatus, TeuCheck, TraceEvent};
use crate::stability::MINIMUM_GM;
use crate::state::{DesignState, StageContext};
use crate::volume::{expand_for_volume, teu_capacity, ExpansionSettings};

/// Solve one design request.
///
/// Returns `Err` only for requests that fail validation or name an unknown
/// ship or fuel type. Every solver outcome, including constraint violations,
/// is a [`DesignResult`] with a typed [`SolveStatus`].
///
/// # Example
///
/// ```
/// use shipdes_lib::{solve, DesignRequest};
///
/// let result = solve(&DesignRequest::default()).expect("valid request");
/// assert!(result.is_success());
/// ```
pub fn solve(request: &DesignRequest) -> Result<DesignResult> {
    let resolved = request.resolve()?;
    let mode = request.design_mode;
    let options = &request.options;

    // Violations are only tolerated while searching for a length.
    let policy = PowerPolicy {
        ignore_speed: mode != DesignMode::Dimensions && options.ignore_speed_violation,
        ignore_pitch: mode != DesignMode::Dimensions && options.ignore_pitch_violation,
        max_pitch_iterations: options.max_pitch_iterations,
    };
    let context = StageContext::new(&resolved, policy);

    debug!(
        mode = %mode,
        ship = resolved.ship.name,
        fuel = resolved.fuel.name,
        target_weight = resolved.target_weight,
        "solving design request"
    );

    let mut run = Run::new(&resolved);

    let (state, iterations) = match mode {
        DesignMode::Dimensions => {
            let hull = request.dimensions;
            let freeboard = context.freeboard(&hull);
            match context.evaluate(hull, freeboard) {
                Ok(state) => (state, 0),
                Err(failure) => return Ok(run.failed(failure, 0)),
            }
        }
        DesignMode::Deadweight | DesignMode::Teu => {
            let search = LengthSearch {
                context: &context,
                constraints: &request.constraints,
                calibration: &request.calibration,
                target_weight: resolved.target_weight,
                tolerance: resolved.tolerance,
                max_iterations: options.max_dimension_iterations,
            };
            let mut tolerated = Vec::new();
            let outcome = search.run(run.trace_sink(), &mut tolerated);
            run.record_tolerated(&tolerated);
            match outcome {
                SearchOutcome::Converged { state, iterations } => (state, iterations),
                SearchOutcome::CapReached {
                    state,
                    iterations,
                    last_error,
                } => {
                    let status = SolveStatus::DimensionSearchNonConvergent {
                        iterations,
                        last_error,
                    };
                    return Ok(run.finish(status, Some(state), iterations));
                }
                SearchOutcome::Failed {
                    failure,
                    iterations,
                } => return Ok(run.failed(failure, iterations)),
            }
        }
    };

    Ok(run.complete(&context, state, iterations))
}

/// Accumulates trace and warnings while one request is solved.
struct Run<'a> {
    resolved: &'a ResolvedRequest<'a>,
    warnings: Vec<DesignWarning>,
    trace: Vec<TraceEvent>,
    volume: Option<crate::volume::VolumeCheck>,
}

impl<'a> Run<'a> {
    fn new(resolved: &'a ResolvedRequest<'a>) -> Self {
        Self {
            resolved,
            warnings: Vec::new(),
            trace: Vec::new(),
            volume: None,
        }
    }

    fn trace_sink(&mut self) -> Option<&mut Vec<TraceEvent>> {
        self.resolved
            .request
            .options
            .record_trace
            .then_some(&mut self.trace)
    }

    fn record_tolerated(&mut self, tolerated: &[PowerFailure]) {
        for failure in tolerated {
            let warning = match *failure {
                PowerFailure::SpeedLow { v0 } | PowerFailure::SpeedHigh { v0 } => {
                    DesignWarning::SpeedViolationTolerated { v0 }
                }
                PowerFailure::PitchLow { pitch_ratio } | PowerFailure::PitchHigh { pitch_ratio } => {
                    DesignWarning::PitchViolationTolerated { pitch_ratio }
                }
                PowerFailure::NotConverge { .. } => continue,
            };
            self.warnings.push(warning);
        }
    }

    /// Post-balance stages of a successful weight balance.
    fn complete(mut self, context: &StageContext, state: DesignState, iterations: u32) -> DesignResult {
        let request = self.resolved.request;
        let ship = context.ship;
        let fuel = context.fuel;

        let state = if request.volume_limit_enabled || ship.design_basis == DesignBasis::Volume {
            let cargo_density = request.cargo_density_override.unwrap_or(ship.cargo_density);
            // Searching modes hold the requested cargo; a fixed hull keeps its own.
            let (cargo_target, cargo_tolerance) = match request.design_mode {
                DesignMode::Dimensions => {
                    let cargo = state.masses.cargo_deadweight;
                    (cargo, 0.01 * cargo.abs() * request.error_pct)
                }
                DesignMode::Deadweight | DesignMode::Teu => {
                    (self.resolved.target_weight, self.resolved.tolerance)
                }
            };
            let settings = ExpansionSettings {
                max_steps: request.options.max_volume_iterations,
                power_retry_limit: request.options.power_retry_limit,
                cargo_target,
                cargo_tolerance,
            };
            let outcome = expand_for_volume(
                state,
                context,
                &request.constraints,
                cargo_density,
                settings,
                self.trace_sink(),
            );
            self.warnings.extend(outcome.warnings);
            self.volume = Some(outcome.check);
            outcome.state
        } else {
            state
        };

        let cargo = state.masses.cargo_deadweight;
        if cargo <= 0.0 {
            warn!(cargo_deadweight = cargo, "design has no cargo capacity");
            let status = SolveStatus::NegativeCargoCapacity {
                cargo_deadweight: cargo,
            };
            return self.finish(status, Some(state), iterations);
        }

        if state.metacentric_height < MINIMUM_GM {
            warn!(
                metacentric_height = state.metacentric_height,
                "approximate GM below minimum"
            );
            self.warnings.push(DesignWarning::LowStability {
                metacentric_height: state.metacentric_height,
            });
        }

        info!(
            length = state.hull.length,
            cargo_deadweight = cargo,
            installed_kw = state.power.installed_power_kw(),
            "design solved"
        );

        let mut result = self.finish(SolveStatus::Success, Some(state), iterations);
        if let Some(state) = result.state.as_ref() {
            let teu_weight = (request.design_mode == DesignMode::Teu).then_some(request.teu_avg_weight);
            result.economics = request
                .economics
                .as_ref()
                .map(|econ| evaluate_economics(state, fuel, econ, teu_weight));
            result.emissions = Some(evaluate_emissions(
                state,
                ship,
                fuel,
                request.speed_kn,
                request.economics.as_ref(),
            ));

            if request.design_mode == DesignMode::Teu {
                let estimated = teu_capacity(state.hull.length, state.hull.breadth, state.hull.depth);
                if estimated < request.teu_count {
                    warn!(target_teu = request.teu_count, estimated, "hull volume limits TEU capacity");
                    result.warnings.push(DesignWarning::VolumeLimitedTeu {
                        target: request.teu_count,
                        estimated,
                    });
                }
                result.teu = Some(TeuCheck {
                    target: request.teu_count,
                    estimated,
                });
            }
        }
        result
    }

    /// A constraint violation aborted the solve; no geometry is reported.
    fn failed(self, failure: PowerFailure, iterations: u32) -> DesignResult {
        warn!(%failure, iterations, "solve aborted by constraint violation");
        self.finish(SolveStatus::from(failure), None, iterations)
    }

    fn finish(self, status: SolveStatus, state: Option<DesignState>, iterations: u32) -> DesignResult {
        let resolved = self.resolved;
        let request = resolved.request;
        let target_weight = (request.design_mode != DesignMode::Dimensions).then_some(resolved.target_weight);
        let range_nm = (!resolved.fuel.nuclear).then_some(request.range_nm);

        DesignResult {
            status,
            design_mode: request.design_mode,
            ship_type: resolved.ship.name,
            fuel_type: resolved.fuel.name,
            target_weight,
            state,
            range_nm,
            volume: self.volume,
            economics: None,
            emissions: None,
            teu: None,
            warnings: self.warnings,
            trace: self.trace,
            iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::HullDimensions;

    #[test]
    fn speed_too_low_fails_without_state() {
        let request = DesignRequest {
            speed_kn: 5.0,
            ..DesignRequest::default()
        };
        let result = solve(&request).expect("valid request");
        assert!(matches!(
            result.status,
            SolveStatus::SpeedOutOfRange {
                bound: crate::result::Bound::Low,
                ..
            }
        ));
        assert!(result.state.is_none());
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn dimensions_mode_ignores_tolerance_flags() {
        let request = DesignRequest {
            design_mode: DesignMode::Dimensions,
            speed_kn: 5.0,
            options: crate::request::SolverOptions {
                ignore_speed_violation: true,
                ..Default::default()
            },
            ..DesignRequest::default()
        };
        let result = solve(&request).expect("valid request");
        assert!(matches!(result.status, SolveStatus::SpeedOutOfRange { .. }));
    }

    #[test]
    fn trace_is_recorded_on_request() {
        let mut request = DesignRequest::default();
        request.options.record_trace = true;
        let result = solve(&request).expect("valid request");
        assert_eq!(result.trace.len() as u32, result.iterations);

        request.options.record_trace = false;
        assert!(solve(&request).expect("valid").trace.is_empty());
    }

    #[test]
    fn nuclear_range_is_unbounded() {
        let request = DesignRequest {
            design_mode: DesignMode::Dimensions,
            fuel_type: "Nuclear Steam Turbine".to_string(),
            dimensions: HullDimensions::default(),
            ..DesignRequest::default()
        };
        let result = solve(&request).expect("valid request");
        assert!(result.is_success(), "{}", result.status);
        assert_eq!(result.range_nm, None);
        assert_eq!(result.state.expect("state").masses.fuel, 0.0);
    }
}
