//! Solver output: status, warnings, trace and the assembled result.

use std::fmt;

use serde::Serialize;

use crate::economics::{EconomicsSummary, EmissionsSummary};
use crate::power::PowerFailure;
use crate::request::DesignMode;
use crate::state::DesignState;
use crate::volume::VolumeCheck;

/// Side of a validity band that was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    Low,
    High,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bound::Low => "low",
            Bound::High => "high",
        })
    }
}

/// Outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SolveStatus {
    Success,
    SpeedOutOfRange { bound: Bound, v0: f64 },
    PitchOutOfRange { bound: Bound, pitch_ratio: f64 },
    PowerSolveNonConvergent { iterations: u32 },
    DimensionSearchNonConvergent { iterations: u32, last_error: f64 },
    NegativeCargoCapacity { cargo_deadweight: f64 },
}

impl SolveStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SolveStatus::Success)
    }
}

impl From<PowerFailure> for SolveStatus {
    fn from(failure: PowerFailure) -> Self {
        match failure {
            PowerFailure::SpeedLow { v0 } => SolveStatus::SpeedOutOfRange {
                bound: Bound::Low,
                v0,
            },
            PowerFailure::SpeedHigh { v0 } => SolveStatus::SpeedOutOfRange {
                bound: Bound::High,
                v0,
            },
            PowerFailure::PitchLow { pitch_ratio } => SolveStatus::PitchOutOfRange {
                bound: Bound::Low,
                pitch_ratio,
            },
            PowerFailure::PitchHigh { pitch_ratio } => SolveStatus::PitchOutOfRange {
                bound: Bound::High,
                pitch_ratio,
            },
            PowerFailure::NotConverge { iterations } => {
                SolveStatus::PowerSolveNonConvergent { iterations }
            }
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Success => f.write_str("success"),
            SolveStatus::SpeedOutOfRange { bound, v0 } => {
                write!(f, "ship speed too {bound}: V0 is {v0:.3} (valid 0.35-0.90)")
            }
            SolveStatus::PitchOutOfRange { bound, pitch_ratio } => write!(
                f,
                "propeller pitch ratio too {bound}: {pitch_ratio:.4} (valid 0.50-1.40)"
            ),
            SolveStatus::PowerSolveNonConvergent { iterations } => write!(
                f,
                "propeller pitch iteration did not converge in {iterations} steps"
            ),
            SolveStatus::DimensionSearchNonConvergent {
                iterations,
                last_error,
            } => write!(
                f,
                "length search did not converge in {iterations} iterations (last error {last_error:.2} t); allowable error too small"
            ),
            SolveStatus::NegativeCargoCapacity { cargo_deadweight } => write!(
                f,
                "no cargo capacity: lightship, fuel and stores exceed displacement ({cargo_deadweight:.1} t)"
            ),
        }
    }
}

/// Non-fatal conditions recorded on a result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DesignWarning {
    /// Volume expansion stopped before required volume fit.
    VolumeInfeasible { ratio: f64, steps: u32 },
    /// The hull carries the TEU weight but not the TEU count.
    VolumeLimitedTeu { target: f64, estimated: f64 },
    SpeedViolationTolerated { v0: f64 },
    PitchViolationTolerated { pitch_ratio: f64 },
    /// A power failure during volume expansion was replaced by scaled power.
    PowerRetry { step: u32, failure: PowerFailure },
    /// The expanded hull's draught could not be set to carry the cargo target.
    DraughtUnbalanced { steps: u32, cargo_error: f64 },
    LowStability { metacentric_height: f64 },
}

impl fmt::Display for DesignWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesignWarning::VolumeInfeasible { ratio, steps } => write!(
                f,
                "volume-limited design: required/available volume {ratio:.3} after {steps} expansion steps"
            ),
            DesignWarning::VolumeLimitedTeu { target, estimated } => write!(
                f,
                "volume-limited design: target {target:.0} TEU, estimated capacity {estimated:.0} TEU"
            ),
            DesignWarning::SpeedViolationTolerated { v0 } => {
                write!(f, "speed coefficient {v0:.3} outside regression range was tolerated")
            }
            DesignWarning::PitchViolationTolerated { pitch_ratio } => {
                write!(f, "pitch ratio {pitch_ratio:.4} outside valid range was tolerated")
            }
            DesignWarning::PowerRetry { step, failure } => {
                write!(f, "volume step {step}: {failure}; power scaled from previous step")
            }
            DesignWarning::DraughtUnbalanced { steps, cargo_error } => write!(
                f,
                "cargo deadweight off target by {cargo_error:+.2} t after {steps} expansion steps"
            ),
            DesignWarning::LowStability { metacentric_height } => {
                write!(f, "approximate GM {metacentric_height:.2} m is low")
            }
        }
    }
}

/// Structured record of one solver step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "stage")]
pub enum TraceEvent {
    LengthIteration {
        iteration: u32,
        length: f64,
        breadth: f64,
        depth: f64,
        draught: f64,
        block: f64,
        cargo_deadweight: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        tolerated: Option<PowerFailure>,
    },
    VolumeStep {
        step: u32,
        length: f64,
        breadth: f64,
        depth: f64,
        draught: f64,
        volume_ratio: f64,
    },
}

/// TEU capacity achievable by the solved hull.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TeuCheck {
    pub target: f64,
    pub estimated: f64,
}

/// The solver's sole output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignResult {
    pub status: SolveStatus,
    pub design_mode: DesignMode,
    pub ship_type: &'static str,
    pub fuel_type: &'static str,
    /// Target cargo deadweight of searching modes (t).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
    /// Final design; absent when a constraint violation aborted the solve.
    pub state: Option<DesignState>,
    /// Endurance (nm); `None` when unbounded.
    pub range_nm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumeCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub economics: Option<EconomicsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emissions: Option<EmissionsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teu: Option<TeuCheck>,
    pub warnings: Vec<DesignWarning>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceEvent>,
    /// Length-search iterations performed (0 in dimensions mode).
    pub iterations: u32,
}

impl DesignResult {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn service_power_kw(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.power.service_power_kw())
    }

    pub fn installed_power_kw(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.power.installed_power_kw())
    }

    pub fn required_freight_rate(&self) -> Option<f64> {
        self.economics.as_ref().map(|e| e.required_freight_rate)
    }

    pub fn has_warning(&self, predicate: impl Fn(&DesignWarning) -> bool) -> bool {
        self.warnings.iter().any(predicate)
    }
}
