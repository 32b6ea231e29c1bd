//! Range analysis: solve the same request with one input stepped over a
//! linear range and tabulate the results.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::request::{DesignMode, DesignRequest};
use crate::result::DesignResult;
use crate::solver::solve;

/// Marker written in every result column of a failed sample.
pub const FAILED_CELL: &str = "CALCULATION FAILED";

/// Request input varied by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepParameter {
    Speed,
    CargoDeadweight,
    TeuCount,
    LengthBreadthRatio,
    Breadth,
    BreadthDraughtRatio,
    BlockCoefficient,
}

impl SweepParameter {
    pub const ALL: [SweepParameter; 7] = [
        SweepParameter::Speed,
        SweepParameter::CargoDeadweight,
        SweepParameter::TeuCount,
        SweepParameter::LengthBreadthRatio,
        SweepParameter::Breadth,
        SweepParameter::BreadthDraughtRatio,
        SweepParameter::BlockCoefficient,
    ];

    /// Column heading used in the CSV output.
    pub fn label(self) -> &'static str {
        match self {
            SweepParameter::Speed => "Speed(knts)",
            SweepParameter::CargoDeadweight => "Cargo deadweight(t)",
            SweepParameter::TeuCount => "TEU Capacity",
            SweepParameter::LengthBreadthRatio => "L/B Ratio",
            SweepParameter::Breadth => "B(m)",
            SweepParameter::BreadthDraughtRatio => "B/T Ratio",
            SweepParameter::BlockCoefficient => "Block Co.",
        }
    }

    fn key(self) -> &'static str {
        match self {
            SweepParameter::Speed => "speed",
            SweepParameter::CargoDeadweight => "deadweight",
            SweepParameter::TeuCount => "teu",
            SweepParameter::LengthBreadthRatio => "lb-ratio",
            SweepParameter::Breadth => "breadth",
            SweepParameter::BreadthDraughtRatio => "bt-ratio",
            SweepParameter::BlockCoefficient => "block",
        }
    }

    /// Copy of `base` with this input set to `value`.
    ///
    /// Geometric constraints force a searching mode, since they have no
    /// meaning for a fixed hull.
    pub fn apply(self, base: &DesignRequest, value: f64) -> DesignRequest {
        let mut request = base.clone();
        let searching = |request: &mut DesignRequest| {
            if request.design_mode == DesignMode::Dimensions {
                request.design_mode = DesignMode::Deadweight;
            }
        };
        match self {
            SweepParameter::Speed => request.speed_kn = value,
            SweepParameter::CargoDeadweight => {
                request.design_mode = DesignMode::Deadweight;
                request.target_deadweight = value;
            }
            SweepParameter::TeuCount => {
                request.design_mode = DesignMode::Teu;
                request.teu_count = value;
            }
            SweepParameter::LengthBreadthRatio => {
                searching(&mut request);
                request.constraints.lb_ratio = Some(value);
                request.constraints.breadth = None;
            }
            SweepParameter::Breadth => {
                searching(&mut request);
                request.constraints.breadth = Some(value);
                request.constraints.lb_ratio = None;
            }
            SweepParameter::BreadthDraughtRatio => {
                searching(&mut request);
                request.constraints.bt_ratio = Some(value);
            }
            SweepParameter::BlockCoefficient => {
                searching(&mut request);
                request.constraints.block = Some(value);
            }
        }
        request
    }
}

impl fmt::Display for SweepParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SweepParameter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace('_', "-");
        SweepParameter::ALL
            .into_iter()
            .find(|p| p.key() == key)
            .ok_or_else(|| Error::InvalidSweep {
                message: format!(
                    "unknown parameter '{s}' (expected one of: {})",
                    SweepParameter::ALL.map(|p| p.key()).join(", ")
                ),
            })
    }
}

/// One sample of a sweep.
#[derive(Debug)]
pub struct SweepPoint {
    pub value: f64,
    /// `Err` when the varied request failed validation.
    pub result: Result<DesignResult>,
}

impl SweepPoint {
    pub fn solved(&self) -> Option<&DesignResult> {
        self.result.as_ref().ok().filter(|r| r.is_success())
    }
}

#[derive(Debug)]
pub struct SweepRun {
    pub parameter: SweepParameter,
    pub economics: bool,
    pub teu_mode: bool,
    pub points: Vec<SweepPoint>,
}

/// `steps` evenly spaced values from `start` to `end` inclusive.
pub fn sample_values(start: f64, end: f64, steps: usize) -> Result<Vec<f64>> {
    if steps < 2 {
        return Err(Error::InvalidSweep {
            message: "steps must be 2 or more".to_string(),
        });
    }
    if !start.is_finite() || !end.is_finite() {
        return Err(Error::InvalidSweep {
            message: "start and end must be finite".to_string(),
        });
    }
    if start == end {
        return Err(Error::InvalidSweep {
            message: "start and end values cannot be the same".to_string(),
        });
    }
    let span = end - start;
    let last = (steps - 1) as f64;
    Ok((0..steps)
        .map(|i| start + span * i as f64 / last)
        .collect())
}

/// Solve `base` once per sample of `parameter`.
///
/// Speed and pitch violations are tolerated during the sweep so that a
/// single awkward sample does not hide its neighbours.
pub fn run_sweep(
    base: &DesignRequest,
    parameter: SweepParameter,
    start: f64,
    end: f64,
    steps: usize,
) -> Result<SweepRun> {
    let values = sample_values(start, end, steps)?;
    let mut base = base.clone();
    base.options.ignore_speed_violation = true;
    base.options.ignore_pitch_violation = true;

    info!(%parameter, start, end, steps, "running range analysis");

    let points = values
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let request = parameter.apply(&base, value);
            let result = solve(&request);
            match &result {
                Ok(r) if r.is_success() => {
                    debug!(step = i + 1, value, "sample solved");
                }
                Ok(r) => warn!(step = i + 1, value, status = %r.status, "sample failed"),
                Err(err) => warn!(step = i + 1, value, error = %err, "sample rejected"),
            }
            SweepPoint { value, result }
        })
        .collect();

    Ok(SweepRun {
        parameter,
        economics: base.economics.is_some(),
        teu_mode: parameter == SweepParameter::TeuCount || base.design_mode == DesignMode::Teu,
        points,
    })
}

fn header(run: &SweepRun) -> Vec<&'static str> {
    let mut header = vec![
        run.parameter.label(),
        "Lbp(m)",
        "B(m)",
        "D(m)",
        "T(m)",
        "CB",
        "Displacement(t)",
        "CargoDW(t)",
        "TotalDW(t)",
        "ServicePower(kW)",
        "InstalledPower(kW)",
        "BuildCost(M$)",
    ];
    if run.economics {
        header.push(if run.teu_mode {
            "RFR($/TEU)"
        } else {
            "RFR($/tonne)"
        });
    }
    header
}

fn row(run: &SweepRun, point: &SweepPoint, columns: usize) -> Vec<String> {
    let mut row = vec![format_general(point.value)];
    let solved = point
        .solved()
        .and_then(|result| result.state.as_ref().map(|state| (result, state)));
    let Some((result, state)) = solved else {
        row.extend(vec![FAILED_CELL.to_string(); columns - 1]);
        return row;
    };

    let hull = &state.hull;
    row.extend([
        format!("{:.2}", hull.length),
        format!("{:.2}", hull.breadth),
        format!("{:.2}", hull.depth),
        format!("{:.2}", hull.draught),
        format!("{:.4}", hull.block),
        format!("{:.0}", state.displacement),
        format!("{:.0}", state.masses.cargo_deadweight),
        format!("{:.0}", state.masses.total_deadweight),
        format!("{:.0}", state.power.service_power_kw()),
        format!("{:.0}", state.power.installed_power_kw()),
    ]);
    match result.economics.as_ref() {
        Some(econ) => {
            row.push(format!("{:.3}", econ.build_cost_musd));
            let rate = econ
                .required_rate_per_teu
                .filter(|_| run.teu_mode)
                .unwrap_or(econ.required_freight_rate);
            row.push(format!("{rate:.4}"));
        }
        None => {
            row.push("N/A".to_string());
            if run.economics {
                row.push("N/A".to_string());
            }
        }
    }
    row
}

/// Shortest of fixed and exponent notation, close to `%.6g`.
fn format_general(value: f64) -> String {
    let rounded = format!("{value:.6}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Write a sweep as CSV, one row per sample.
pub fn write_sweep_csv<W: Write>(writer: W, run: &SweepRun) -> Result<()> {
    let header = header(run);
    let mut csv = WriterBuilder::new().from_writer(writer);
    csv.write_record(&header)?;
    for point in &run.points {
        csv.write_record(row(run, point, header.len()))?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_include_both_ends() {
        let values = sample_values(10.0, 20.0, 5).unwrap();
        assert_eq!(values, vec![10.0, 12.5, 15.0, 17.5, 20.0]);
        let descending = sample_values(2.0, 1.0, 2).unwrap();
        assert_eq!(descending, vec![2.0, 1.0]);
    }

    #[test]
    fn degenerate_ranges_are_rejected() {
        assert!(matches!(
            sample_values(1.0, 2.0, 1),
            Err(Error::InvalidSweep { .. })
        ));
        assert!(matches!(
            sample_values(3.0, 3.0, 4),
            Err(Error::InvalidSweep { .. })
        ));
    }

    #[test]
    fn breadth_replaces_lb_ratio() {
        let mut base = DesignRequest::default();
        base.constraints.lb_ratio = Some(6.5);
        let request = SweepParameter::Breadth.apply(&base, 30.0);
        assert_eq!(request.constraints.breadth, Some(30.0));
        assert_eq!(request.constraints.lb_ratio, None);
    }

    #[test]
    fn constraint_sweeps_leave_dimensions_mode() {
        let base = DesignRequest {
            design_mode: DesignMode::Dimensions,
            ..DesignRequest::default()
        };
        let request = SweepParameter::BlockCoefficient.apply(&base, 0.8);
        assert_eq!(request.design_mode, DesignMode::Deadweight);
        let speed = SweepParameter::Speed.apply(&base, 14.0);
        assert_eq!(speed.design_mode, DesignMode::Dimensions);
    }

    #[test]
    fn parameter_keys_parse() {
        for parameter in SweepParameter::ALL {
            assert_eq!(parameter.to_string().parse::<SweepParameter>().unwrap(), parameter);
        }
        assert!("draught".parse::<SweepParameter>().is_err());
    }

    #[test]
    fn general_format_trims_zeros() {
        assert_eq!(format_general(15.0), "15");
        assert_eq!(format_general(12.5), "12.5");
        assert_eq!(format_general(0.8125), "0.8125");
    }
}
