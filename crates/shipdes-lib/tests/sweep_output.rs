mod common;

use common::tanker_request;
use shipdes_lib::sweep::FAILED_CELL;
use shipdes_lib::{
    render_report, run_sweep, solve, write_sweep_csv, DesignRequest, EconomicParameters, Error,
    ReportItem, ReportOptions, SweepParameter, SweepPoint, SweepRun,
};

fn csv_lines(run: &SweepRun) -> Vec<String> {
    let mut buffer = Vec::new();
    write_sweep_csv(&mut buffer, run).expect("writes to memory");
    String::from_utf8(buffer)
        .expect("utf-8")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn speed_sweep_writes_one_row_per_sample() {
    let run = run_sweep(&tanker_request(), SweepParameter::Speed, 15.0, 17.0, 3)
        .expect("valid sweep");
    assert_eq!(run.points.len(), 3);
    assert!(run.points.iter().all(|p| p.solved().is_some()));

    let lines = csv_lines(&run);
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Speed(knts),Lbp(m),B(m),D(m),T(m),CB,"));
    assert!(lines[0].ends_with("BuildCost(M$)"));
    assert!(lines[1].starts_with("15,"));
    assert!(lines[2].starts_with("16,"));
    assert!(lines[3].starts_with("17,"));
    assert!(lines[1].ends_with(",N/A"));
}

#[test]
fn deadweight_sweep_quotes_freight_rate() {
    let request = DesignRequest {
        economics: Some(EconomicParameters::default()),
        ..tanker_request()
    };
    let run = run_sweep(
        &request,
        SweepParameter::CargoDeadweight,
        40_000.0,
        50_000.0,
        2,
    )
    .expect("valid sweep");

    let lines = csv_lines(&run);
    assert!(lines[0].starts_with("Cargo deadweight(t),"));
    assert!(lines[0].ends_with("RFR($/tonne)"));

    let lengths: Vec<f64> = run
        .points
        .iter()
        .map(|p| p.solved().and_then(|r| r.state.as_ref()).expect("solved").hull.length)
        .collect();
    assert!(lengths[0] < lengths[1]);
}

#[test]
fn rejected_samples_are_marked_failed() {
    let solved = solve(&tanker_request()).expect("valid request");
    let run = SweepRun {
        parameter: SweepParameter::BlockCoefficient,
        economics: false,
        teu_mode: false,
        points: vec![
            SweepPoint {
                value: 0.8,
                result: Ok(solved),
            },
            SweepPoint {
                value: 1.2,
                result: Err(Error::InvalidInput {
                    field: "constraints.block".to_string(),
                    message: "block coefficient must be in (0, 1]".to_string(),
                }),
            },
        ],
    };

    let lines = csv_lines(&run);
    assert!(lines[0].starts_with("Block Co.,"));
    let failed: Vec<&str> = lines[2].split(',').collect();
    assert_eq!(failed[0], "1.2");
    assert_eq!(failed.len(), 12);
    assert!(failed[1..].iter().all(|cell| *cell == FAILED_CELL));
}

#[test]
fn single_step_sweep_is_rejected() {
    let err = run_sweep(&tanker_request(), SweepParameter::Speed, 14.0, 16.0, 1)
        .expect_err("too few steps");
    assert!(matches!(err, Error::InvalidSweep { .. }));
}

#[test]
fn report_lists_selected_items() {
    let request = DesignRequest {
        economics: Some(EconomicParameters::default()),
        ..tanker_request()
    };
    let result = solve(&request).expect("valid request");

    let full = render_report(&request, &result, &ReportOptions::default());
    assert!(full.starts_with("Case   1: Tanker with Direct diesel engine"));
    assert!(full.contains("Range(N.M.)"));
    assert!(full.trim_end().ends_with("------- End of output results."));

    let options = ReportOptions::default().hide(ReportItem::Range);
    let trimmed = render_report(&request, &result, &options);
    assert!(!trimmed.contains("Range(N.M.)"));
}
