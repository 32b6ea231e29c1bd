mod common;

use common::{assert_relative, solved_state, tanker_request};
use shipdes_lib::{solve, DesignMode, DesignRequest, Error, SolveStatus};

#[test]
fn every_fuel_meets_the_deadweight_tolerance() {
    for fuel in [
        "Direct diesel",
        "Geared diesel",
        "Steam turbines",
        "Nuclear Steam Turbine",
    ] {
        let request = DesignRequest {
            fuel_type: fuel.to_string(),
            ..tanker_request()
        };
        let result = solve(&request).expect("valid request");
        let state = solved_state(&result);
        let tolerance = request.error_pct / 100.0 * request.target_deadweight;
        assert!(
            (state.masses.cargo_deadweight - request.target_deadweight).abs() <= tolerance,
            "{fuel}: cargo deadweight {}",
            state.masses.cargo_deadweight
        );
    }
}

#[test]
fn fixed_dimensions_are_idempotent() {
    let request = DesignRequest {
        design_mode: DesignMode::Dimensions,
        ..tanker_request()
    };
    let first = solve(&request).expect("valid request");
    let second = solve(&request).expect("valid request");
    assert_eq!(first, second);
    assert_eq!(first.iterations, 0);
    assert_eq!(first.target_weight, None);
}

#[test]
fn solved_hull_reproduces_its_deadweight() {
    let searched = solve(&tanker_request()).expect("valid request");
    let state = solved_state(&searched);

    let fixed = DesignRequest {
        design_mode: DesignMode::Dimensions,
        dimensions: state.hull,
        ..tanker_request()
    };
    let evaluated = solve(&fixed).expect("valid request");
    let replay = solved_state(&evaluated);
    assert_relative(
        replay.masses.cargo_deadweight,
        state.masses.cargo_deadweight,
        1e-9,
    );
}

#[test]
fn masses_sum_to_displacement() {
    let result = solve(&tanker_request()).expect("valid request");
    let state = solved_state(&result);
    let m = &state.masses;
    let sum = m.steel + m.outfit + m.machinery + m.lightship_margin + m.fuel + m.stores
        + m.cargo_deadweight;
    assert!(
        (sum - state.displacement).abs() <= 1e-3 * state.displacement,
        "sum {sum} vs displacement {}",
        state.displacement
    );
    assert_relative(m.total_deadweight, state.displacement - m.lightship(), 1e-9);
}

#[test]
fn length_grows_with_target_deadweight() {
    let mut previous = 0.0;
    for target in [5_000.0, 8_000.0, 10_000.0, 15_000.0, 20_000.0] {
        let request = DesignRequest {
            ship_type: "Cargo vessel".to_string(),
            target_deadweight: target,
            ..tanker_request()
        };
        let result = solve(&request).expect("valid request");
        let length = solved_state(&result).hull.length;
        assert!(
            length > previous,
            "length {length} at {target} t not above {previous}"
        );
        previous = length;
    }
}

#[test]
fn zero_speed_is_invalid_input() {
    let request = DesignRequest {
        speed_kn: 0.0,
        ..tanker_request()
    };
    match solve(&request) {
        Err(Error::InvalidInput { field, .. }) => assert_eq!(field, "speed_kn"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn negative_range_is_invalid_input() {
    let request = DesignRequest {
        range_nm: -100.0,
        ..tanker_request()
    };
    match solve(&request) {
        Err(Error::InvalidInput { field, .. }) => assert_eq!(field, "range_nm"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn unknown_ship_type_suggests_alternatives() {
    let request = DesignRequest {
        ship_type: "Tankr".to_string(),
        ..tanker_request()
    };
    let err = solve(&request).expect_err("unknown ship type");
    let message = err.to_string();
    assert!(message.contains("unknown ship type"), "{message}");
    assert!(message.contains("Did you mean"), "{message}");
    assert!(message.contains("Tanker"), "{message}");
}

#[test]
fn tiny_tolerance_reports_non_convergence_with_state() {
    let mut request = DesignRequest {
        error_pct: 1e-12,
        ..tanker_request()
    };
    request.options.max_dimension_iterations = 3;
    let result = solve(&request).expect("valid request");
    match result.status {
        SolveStatus::DimensionSearchNonConvergent { iterations, .. } => assert_eq!(iterations, 3),
        other => panic!("unexpected status: {other}"),
    }
    assert!(result.state.is_some(), "best-effort state is returned");
}

#[test]
fn result_serializes_to_json() {
    let result = solve(&tanker_request()).expect("valid request");
    let json = serde_json::to_value(&result).expect("serializes");
    assert_eq!(json["status"]["kind"], "success");
    assert_eq!(json["ship_type"], "Tanker");
    assert!(json["state"]["hull"]["length"].is_f64());
}
