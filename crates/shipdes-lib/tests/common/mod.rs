#![allow(dead_code)]

use shipdes_lib::{DesignMode, DesignRequest, DesignResult, DesignState};

/// 50,000 t tanker with a direct-drive diesel at 15 knots.
pub fn tanker_request() -> DesignRequest {
    DesignRequest::default()
}

/// 3,000 TEU container ship at 18 knots, 100 rpm.
pub fn container_request() -> DesignRequest {
    DesignRequest {
        design_mode: DesignMode::Teu,
        ship_type: "Container ship".to_string(),
        teu_count: 3_000.0,
        teu_avg_weight: 14.0,
        speed_kn: 18.0,
        engine_rpm: 100.0,
        propeller_rpm: 100.0,
        ..DesignRequest::default()
    }
}

pub fn solved_state(result: &DesignResult) -> &DesignState {
    assert!(result.is_success(), "solve failed: {}", result.status);
    result.state.as_ref().expect("successful solve carries a state")
}

pub fn assert_relative(actual: f64, expected: f64, tolerance: f64) {
    let scale = expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance * scale,
        "expected {expected}, got {actual}"
    );
}
