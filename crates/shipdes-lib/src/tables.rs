//! Static regression data used by the solver stages.
//!
//! Everything here is plain data: the resistance regression surface, the
//! open-water propeller polynomial, the standard freeboard tables and the
//! hull-volume to TEU regression. Behaviour lives in the stage modules.

/// Speed-coefficient breakpoints (`V / sqrt(3.28 L)`) of the resistance regression.
pub const SPEED_BREAKPOINTS: [f64; 7] = [0.50, 0.55, 0.60, 0.65, 0.70, 0.75, 0.80];

/// Number of regression weights per speed breakpoint.
pub const WEIGHTS_PER_BREAKPOINT: usize = 16;

/// Resistance regression weights, one row per speed breakpoint.
///
/// Column order matches the polynomial terms evaluated in
/// [`crate::power::resistance_coefficient`]: constant, Z2, Z3, Z4, Z5, Z2², Z3²,
/// Z4², Z5², Z2·Z3, Z2·Z4, Z2·Z5, Z3·Z4, Z3·Z5, Z4·Z5, Z5·Z4².
pub const RESISTANCE_WEIGHTS: [[f64; WEIGHTS_PER_BREAKPOINT]; 7] = [
    [
        -0.7750, 0.2107, 0.0872, 0.0900, 0.0116, 0.0883, 0.0081, 0.0631, 0.0429, -0.0249,
        -0.0124, 0.0236, -0.0301, 0.0877, -0.1243, -0.0269,
    ],
    [
        -0.7612, 0.2223, 0.0911, 0.0768, 0.0354, 0.0842, 0.0151, 0.0644, 0.0650, -0.0187,
        0.0292, -0.0245, -0.0442, 0.1124, -0.1341, -0.0006,
    ],
    [
        -0.7336, 0.2339, 0.0964, 0.0701, 0.0210, 0.0939, 0.0177, 0.0656, 0.1062, -0.0270,
        0.0647, -0.0776, -0.0537, 0.1151, -0.0775, 0.1145,
    ],
    [
        -0.6836, 0.2765, 0.0995, 0.0856, 0.0496, 0.1270, 0.0175, 0.0957, 0.1463, -0.0502,
        0.1629, -0.1313, -0.0863, 0.1133, 0.0355, 0.2255,
    ],
    [
        -0.5760, 0.3161, 0.1108, 0.1563, 0.2020, 0.1790, 0.0170, 0.1193, 0.1706, -0.0699,
        0.3574, -0.3034, -0.0944, 0.0839, 0.1715, 0.2006,
    ],
    [
        -0.3290, 0.3562, 0.1134, 0.4449, 0.3557, 0.1272, 0.0066, 0.1415, 0.1238, -0.0051,
        0.2882, -0.2508, -0.0115, -0.0156, 0.2569, 0.0138,
    ],
    [
        -0.0384, 0.4550, 0.0661, 1.0124, 0.2985, 0.0930, 0.0118, 0.5080, 0.2203, -0.0514,
        0.2110, 0.0486, 0.0046, -0.1433, 0.2680, 0.2283,
    ],
];

/// Scale and offset that turn the normalised regression output into a
/// resistance coefficient.
pub const RESISTANCE_SCALE: f64 = 5.1635;
pub const RESISTANCE_OFFSET: f64 = 13.1035;

/// Open-water propeller polynomial.
///
/// Thrust and torque coefficients are cubic in the pitch-ratio offset
/// `p = P/D - PITCH_ORIGIN`, with each power's coefficient itself a
/// polynomial in the advance-ratio offset `j = J - ADVANCE_ORIGIN`.
pub mod propeller {
    pub const ADVANCE_ORIGIN: f64 = 0.4581238;
    pub const PITCH_ORIGIN: f64 = 0.9304762;

    /// Constant term of KT as a cubic in `j`.
    pub const KT_0: [f64; 4] = [0.2461132, -0.4579327, -0.1716513, 0.4350189];
    /// Linear term of KT as a quadratic in `j`.
    pub const KT_1: [f64; 3] = [0.5545783, -4.203888e-02, -0.7284746];
    /// Quadratic term of KT as a line in `j`.
    pub const KT_2: [f64; 2] = [8.077402e-02, 0.6003515];
    /// Cubic term of KT.
    pub const KT_3: f64 = -0.2862038;

    pub const KQ_0: [f64; 4] = [3.681142e-02, -5.782276e-02, -3.677581e-02, 8.540912e-02];
    pub const KQ_1: [f64; 3] = [0.1089609, -5.997375e-02, -0.1277425];
    pub const KQ_2: [f64; 2] = [0.0884936, 6.762783e-02];
    pub const KQ_3: f64 = -2.004734e-02;
}

/// Standard lengths (m) of the freeboard tables.
pub const FREEBOARD_LENGTHS: [f64; 18] = [
    30.0, 40.0, 60.0, 80.0, 100.0, 120.0, 140.0, 160.0, 180.0, 200.0, 220.0, 240.0, 260.0,
    280.0, 300.0, 320.0, 340.0, 360.0,
];

/// Tabular freeboard for tankers (mm).
pub const FREEBOARD_TANKER_MM: [f64; 18] = [
    250.0, 334.0, 573.0, 841.0, 1135.0, 1459.0, 1803.0, 2126.0, 2393.0, 2612.0, 2792.0, 2946.0,
    3072.0, 3176.0, 3262.0, 3331.0, 3382.0, 3425.0,
];

/// Tabular freeboard for all other ships (mm).
pub const FREEBOARD_NON_TANKER_MM: [f64; 18] = [
    250.0, 334.0, 573.0, 887.0, 1271.0, 1690.0, 2109.0, 2520.0, 2915.0, 3264.0, 3586.0, 3880.0,
    4152.0, 4397.0, 4630.0, 4844.0, 5055.0, 5260.0,
];

/// Effective superstructure length ratio used by the freeboard deductions.
pub const SUPERSTRUCTURE_RATIO: f64 = 0.2;
/// Standard sheer ratios (forward, aft) applied in the sheer correction.
pub const SHEER_RATIOS: (f64, f64) = (0.5, 0.0);

/// Hull volume to container count regression: `LBD = a + b·TEU^0.9`.
pub mod teu {
    pub const INTERCEPT: f64 = -20143.62;
    pub const SLOPE: f64 = 104.422;
    pub const EXPONENT: f64 = 0.9;
}

/// Conversion factor between metric horsepower and kilowatts.
pub const KW_PER_HP: f64 = 0.7457;

/// Sea water density (t/m³).
pub const SEA_WATER_DENSITY: f64 = 1.025;

/// Installed-power margin over service power.
pub const POWER_MARGIN: f64 = 0.30;

/// Lightship margin applied to steel, outfit and machinery.
pub const LIGHTSHIP_MARGIN: f64 = 0.02;

/// Smallest magnitude substituted for a zero divisor.
pub const EPSILON: f64 = 1e-9;

/// Substitute [`EPSILON`] for a zero divisor.
pub(crate) fn non_zero(value: f64) -> f64 {
    if value == 0.0 {
        EPSILON
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freeboard_tables_are_monotonic() {
        for table in [FREEBOARD_TANKER_MM, FREEBOARD_NON_TANKER_MM] {
            assert!(table.windows(2).all(|w| w[1] > w[0]));
        }
        assert!(FREEBOARD_LENGTHS.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn breakpoints_cover_regression_rows() {
        assert_eq!(SPEED_BREAKPOINTS.len(), RESISTANCE_WEIGHTS.len());
    }

    #[test]
    fn non_zero_substitutes_epsilon() {
        assert_eq!(non_zero(0.0), EPSILON);
        assert_eq!(non_zero(-2.0), -2.0);
    }
}
