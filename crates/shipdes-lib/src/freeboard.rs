//! Minimum freeboard estimate from the standard load-line tables.

use crate::profiles::FreeboardClass;
use crate::tables::{
    non_zero, FREEBOARD_LENGTHS, FREEBOARD_NON_TANKER_MM, FREEBOARD_TANKER_MM, SHEER_RATIOS,
    SUPERSTRUCTURE_RATIO,
};

/// Minimum freeboard (m) for the given hull.
///
/// Interpolates the tabular freeboard for `length` (extrapolating along the
/// edge segments outside 30..360 m) and applies the corrections for short
/// ships, block coefficient, depth, superstructure and sheer. Always finite
/// for finite inputs.
pub fn minimum_freeboard(
    length: f64,
    block: f64,
    draught: f64,
    depth: f64,
    class: FreeboardClass,
) -> f64 {
    let table = match class {
        FreeboardClass::Tanker => &FREEBOARD_TANKER_MM,
        FreeboardClass::NonTanker => &FREEBOARD_NON_TANKER_MM,
    };
    let segment = table_segment(length);
    let (l0, l1) = (FREEBOARD_LENGTHS[segment], FREEBOARD_LENGTHS[segment + 1]);
    let (f0, f1) = (table[segment], table[segment + 1]);
    let mut freeboard = f0 + (length - l0) * (f1 - f0) / (l1 - l0);

    if class == FreeboardClass::NonTanker && length < 100.0 {
        freeboard += 0.75 * (100.0 - length) * (0.35 - SUPERSTRUCTURE_RATIO);
    }

    let block_at_depth = block + (0.85 * depth - draught) / (10.0 * non_zero(draught));
    if block_at_depth >= 0.68 {
        freeboard *= (block_at_depth + 0.68) / 1.36;
    }

    let standard_depth = length / 15.0;
    if depth >= standard_depth {
        let depth_factor = if length <= 120.0 { length / 0.48 } else { 250.0 };
        freeboard += (depth - standard_depth) * depth_factor;
    }

    freeboard -= superstructure_deduction(length, class);
    freeboard += sheer_correction(length);

    freeboard * 0.001
}

/// Lower table index of the interpolation segment for `length`.
fn table_segment(length: f64) -> usize {
    let last = FREEBOARD_LENGTHS.len() - 1;
    if length <= FREEBOARD_LENGTHS[0] {
        0
    } else if length < FREEBOARD_LENGTHS[last] {
        let above = FREEBOARD_LENGTHS[..last]
            .iter()
            .take_while(|&&l| length > l)
            .count();
        above.saturating_sub(1)
    } else {
        last - 1
    }
}

fn superstructure_deduction(length: f64, class: FreeboardClass) -> f64 {
    let full = if length <= 85.0 {
        350.0 + (length - 24.0) * (860.0 - 350.0) / (85.0 - 24.0)
    } else if length <= 122.0 {
        860.0 + (length - 85.0) * (1070.0 - 860.0) / (122.0 - 85.0)
    } else {
        1070.0
    };
    let exponent = match class {
        FreeboardClass::Tanker => 1.23,
        FreeboardClass::NonTanker => 1.3,
    };
    full * SUPERSTRUCTURE_RATIO.powf(exponent)
}

fn sheer_correction(length: f64) -> f64 {
    let (forward, aft) = SHEER_RATIOS;
    (length / 3.0 + 10.0)
        * (8.3375 * (1.0 - forward) + 4.16875 * (1.0 - aft))
        * (0.75 - 0.5 * SUPERSTRUCTURE_RATIO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_selection_uses_lower_bound() {
        assert_eq!(table_segment(10.0), 0);
        assert_eq!(table_segment(30.0), 0);
        assert_eq!(table_segment(35.0), 0);
        assert_eq!(table_segment(40.0), 0);
        assert_eq!(table_segment(41.0), 1);
        assert_eq!(table_segment(207.0), 9);
        assert_eq!(table_segment(359.0), 16);
        assert_eq!(table_segment(500.0), 16);
    }

    #[test]
    fn tanker_freeboard_is_below_non_tanker() {
        let tanker = minimum_freeboard(200.0, 0.8, 12.0, 16.0, FreeboardClass::Tanker);
        let bulk = minimum_freeboard(200.0, 0.8, 12.0, 16.0, FreeboardClass::NonTanker);
        assert!(tanker < bulk);
        assert!(tanker > 0.0);
    }

    #[test]
    fn matches_hand_calculation_at_table_length() {
        // Block correction applies (C9 > 0.68) and D = 16 m exceeds L/15.
        let l: f64 = 200.0;
        let mut expected = 2612.0;
        let c9 = 0.8 + (0.85 * 16.0 - 12.0) / 120.0;
        expected *= (c9 + 0.68) / 1.36;
        expected += (16.0 - l / 15.0) * 250.0;
        expected -= 1070.0 * 0.2f64.powf(1.23);
        expected += (l / 3.0 + 10.0) * (8.3375 * 0.5 + 4.16875) * 0.65;
        let got = minimum_freeboard(l, 0.8, 12.0, 16.0, FreeboardClass::Tanker);
        assert!((got - expected * 0.001).abs() < 1e-12);
    }

    #[test]
    fn degenerate_length_stays_finite() {
        let value = minimum_freeboard(5.0, 0.7, 1.0, 2.0, FreeboardClass::NonTanker);
        assert!(value.is_finite());
    }
}
