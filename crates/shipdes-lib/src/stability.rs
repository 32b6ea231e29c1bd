//! Approximate initial stability from hull proportions.

use crate::tables::non_zero;

/// Approximate metacentric height GM (m).
///
/// KB from the block and waterplane coefficients, BM from the waterplane
/// inertia estimate `(1.1·CB − 0.12)·B²/(12·T·CB)`, KG as `kg_factor·D`.
pub fn metacentric_height(breadth: f64, depth: f64, draught: f64, block: f64, kg_factor: f64) -> f64 {
    let centre_of_gravity = kg_factor * depth;
    let waterplane = 0.67 * block + 0.32;
    let centre_of_buoyancy =
        draught * (5.0 * waterplane - 2.0 * block) / (6.0 * non_zero(waterplane));
    let inertia_factor = 1.1 * block - 0.12;
    let metacentric_radius =
        inertia_factor * breadth * breadth / (12.0 * non_zero(draught) * non_zero(block));
    centre_of_buoyancy + metacentric_radius - centre_of_gravity
}

/// GM below which a design is flagged as tender.
pub const MINIMUM_GM: f64 = 0.15;
