//! Adaptive separation radius (spec.md §4.4).
//!
//! An agent sitting on better-than-typical ground pushes peers away with a
//! wider radius; one on worse ground tolerates crowding to stay with the
//! flock.

use crate::stats::estimate_probability;

/// `s_min * (2.25 - 1.25*q)`, clamped to `>= s_min`, where `q` is the
/// fraction of the neighbor-power distribution dominated by
/// `agent_power`.
///
/// The original prototype used `s_min * (2 - q)`; this crate implements
/// the spec's redesigned coefficients (see `DESIGN.md`).
pub fn desired_separation(s_min: f64, agent_power: f64, neighbor_powers: &[f64]) -> f64 {
    let q = estimate_probability(neighbor_powers, f64::NEG_INFINITY, agent_power);
    let s = s_min * (2.25 - 1.25 * q);
    s.max(s_min)
}
