//! Greedy direction policy (spec.md §4.5, "Greedy variant").
//!
//! Used by `Dynamic` agents directly, and by `Static`/`GP` agents as the
//! shared crowding-override behavior.

use super::{normalize_or_zero, Neighbor};

/// Choose a unit heading (or the zero vector) from the agent's own
/// position/power, its current heading, its battery, its separation
/// radius, and its visible neighbors.
///
/// 1. Build the crowd: neighbors strictly inside `separation`.
/// 2. Below battery 10, the crowding step is skipped outright — the
///    emergency charge-seeking override always takes the greedy step.
/// 3. Otherwise, a non-empty crowd means "move away from its centroid".
/// 4. With no crowd (or under emergency override), move toward whichever
///    neighbor has the highest field sample — but only if it beats the
///    agent's own power; if the agent already dominates, or it has no
///    neighbors, it returns the zero vector / keeps its current heading.
pub fn greedy(
    self_position: (f64, f64),
    self_power: f64,
    self_direction: (f64, f64),
    battery: f64,
    separation: f64,
    neighbors: &[Neighbor],
) -> (f64, f64) {
    let emergency = battery < 10.0;

    if !emergency {
        let crowd: Vec<&Neighbor> = neighbors.iter().filter(|n| n.distance < separation).collect();
        if !crowd.is_empty() {
            let mut sum = (0.0, 0.0);
            for n in &crowd {
                sum.0 += n.position.0 - self_position.0;
                sum.1 += n.position.1 - self_position.1;
            }
            return normalize_or_zero((-sum.0, -sum.1));
        }
    }

    if neighbors.is_empty() {
        return self_direction;
    }

    let best = neighbors
        .iter()
        .max_by(|a, b| a.power.partial_cmp(&b.power).unwrap());

    match best {
        Some(n) if n.power > self_power => {
            normalize_or_zero((n.position.0 - self_position.0, n.position.1 - self_position.1))
        }
        _ => (0.0, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(index: usize, position: (f64, f64), distance: f64, power: f64) -> Neighbor {
        Neighbor { index, position, distance, power }
    }

    #[test]
    fn no_neighbors_keeps_current_heading() {
        let dir = greedy((0.0, 0.0), 0.5, (1.0, 0.0), 50.0, 5.0, &[]);
        assert_eq!(dir, (1.0, 0.0));
    }

    #[test]
    fn crowd_moves_away_from_centroid() {
        let neighbors = [n(0, (1.0, 0.0), 1.0, 0.1)];
        let dir = greedy((0.0, 0.0), 0.5, (0.0, 0.0), 50.0, 5.0, &neighbors);
        assert!((dir.0 - (-1.0)).abs() < 1e-9);
        assert!(dir.1.abs() < 1e-9);
    }

    #[test]
    fn no_crowd_seeks_highest_power_neighbor() {
        let neighbors = [
            n(0, (5.0, 0.0), 10.0, 0.2),
            n(1, (0.0, 5.0), 10.0, 0.9),
        ];
        let dir = greedy((0.0, 0.0), 0.1, (0.0, 0.0), 50.0, 2.0, &neighbors);
        assert!((dir.1 - 1.0).abs() < 1e-9);
        assert!(dir.0.abs() < 1e-9);
    }

    #[test]
    fn self_dominant_power_returns_zero() {
        let neighbors = [n(0, (5.0, 0.0), 10.0, 0.2)];
        let dir = greedy((0.0, 0.0), 0.9, (0.0, 0.0), 50.0, 2.0, &neighbors);
        assert_eq!(dir, (0.0, 0.0));
    }

    #[test]
    fn emergency_override_ignores_crowding() {
        // A crowd is present, but battery < 10 overrides crowd avoidance
        // and seeks the higher-power neighbor instead.
        let neighbors = [n(0, (1.0, 0.0), 1.0, 0.9)];
        let dir = greedy((0.0, 0.0), 0.1, (0.0, 0.0), 5.0, 2.0, &neighbors);
        assert!((dir.0 - 1.0).abs() < 1e-9);
    }
}
