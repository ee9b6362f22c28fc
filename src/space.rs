//! The bounded, non-toroidal 2-D region agents move in, plus the spatial
//! index used for neighbor queries.
//!
//! Grounded on the teacher's `swarm::grid::SpatialHashGrid` (bucket hashing,
//! rebuild-then-query shape) but keyed by the design note's simpler
//! `⌊x/cell⌋, ⌊y/cell⌋` bucketing and updated incrementally whenever an
//! agent's position changes, rather than rebuilt once per tick — this
//! crate's agents move one at a time within a tick, and each must see
//! already-moved peers at their new positions (spec.md §4.2).

use std::collections::HashMap;

type Cell = (i64, i64);

/// A continuous `[0,W] x [0,H]` rectangle with an incremental bucket index
/// over agent positions. Holds no agent data beyond position — "relation
/// only", per spec.md §3.
pub struct Space {
    width: f64,
    height: f64,
    cell_size: f64,
    positions: Vec<(f64, f64)>,
    buckets: HashMap<Cell, Vec<usize>>,
}

impl Space {
    /// `cell_size` should be close to the population's `vision` radius so
    /// neighbor queries touch few buckets (design note §9).
    pub fn new(width: f64, height: f64, cell_size: f64, n_agents: usize) -> Self {
        let cell_size = if cell_size > 0.0 { cell_size } else { 1.0 };
        Space {
            width,
            height,
            cell_size,
            positions: vec![(0.0, 0.0); n_agents],
            buckets: HashMap::new(),
        }
    }

    fn cell_of(&self, pos: (f64, f64)) -> Cell {
        (
            (pos.0 / self.cell_size).floor() as i64,
            (pos.1 / self.cell_size).floor() as i64,
        )
    }

    /// Record (or move) agent `idx`'s position, keeping the bucket index in
    /// sync. Must be called once for every agent before the first query and
    /// again every time that agent moves.
    pub fn set_position(&mut self, idx: usize, pos: (f64, f64)) {
        let old_cell = self.cell_of(self.positions[idx]);
        if let Some(bucket) = self.buckets.get_mut(&old_cell) {
            bucket.retain(|&i| i != idx);
        }
        self.positions[idx] = pos;
        self.buckets.entry(self.cell_of(pos)).or_default().push(idx);
    }

    pub fn position(&self, idx: usize) -> (f64, f64) {
        self.positions[idx]
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Every agent index whose Euclidean distance to `point` is `<= radius`,
    /// paired with that distance. Includes the calling agent if it sits at
    /// or within range of `point` — callers filter themselves out.
    pub fn neighbors_within(&self, point: (f64, f64), radius: f64) -> Vec<(usize, f64)> {
        let span = (radius / self.cell_size).ceil() as i64 + 1;
        let (cx, cy) = self.cell_of(point);
        let r2 = radius * radius;

        let mut found = Vec::new();
        for dx in -span..=span {
            for dy in -span..=span {
                if let Some(bucket) = self.buckets.get(&(cx + dx, cy + dy)) {
                    for &idx in bucket {
                        let p = self.positions[idx];
                        let ddx = p.0 - point.0;
                        let ddy = p.1 - point.1;
                        let d2 = ddx * ddx + ddy * ddy;
                        if d2 <= r2 {
                            found.push((idx, d2.sqrt()));
                        }
                    }
                }
            }
        }
        found
    }

    /// `(agent.position - point)` for each listed position.
    pub fn difference_vectors(point: (f64, f64), positions: &[(f64, f64)]) -> Vec<(f64, f64)> {
        positions.iter().map(|p| (p.0 - point.0, p.1 - point.1)).collect()
    }

    /// `‖agent.position - point‖` for each listed position.
    pub fn distances(point: (f64, f64), positions: &[(f64, f64)]) -> Vec<f64> {
        positions
            .iter()
            .map(|p| {
                let dx = p.0 - point.0;
                let dy = p.1 - point.1;
                (dx * dx + dy * dy).sqrt()
            })
            .collect()
    }

    /// Advance `position` by `direction * speed`, reflecting off whichever
    /// axis (or axes, at a corner) the step would cross. Idempotent: an
    /// oversized step that still escapes after one reflection is clamped
    /// into the interior.
    pub fn reflect(
        &self,
        position: (f64, f64),
        direction: (f64, f64),
        speed: f64,
    ) -> ((f64, f64), (f64, f64)) {
        let (x, dx) = reflect_axis(position.0, direction.0, speed, self.width);
        let (y, dy) = reflect_axis(position.1, direction.1, speed, self.height);
        ((x, y), (dx, dy))
    }
}

fn reflect_axis(pos: f64, dir: f64, speed: f64, extent: f64) -> (f64, f64) {
    let trial = pos + dir * speed;
    if trial >= 0.0 && trial <= extent {
        return (trial, dir);
    }
    let flipped_dir = -dir;
    let recomputed = pos + flipped_dir * speed;
    (recomputed.clamp(0.0, extent), flipped_dir)
}
