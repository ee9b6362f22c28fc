//! Gaussian-process direction policy (spec.md §4.5, "Regression variant"),
//! used by `GP` agents.
//!
//! The original prototype (`original_source/direction.py`) leans on
//! scikit-learn's `GaussianProcessRegressor` + `scipy.optimize.minimize`.
//! Neither this crate's teacher nor any sibling in the retrieval pack
//! carries a GP/optimization crate, so both pieces are implemented
//! directly: a small RBF-kernel GP posterior mean (closed form, solved via
//! Cholesky) and a pragmatic grid-search-then-hill-climb minimizer —
//! dependency-light in the same spirit as `autoEQ`'s hand-rolled
//! differential evolution.

use super::{normalize_or_zero, Neighbor};
use tracing::warn;

/// RBF length scale from spec.md §4.5 ("length scale ≈ 3").
const LENGTH_SCALE: f64 = 3.0;
/// Jitter added to the kernel diagonal for numerical stability ("small
/// jitter" in spec.md §4.5; matches the prototype's `alpha=1e-6`).
const JITTER: f64 = 1e-6;
/// Candidate points per axis in the initial grid search.
const GRID_RESOLUTION: usize = 7;
/// Local-refinement hill-climb iterations after the grid search.
const REFINE_STEPS: usize = 12;

/// A fitted gaussian-process posterior over neighbor positions/powers.
struct GaussianProcess {
    x_train: Vec<(f64, f64)>,
    alpha: Vec<f64>,
    y_mean: f64,
    y_std: f64,
}

impl GaussianProcess {
    /// Fit to `(position, power)` pairs. Returns `None` if the training
    /// set is empty or the kernel matrix is singular even with jitter.
    fn fit(points: &[(f64, f64)], values: &[f64]) -> Option<Self> {
        let n = points.len();
        if n == 0 {
            return None;
        }

        let y_mean = values.iter().sum::<f64>() / n as f64;
        let y_var = values.iter().map(|v| (v - y_mean).powi(2)).sum::<f64>() / n as f64;
        let y_std = if y_var > 0.0 { y_var.sqrt() } else { 1.0 };
        let y_norm: Vec<f64> = values.iter().map(|v| (v - y_mean) / y_std).collect();

        let mut k = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                k[i][j] = rbf_kernel(points[i], points[j]);
            }
            k[i][i] += JITTER;
        }

        let alpha = cholesky_solve(&k, &y_norm)?;

        Some(GaussianProcess {
            x_train: points.to_vec(),
            alpha,
            y_mean,
            y_std,
        })
    }

    fn predict_mean(&self, at: (f64, f64)) -> f64 {
        let k_star: f64 = self
            .x_train
            .iter()
            .zip(self.alpha.iter())
            .map(|(xi, a)| a * rbf_kernel(*xi, at))
            .sum();
        k_star * self.y_std + self.y_mean
    }
}

fn rbf_kernel(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    let d2 = dx * dx + dy * dy;
    (-0.5 * d2 / (LENGTH_SCALE * LENGTH_SCALE)).exp()
}

/// Solve `(K) x = y` via Cholesky decomposition. `None` on a non-PD matrix.
fn cholesky_solve(k: &[Vec<f64>], y: &[f64]) -> Option<Vec<f64>> {
    let n = k.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = k[i][j];
            for p in 0..j {
                sum -= l[i][p] * l[j][p];
            }
            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Solve L z = y (forward substitution).
    let mut z = vec![0.0; n];
    for i in 0..n {
        let mut sum = y[i];
        for p in 0..i {
            sum -= l[i][p] * z[p];
        }
        z[i] = sum / l[i][i];
    }

    // Solve L^T x = z (back substitution).
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = z[i];
        for p in (i + 1)..n {
            sum -= l[p][i] * x[p];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}

/// Fit a GP to the neighbors' positions/field samples and find the point
/// in `[x0-vision, x0+vision] x [y0-vision, y0+vision]` maximizing
/// predicted power (i.e. minimizing the GP's negative mean), starting the
/// search at the agent's own position. Returns the zero vector if there
/// are no neighbors or the kernel matrix can't be factored.
pub fn gp_direction(
    self_position: (f64, f64),
    vision: f64,
    neighbors: &[Neighbor],
) -> (f64, f64) {
    if neighbors.is_empty() {
        return (0.0, 0.0);
    }

    let points: Vec<(f64, f64)> = neighbors.iter().map(|n| n.position).collect();
    let values: Vec<f64> = neighbors.iter().map(|n| n.power).collect();

    let gp = match GaussianProcess::fit(&points, &values) {
        Some(gp) => gp,
        None => {
            warn!("GP direction policy: kernel matrix not positive-definite, falling back to zero");
            return (0.0, 0.0);
        }
    };

    let (x_lo, x_hi) = (self_position.0 - vision, self_position.0 + vision);
    let (y_lo, y_hi) = (self_position.1 - vision, self_position.1 + vision);

    let mut best_point = self_position;
    let mut best_value = gp.predict_mean(self_position);

    for gx in 0..GRID_RESOLUTION {
        for gy in 0..GRID_RESOLUTION {
            let fx = gx as f64 / (GRID_RESOLUTION - 1).max(1) as f64;
            let fy = gy as f64 / (GRID_RESOLUTION - 1).max(1) as f64;
            let candidate = (x_lo + fx * (x_hi - x_lo), y_lo + fy * (y_hi - y_lo));
            let value = gp.predict_mean(candidate);
            if value > best_value {
                best_value = value;
                best_point = candidate;
            }
        }
    }

    let mut step = vision / GRID_RESOLUTION as f64;
    for _ in 0..REFINE_STEPS {
        let mut improved = false;
        for (dx, dy) in [(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)] {
            let candidate = (
                (best_point.0 + dx * step).clamp(x_lo, x_hi),
                (best_point.1 + dy * step).clamp(y_lo, y_hi),
            );
            let value = gp.predict_mean(candidate);
            if value > best_value {
                best_value = value;
                best_point = candidate;
                improved = true;
            }
        }
        if !improved {
            step *= 0.5;
        }
    }

    normalize_or_zero((best_point.0 - self_position.0, best_point.1 - self_position.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(position: (f64, f64), power: f64) -> Neighbor {
        Neighbor { index: 0, position, distance: 0.0, power }
    }

    #[test]
    fn no_neighbors_returns_zero() {
        assert_eq!(gp_direction((0.0, 0.0), 10.0, &[]), (0.0, 0.0));
    }

    #[test]
    fn heads_toward_the_high_power_side() {
        let neighbors = [
            n((5.0, 0.0), 1.0),
            n((-5.0, 0.0), 0.0),
            n((0.0, 5.0), 0.1),
            n((0.0, -5.0), 0.1),
        ];
        let dir = gp_direction((0.0, 0.0), 5.0, &neighbors);
        assert!(dir.0 > 0.0, "expected movement toward +x, got {dir:?}");
    }

    #[test]
    fn returned_direction_is_unit_or_zero() {
        let neighbors = [n((3.0, 4.0), 0.8), n((-2.0, 1.0), 0.2)];
        let dir = gp_direction((0.0, 0.0), 6.0, &neighbors);
        let norm = (dir.0 * dir.0 + dir.1 * dir.1).sqrt();
        assert!(norm < 1e-9 || (norm - 1.0).abs() < 1e-6);
    }
}
