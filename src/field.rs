//! The power field ("Ocean"): a 2-D grid of `f64` in `[0, max_power]`,
//! sampled with bilinear interpolation and evolved by gaussian-smoothed
//! noise. Mutated only by [`crate::Orchestrator`] between ticks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rayon::prelude::*;
use tracing::info;

/// How many standard deviations of the gaussian kernel to keep on each side,
/// matching scipy's default `truncate=4.0`.
const KERNEL_TRUNCATE: f64 = 4.0;

/// Standard deviation (in cells) of the smoothing kernel used both at
/// initialization and on every perturbation.
const SIGMA: f64 = 15.0;

/// The 2-D scalar power field agents harvest from.
///
/// Storage is row-major: `data[y * width + x]`, so `y` indexes rows and `x`
/// indexes columns — matching the coordinate transposition spec'd for
/// [`Field::sample`].
#[derive(Clone, Debug)]
pub struct Field {
    width: usize,
    height: usize,
    max_power: f64,
    data: Vec<f64>,
    rng: StdRng,
}

impl Field {
    /// Create a `width` x `height` grid: uniform noise, gaussian-smoothed,
    /// min-max normalized onto `[0, max_power]`.
    pub fn initialize(width: usize, height: usize, max_power: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let raw: Vec<f64> = (0..width * height).map(|_| rng.gen::<f64>()).collect();
        let smoothed = gaussian_blur(&raw, width, height, SIGMA);
        let data = normalize(&smoothed, max_power);

        info!(width, height, max_power, seed, "Field initialized");

        Field {
            width,
            height,
            max_power,
            data,
            rng,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn max_power(&self) -> f64 {
        self.max_power
    }

    /// Bilinear sample at continuous coordinates. `x` governs the column
    /// axis, `y` governs the row axis.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let x_hat = x.clamp(0.0, (self.width - 1) as f64);
        let y_hat = y.clamp(0.0, (self.height - 1) as f64);

        let j0 = x_hat.floor() as usize;
        let i0 = y_hat.floor() as usize;
        let j1 = (j0 + 1).min(self.width - 1);
        let i1 = (i0 + 1).min(self.height - 1);

        let dx = x_hat - j0 as f64;
        let dy = y_hat - i0 as f64;

        let q00 = self.at(i0, j0);
        let q01 = self.at(i0, j1);
        let q10 = self.at(i1, j0);
        let q11 = self.at(i1, j1);

        q00 * (1.0 - dx) * (1.0 - dy)
            + q01 * dx * (1.0 - dy)
            + q10 * (1.0 - dx) * dy
            + q11 * dx * dy
    }

    /// Draw fresh gaussian-smoothed white noise, add it to the field, and
    /// min-max renormalize back onto `[0, max_power]`. Called once per tick,
    /// after agent updates.
    pub fn perturb(&mut self) {
        let noise: Vec<f64> = (0..self.width * self.height)
            .map(|_| self.rng.sample::<f64, _>(StandardNormal))
            .collect();
        let smoothed_noise = gaussian_blur(&noise, self.width, self.height, SIGMA);

        let perturbed: Vec<f64> = self
            .data
            .par_iter()
            .zip(smoothed_noise.par_iter())
            .map(|(a, b)| a + b)
            .collect();

        self.data = normalize(&perturbed, self.max_power);
    }

    #[inline]
    fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width + col]
    }

    /// Flattened row-major snapshot for the observation API.
    pub fn snapshot(&self) -> Vec<Vec<f64>> {
        self.data
            .chunks(self.width)
            .map(|row| row.to_vec())
            .collect()
    }

    /// A field with every cell at the same `value`. Skips the random
    /// initialization entirely — used by other modules' deterministic
    /// unit tests, not part of the simulated field's own lifecycle.
    #[cfg(test)]
    pub(crate) fn constant(width: usize, height: usize, max_power: f64, value: f64) -> Self {
        Field {
            width,
            height,
            max_power,
            data: vec![value; width * height],
            rng: StdRng::seed_from_u64(0),
        }
    }
}

/// Min-max normalize onto `[0, max_power]`. A degenerate (constant) field
/// maps every cell to `max_power / 2`, never divides by zero.
fn normalize(data: &[f64], max_power: f64) -> Vec<f64> {
    let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if span <= 0.0 {
        return vec![max_power / 2.0; data.len()];
    }
    data.par_iter()
        .map(|v| (v - min) / span * max_power)
        .collect()
}

/// 1-D gaussian kernel, normalized to sum to 1.
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = ((KERNEL_TRUNCATE * sigma) + 0.5) as isize;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|i| (-0.5 * (i as f64 / sigma).powi(2)).exp())
        .collect();
    let sum: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|v| *v /= sum);
    kernel
}

/// Reflect an out-of-range index back into `[0, n)`, scipy `mode="reflect"`
/// style (edge cell is the mirror axis, no value is skipped or doubled).
fn reflect(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let period = 2 * n;
    let mut i = i % period;
    if i < 0 {
        i += period;
    }
    (if i < n { i } else { period - 1 - i }) as usize
}

/// Separable 2-D gaussian blur with reflect boundary handling.
fn gaussian_blur(data: &[f64], width: usize, height: usize, sigma: f64) -> Vec<f64> {
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;

    // Horizontal pass.
    let mut tmp = vec![0.0; width * height];
    tmp.par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out_row)| {
            for col in 0..width {
                let mut acc = 0.0;
                for (k, w) in kernel.iter().enumerate() {
                    let src_col = reflect(col as isize + k as isize - radius, width);
                    acc += w * data[row * width + src_col];
                }
                out_row[col] = acc;
            }
        });

    // Vertical pass.
    let mut out = vec![0.0; width * height];
    out.par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out_row)| {
            for col in 0..width {
                let mut acc = 0.0;
                for (k, w) in kernel.iter().enumerate() {
                    let src_row = reflect(row as isize + k as isize - radius, height);
                    acc += w * tmp[src_row * width + col];
                }
                out_row[col] = acc;
            }
        });

    out
}
