//! Maximum-likelihood normal fit and interval probability mass.
//!
//! No distribution crate is pulled in for this — a single erf
//! approximation is all [`estimate_probability`] needs, and the teacher's
//! dependency table has no statistics crate to reach for.

/// Fit a normal distribution to `sample` by maximum likelihood and return
/// the probability mass on `[lower, upper]`.
///
/// Degenerate inputs never panic: an empty sample is treated as mean 0,
/// std 0; a zero-std fit returns 1 if the mean falls inside the interval,
/// else 0.
pub fn estimate_probability(sample: &[f64], lower: f64, upper: f64) -> f64 {
    let (mu, sigma) = fit_normal(sample);

    if sigma == 0.0 {
        return if mu >= lower && mu <= upper { 1.0 } else { 0.0 };
    }

    normal_cdf(upper, mu, sigma) - normal_cdf(lower, mu, sigma)
}

/// Maximum-likelihood mean and (population, not sample) standard deviation.
fn fit_normal(sample: &[f64]) -> (f64, f64) {
    if sample.is_empty() {
        return (0.0, 0.0);
    }
    let n = sample.len() as f64;
    let mean = sample.iter().sum::<f64>() / n;
    let variance = sample.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// CDF of `Normal(mu, sigma)` at `x`. Handles `x = ±inf` via `erf`'s own
/// saturation at `±1`.
fn normal_cdf(x: f64, mu: f64, sigma: f64) -> f64 {
    0.5 * (1.0 + erf((x - mu) / (sigma * std::f64::consts::SQRT_2)))
}

/// Abramowitz & Stegun 7.1.26 approximation, max absolute error ~1.5e-7.
fn erf(x: f64) -> f64 {
    if x.is_infinite() {
        return x.signum();
    }
    let sign = x.signum();
    let x = x.abs();

    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}
