//! Small numeric routines behind the chart builders.
//!
//! These work on plain `f64` slices that were already pulled out of the
//! frame, so each chart can drop missing values the way it needs to. Moments,
//! quantiles and correlation go through polars chunked arrays; the Gaussian
//! KDE (Scott's rule bandwidth) and the equal-width histogram are computed
//! here.

use polars::prelude::*;

fn chunked(values: &[f64]) -> Float64Chunked {
    Float64Chunked::from_slice(PlSmallStr::EMPTY, values)
}

/// Sample standard deviation (n - 1 in the denominator).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    chunked(values).std(1)
}

/// Linear-interpolated quartiles (q1, median, q3).
pub fn quartiles(values: &[f64]) -> Option<(f64, f64, f64)> {
    let ca = chunked(values);
    let quantile = |q: f64| ca.quantile(q, QuantileMethod::Linear).ok().flatten();
    Some((quantile(0.25)?, quantile(0.5)?, quantile(0.75)?))
}

/// Scott's rule: `std * n^(-1/5)`. `None` when the spread is zero.
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    let std = sample_std(values)?;
    if std <= 0.0 || !std.is_finite() {
        return None;
    }
    Some(std * (values.len() as f64).powf(-0.2))
}

/// Extra range, in bandwidths, evaluated past the extreme values.
pub const KDE_CUT: f64 = 3.0;

/// Gaussian KDE evaluated on `grid_points` evenly spaced points spanning
/// `[min - cut*bw, max + cut*bw]`. Returns the bandwidth and `(x, density)` pairs.
pub fn gaussian_kde(values: &[f64], grid_points: usize) -> Option<(f64, Vec<(f64, f64)>)> {
    let bw = scott_bandwidth(values)?;
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min) - KDE_CUT * bw;
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max) + KDE_CUT * bw;
    if grid_points < 2 || !(hi > lo) {
        return None;
    }

    let n = values.len() as f64;
    let norm = 1.0 / (n * bw * (2.0 * std::f64::consts::PI).sqrt());
    let step = (hi - lo) / (grid_points - 1) as f64;

    let curve = (0..grid_points)
        .map(|i| {
            let x = lo + step * i as f64;
            let density: f64 = values
                .iter()
                .map(|v| {
                    let z = (x - v) / bw;
                    (-0.5 * z * z).exp()
                })
                .sum();
            (x, density * norm)
        })
        .collect();
    Some((bw, curve))
}

/// Equal-width histogram. Returns `bins + 1` edges and `bins` counts.
///
/// The last bin is closed on the right. When every value is equal the range
/// is widened to `[v - 0.5, v + 0.5]`.
pub fn histogram(values: &[f64], bins: usize) -> Option<(Vec<f64>, Vec<usize>)> {
    if values.is_empty() || bins == 0 {
        return None;
    }
    let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    if (max - min).abs() < f64::EPSILON {
        min -= 0.5;
        max += 0.5;
    }

    let width = (max - min) / bins as f64;
    let edges = (0..=bins).map(|i| min + width * i as f64).collect();
    let mut counts = vec![0; bins];
    for v in values {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        if let Some(c) = counts.get_mut(idx) {
            *c += 1;
        }
    }
    Some((edges, counts))
}

/// Pearson correlation over rows where both values are present.
///
/// `None` with fewer than two complete rows or zero variance on either side.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let a = Float64Chunked::from_slice_options(PlSmallStr::EMPTY, xs);
    let b = Float64Chunked::from_slice_options(PlSmallStr::EMPTY, ys);
    let complete = &a.is_not_null() & &b.is_not_null();
    let a = a.filter(&complete).ok()?;
    let b = b.filter(&complete).ok()?;
    if a.len() < 2 {
        return None;
    }
    let r = cov::pearson_corr(&a, &b)?;
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}
