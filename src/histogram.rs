//! Equal-width histogram with a Gaussian density overlay

use serde::Serialize;
use std::f64::consts::PI;

/// Points on the density curve
pub const DENSITY_GRID_POINTS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
    /// Density curve scaled to count units so it overlays the bars
    pub density: Vec<DensityPoint>,
    pub bandwidth: Option<f64>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn bin_width(&self) -> f64 {
        self.bins.first().map(|b| b.upper - b.lower).unwrap_or(0.0)
    }
}

fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut iter = values.iter().copied();
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

/// Bin `values` into `bin_count` equal-width bins spanning the observed range.
///
/// A single distinct value gets the range `[v - 0.5, v + 0.5]`. The last bin is
/// closed on the right.
pub fn equal_width_bins(values: &[f64], bin_count: usize) -> Vec<HistogramBin> {
    let Some((mut lo, mut hi)) = value_range(values) else {
        return Vec::new();
    };
    if bin_count == 0 {
        return Vec::new();
    }
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bin_count as f64;
    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bin_count { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for &v in values {
        let index = (((v - lo) / width) as usize).min(bin_count - 1);
        bins[index].count += 1;
    }
    bins
}

fn sample_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (n - 1.0)).sqrt()
}

/// Scott's rule bandwidth, `None` when the data cannot support a kernel estimate.
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let std = sample_std(values);
    if !std.is_finite() || std <= 0.0 {
        return None;
    }
    Some(std * (values.len() as f64).powf(-0.2))
}

/// Gaussian kernel density on an even grid across the data range, multiplied by `scale`.
pub fn gaussian_kde(values: &[f64], bandwidth: f64, grid_points: usize, scale: f64) -> Vec<DensityPoint> {
    let Some((lo, hi)) = value_range(values) else {
        return Vec::new();
    };
    if grid_points < 2 {
        return Vec::new();
    }

    let n = values.len() as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * PI).sqrt());
    let step = (hi - lo) / (grid_points - 1) as f64;

    (0..grid_points)
        .map(|i| {
            let x = lo + step * i as f64;
            let sum: f64 = values
                .iter()
                .map(|v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            DensityPoint {
                x,
                y: sum * norm * scale,
            }
        })
        .collect()
}

/// Histogram plus density overlay in count units.
pub fn histogram_with_density(values: &[f64], bin_count: usize) -> Histogram {
    let bins = equal_width_bins(values, bin_count);
    let bandwidth = scott_bandwidth(values);

    let density = match (bandwidth, bins.first()) {
        (Some(bw), Some(first)) => {
            let scale = values.len() as f64 * (first.upper - first.lower);
            gaussian_kde(values, bw, DENSITY_GRID_POINTS, scale)
        }
        _ => Vec::new(),
    };

    Histogram {
        bins,
        density,
        bandwidth,
    }
}
