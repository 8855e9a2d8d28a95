// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.


use crate::constants::MAD_TO_STD;

/// Inverse tangent. y comes before x, like the C function.
///
/// # Examples
///
/// `assert_abs_diff_eq!(atan2(1, -1), 3.0 / 4.0 * PI);`
#[inline]
pub(crate) fn atan2(y: f64, x: f64) -> f64 {
    y.atan2(x)
}

/// Get the median of the supplied values. The values are expected to be
/// finite; `None` is returned if there are no values.
pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// The median absolute deviation of `values` about `centre`, scaled to be
/// consistent with the standard deviation of a normal distribution.
pub(crate) fn mad_std(values: &[f64], centre: f64) -> Option<f64> {
    let deviations: Vec<f64> = values.iter().map(|v| (v - centre).abs()).collect();
    median(&deviations).map(|mad| mad * MAD_TO_STD)
}

/// The mean and (population) standard deviation of the values.
pub(crate) fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

/// A histogram with equal-width bins.
#[derive(Debug, Clone)]
pub(crate) struct Histogram {
    /// The number of values in each bin.
    pub(crate) counts: Vec<f64>,

    /// The bin edges; there is one more edge than there are bins.
    pub(crate) edges: Vec<f64>,
}

impl Histogram {
    /// Bin `values` into `num_bins` bins spanning `(low, high)`. Values outside
    /// the range are ignored. The last bin includes its upper edge.
    pub(crate) fn new(values: &[f64], num_bins: usize, (low, high): (f64, f64)) -> Histogram {
        let num_bins = num_bins.max(1);
        let width = (high - low) / num_bins as f64;
        let edges = (0..=num_bins).map(|i| low + i as f64 * width).collect();
        let mut counts = vec![0.0; num_bins];
        for &v in values {
            if !(low..=high).contains(&v) {
                continue;
            }
            let i_bin = (((v - low) / width).floor() as usize).min(num_bins - 1);
            counts[i_bin] += 1.0;
        }
        Histogram { counts, edges }
    }

    pub(crate) fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    /// The centre of each bin.
    pub(crate) fn centres(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }

    /// The index of the fullest bin. Ties go to the first bin.
    pub(crate) fn peak(&self) -> usize {
        let mut i_peak = 0;
        for (i, &c) in self.counts.iter().enumerate() {
            if c > self.counts[i_peak] {
                i_peak = i;
            }
        }
        i_peak
    }
}

/// The value of a Gaussian `amplitude * exp(-0.5 * ((x - centre) / sigma)^2)`.
#[inline]
pub(crate) fn gaussian(x: f64, centre: f64, amplitude: f64, sigma: f64) -> f64 {
    amplitude * (-0.5 * ((x - centre) / sigma).powi(2)).exp()
}

/// Is the point `(x, y)` inside the closed polygon? This uses the even-odd
/// rule; the polygon's vertices are in order and the last vertex connects to
/// the first.
pub(crate) fn point_in_polygon(x: f64, y: f64, polygon: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[j];
        if (yi > y) != (yj > y) {
            let x_cross = (xj - xi) * (y - yi) / (yj - yi) + xi;
            if x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// The axis-aligned bounding box of a set of vertices as `(min_x, max_x,
/// min_y, max_y)`.
pub(crate) fn bounding_box(vertices: &[(f64, f64)]) -> (f64, f64, f64, f64) {
    vertices.iter().fold(
        (
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
        ),
        |(min_x, max_x, min_y, max_y), &(x, y)| {
            (min_x.min(x), max_x.max(x), min_y.min(y), max_y.max(y))
        },
    )
}
