// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Robust statistics of gridded values.
//!
//! The values are sigma clipped about their median (with a MAD-derived
//! scale) until nothing more is discarded. From the survivors, a mean and
//! standard deviation, a median and MAD, and optionally a Gaussian fit to
//! their histogram are computed. A [`ThresholdMode`] picks which of these
//! defines the clipping threshold.

mod error;
pub(crate) mod fit;

pub use error::StatsError;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    constants::TAU,
    math::{mad_std, mean_std, median, Histogram},
};
use fit::{fit_gaussian, LMConfig};

/// The statistic from which the flagging threshold is derived. The threshold
/// is `location + threshold * scale`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum ThresholdMode {
    /// Location 0, scale 1; the threshold is an absolute value.
    #[strum(to_string = "fixed", serialize = "abs")]
    #[serde(rename = "fixed", alias = "abs")]
    Fixed,

    /// The mean and standard deviation of the clipped values.
    #[strum(serialize = "std")]
    #[serde(rename = "std")]
    Std,

    /// The median and MAD of the clipped values.
    #[strum(serialize = "mad")]
    #[serde(rename = "mad")]
    Mad,

    /// The centre and width of a Gaussian fitted to a histogram of the
    /// clipped values.
    #[default]
    #[strum(serialize = "fit")]
    #[serde(rename = "fit")]
    Fit,
}

/// A Gaussian `amplitude * exp(-0.5 * ((x - centre) / sigma)^2)` describing a
/// histogram of the clipped values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianFit {
    pub centre: f64,
    pub amplitude: f64,

    /// Always non-negative.
    pub sigma: f64,

    /// If `false`, the least-squares fit failed and these parameters were
    /// derived from the mean and standard deviation instead.
    pub converged: bool,
}

/// The statistics of a set of gridded values.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipStatistics {
    /// Mean of the clipped values.
    pub mean: f64,

    /// (Population) standard deviation of the clipped values.
    pub std: f64,

    pub median: f64,

    /// The Gaussian-consistent median absolute deviation of the clipped values
    /// about their median.
    pub mad: f64,

    /// Only computed if it was needed.
    pub fit: Option<GaussianFit>,

    /// The number of finite values supplied.
    pub num_points: usize,

    /// The number of values that survived clipping.
    pub num_clipped: usize,
}

impl ClipStatistics {
    /// The `(location, scale)` pair for a mode. `None` means that the
    /// statistics can't support a threshold, and nothing should be flagged.
    pub fn location_scale(&self, mode: ThresholdMode) -> Option<(f64, f64)> {
        let (location, scale) = match mode {
            ThresholdMode::Fixed => return Some((0.0, 1.0)),
            ThresholdMode::Std => (self.mean, self.std),
            ThresholdMode::Mad => (self.median, self.mad),
            ThresholdMode::Fit => {
                let fit = self.fit?;
                (fit.centre, fit.sigma)
            }
        };
        if location.is_finite() && scale.is_finite() && scale > 0.0 {
            Some((location, scale))
        } else {
            None
        }
    }
}

/// The result of [`estimate`].
#[derive(Debug, Clone)]
pub struct Estimate {
    pub statistics: ClipStatistics,

    /// The finite values that survived sigma clipping.
    pub clipped: Vec<f64>,
}

/// Iteratively discard values further than `threshold` MAD-derived sigmas from
/// the median. Iteration stops when nothing more is discarded, or fewer than 3
/// values remain.
pub fn sigma_clip(values: &[f64], threshold: f64) -> Vec<f64> {
    let mut kept: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let mut num_iterations = 0;
    while kept.len() >= 3 {
        let n_before = kept.len();
        let Some(centre) = median(&kept) else {
            break;
        };
        let Some(scale) = mad_std(&kept, centre) else {
            break;
        };
        let limit = threshold * scale;
        kept.retain(|v| (v - centre).abs() <= limit);
        num_iterations += 1;
        trace!(
            "Sigma clip iteration {num_iterations}: centre {centre}, scale {scale}, {} values left",
            kept.len()
        );
        if kept.len() == n_before {
            break;
        }
    }
    kept
}

/// Compute the statistics of `values`. Non-finite values are ignored. The
/// Gaussian fit is only done when `mode` is [`ThresholdMode::Fit`] or
/// `with_fit` is set (e.g. for plotting).
pub fn estimate(
    values: &[f64],
    threshold: f64,
    mode: ThresholdMode,
    with_fit: bool,
) -> Result<Estimate, StatsError> {
    let num_points = values.iter().filter(|v| v.is_finite()).count();
    if num_points < 3 {
        return Err(StatsError::InsufficientData { num_points });
    }

    let clipped = sigma_clip(values, threshold);
    let (mean, std) = mean_std(&clipped).unwrap_or((f64::NAN, f64::NAN));
    let median = median(&clipped).unwrap_or(f64::NAN);
    let mad = mad_std(&clipped, median).unwrap_or(f64::NAN);
    debug!(
        "{num_points} points, {} after clipping; mean {mean}, std {std}, median {median}, mad {mad}",
        clipped.len()
    );

    let fit = if mode == ThresholdMode::Fit || with_fit {
        let fit = histogram_fit(&clipped, num_points, mean, std);
        debug!(
            "Gaussian fit: centre {}, amplitude {}, sigma {} (converged: {})",
            fit.centre, fit.amplitude, fit.sigma, fit.converged
        );
        Some(fit)
    } else {
        None
    };

    Ok(Estimate {
        statistics: ClipStatistics {
            mean,
            std,
            median,
            mad,
            fit,
            num_points,
            num_clipped: clipped.len(),
        },
        clipped,
    })
}

/// The histogram of the clipped values used for the Gaussian fit. There are
/// `floor(sqrt(N)) + 1` bins.
pub(crate) fn clipped_histogram(clipped: &[f64]) -> Histogram {
    let num_bins = (clipped.len() as f64).sqrt().floor() as usize + 1;
    let (low, high) = clipped
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = if !(low.is_finite() && high.is_finite()) {
        (0.0, 1.0)
    } else if low == high {
        (low - 0.5, high + 0.5)
    } else {
        (low, high)
    };
    Histogram::new(clipped, num_bins, range)
}

fn histogram_fit(clipped: &[f64], num_points: usize, mean: f64, std: f64) -> GaussianFit {
    let histogram = clipped_histogram(clipped);
    let fallback = GaussianFit {
        centre: mean,
        amplitude: histogram.bin_width() * num_points as f64 / (TAU.sqrt() * std),
        sigma: std,
        converged: false,
    };

    // Three parameters can't be fitted to fewer than three points.
    if histogram.counts.len() < 3 {
        return fallback;
    }

    let centres = histogram.centres();
    let i_peak = histogram.peak();
    let initial_params = [centres[i_peak], histogram.counts[i_peak], std / 2.0];
    let result = fit_gaussian(
        &centres,
        &histogram.counts,
        initial_params,
        &LMConfig::default(),
    );
    trace!(
        "Gaussian fit finished after {} iterations with chi2 {}",
        result.iterations,
        result.chi2
    );
    let [centre, amplitude, sigma] = result.params;
    if result.converged
        && centre.is_finite()
        && amplitude.is_finite()
        && sigma.is_finite()
        && sigma != 0.0
    {
        GaussianFit {
            centre,
            amplitude,
            sigma: sigma.abs(),
            converged: true,
        }
    } else {
        fallback
    }
}
