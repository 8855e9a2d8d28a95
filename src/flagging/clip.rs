// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Building a flag mask by clipping gridded values above a threshold.

use log::{debug, info};

use crate::{
    constants::DEFAULT_THRESHOLD,
    grid::GriddedVis,
    stats::{estimate, ClipStatistics, StatsError, ThresholdMode},
};

/// How values are clipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipConfig {
    /// The number of "sigmas" above the location that a value must be to be
    /// flagged. This is also the threshold of the sigma clipping used to
    /// derive the statistics.
    pub threshold: f64,

    pub mode: ThresholdMode,
}

impl Default for ClipConfig {
    fn default() -> Self {
        ClipConfig {
            threshold: DEFAULT_THRESHOLD,
            mode: ThresholdMode::default(),
        }
    }
}

/// Everything needed to draw a histogram of a group's values.
#[derive(Debug, Clone)]
pub struct ClipDiagnostics {
    pub title: String,

    /// The group's cell values before sigma clipping.
    pub unclipped: Vec<f64>,

    /// The group's cell values after sigma clipping.
    pub clipped: Vec<f64>,

    pub statistics: ClipStatistics,

    pub mode: ThresholdMode,

    pub threshold: f64,
}

impl ClipDiagnostics {
    /// The thresholds `mean -/+ threshold * std`.
    pub fn std_thresholds(&self) -> (f64, f64) {
        let ClipStatistics { mean, std, .. } = self.statistics;
        (mean - self.threshold * std, mean + self.threshold * std)
    }

    /// The value at and above which samples were flagged, if any were.
    pub fn flag_threshold(&self) -> Option<f64> {
        self.statistics
            .location_scale(self.mode)
            .map(|(location, scale)| location + self.threshold * scale)
    }
}

/// The result of [`clip_group`].
#[derive(Debug, Clone)]
pub struct ClipOutcome {
    pub mask: Vec<bool>,

    /// Only present if requested and the group had enough data.
    pub diagnostics: Option<ClipDiagnostics>,
}

/// Derive statistics from the cells occupied by samples that aren't ignored,
/// then flag every sample whose cell value is at or above the threshold.
/// Samples that are `true` in `unflag` are never flagged. `title` names the
/// group in log messages and diagnostics.
///
/// Each cell contributes one value to the statistics, no matter how many of
/// its members are used. Insufficient data isn't an error; nothing is flagged.
pub fn clip_group(
    gridded: &GriddedVis,
    ignore: &[bool],
    unflag: Option<&[bool]>,
    config: &ClipConfig,
    title: &str,
    with_diagnostics: bool,
) -> ClipOutcome {
    let num_samples = gridded.sample_values.len();
    let mut mask = vec![false; num_samples];

    let mut used_cells = vec![false; gridded.cells.len()];
    for (&cell, &ignored) in gridded.sample_cells.iter().zip(ignore) {
        if let (Some(i_cell), false) = (cell, ignored) {
            used_cells[i_cell] = true;
        }
    }
    let values: Vec<f64> = gridded
        .cells
        .iter()
        .zip(used_cells)
        .filter(|(_, used)| *used)
        .map(|(cell, _)| cell.value)
        .filter(|v| v.is_finite())
        .collect();

    let result = match estimate(
        &values,
        config.threshold,
        config.mode,
        with_diagnostics,
    ) {
        Ok(e) => e,
        Err(StatsError::InsufficientData { num_points }) => {
            info!("{title}: only {num_points} grid points; not flagging");
            return ClipOutcome {
                mask,
                diagnostics: None,
            };
        }
    };

    match result.statistics.location_scale(config.mode) {
        Some((location, scale)) => {
            let limit = location + config.threshold * scale;
            debug!("{title}: flagging values >= {limit} (location {location}, scale {scale})");
            for (m, &value) in mask.iter_mut().zip(gridded.sample_values.iter()) {
                *m = value >= limit;
            }
            if let Some(unflag) = unflag {
                for (m, &u) in mask.iter_mut().zip(unflag) {
                    *m &= !u;
                }
            }
            info!(
                "{title}: {} of {} samples are at or above {limit:.4}",
                mask.iter().filter(|&&m| m).count(),
                num_samples,
            );
        }
        None => {
            info!("{title}: the {} statistics are degenerate; not flagging", config.mode);
        }
    }

    ClipOutcome {
        mask,
        diagnostics: with_diagnostics.then(|| ClipDiagnostics {
            title: title.to_string(),
            unclipped: values,
            clipped: result.clipped,
            statistics: result.statistics,
            mode: config.mode,
            threshold: config.threshold,
        }),
    }
}
