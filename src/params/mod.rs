// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters that are kept modular to be used in multiple aspects of
//! `sunflag`.
//!
//! The code here is kind of "mirroring" the code within the `cli` module; the
//! idea is that `cli` is unparsed, user-facing code, whereas parameters have
//! been parsed and are ready to be used directly. The code here should be
//! public to the entire `sunflag` crate.

mod flag;
mod solar;

pub(crate) use flag::{FlagParams, FlagRunError};
pub(crate) use solar::{SolarParams, SolarRunError};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info};
use marlu::LatLngHeight;

use crate::{
    io::{FlagWrite, VisRead, VisReadError},
    solar::{solar_windows, LowPrecisionSun, SolarConfig, SolarError, SolarWindows},
    vis::RawVis,
    PROGRESS_BARS,
};

/// A visibility table to read, and where its flags go.
pub(crate) struct DatasetParams {
    pub(crate) reader: Box<dyn VisRead>,
    pub(crate) writer: Box<dyn FlagWrite>,
}

/// Everything needed to find the sun's windows for a dataset.
pub(crate) struct SunParams {
    pub(crate) config: SolarConfig,
    pub(crate) ephemeris: LowPrecisionSun,

    /// If this isn't set, the mean antenna position of each dataset is used.
    pub(crate) array_position: Option<LatLngHeight>,
}

impl SunParams {
    pub(crate) fn observer(&self, vis: &RawVis) -> Result<LatLngHeight, SolarError> {
        match self.array_position {
            Some(p) => Ok(p),
            None => {
                let position = vis
                    .mean_antenna_position()
                    .map(|xyz| xyz.to_earth_wgs84())
                    .ok_or(SolarError::NoArrayPosition)?;
                debug!(
                    "Using the mean antenna position as the array position: ({:.4}°, {:.4}°, {:.1}m)",
                    position.longitude_rad.to_degrees(),
                    position.latitude_rad.to_degrees(),
                    position.height_metres
                );
                Ok(position)
            }
        }
    }

    /// Per row, whether the row is inside a window (or outside, if the config
    /// is inverted).
    pub(crate) fn windows(&self, vis: &RawVis) -> Result<SolarWindows, SolarError> {
        let observer = self.observer(vis)?;
        solar_windows(
            &vis.times,
            &vis.intervals,
            &observer,
            &self.ephemeris,
            &self.config,
        )
    }
}

/// Read every dataset, in order.
pub(crate) fn read_datasets(datasets: &[DatasetParams]) -> Result<Vec<RawVis>, VisReadError> {
    let progress_bar = ProgressBar::with_draw_target(
        Some(datasets.len() as _),
        if PROGRESS_BARS.load() {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        },
    )
    .with_style(
        ProgressStyle::default_bar()
            .template("{msg:17}: [{wide_bar:.blue}] {pos:2}/{len:2} tables ({elapsed_precise}<{eta_precise})")
            .unwrap()
            .progress_chars("=> "),
    )
    .with_position(0)
    .with_message("Reading data");

    let mut all_vis = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        let vis = dataset.reader.read()?;
        debug!(
            "Read {} rows and {} channels from {}",
            vis.num_rows(),
            vis.freqs_hz.len(),
            dataset.reader.get_path().display()
        );
        all_vis.push(vis);
        progress_bar.inc(1);
    }
    progress_bar.abandon_with_message("Finished reading");
    info!("Read {} visibility tables", all_vis.len());
    Ok(all_vis)
}
