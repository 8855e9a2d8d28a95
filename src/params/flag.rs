// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use log::{debug, info};
use vec1::Vec1;

use super::{read_datasets, DatasetParams, SunParams};
use crate::{
    flagging::{flag_samples, FlagConfig, FlagError},
    io::{VisReadError, VisWriteError},
    plotting::{plot_diagnostics, PlotError, PlotParams},
    solar::SolarError,
    vis::{Polarisation, Samples, VisError, VisSelection},
};

pub(crate) struct FlagParams {
    pub(crate) datasets: Vec1<DatasetParams>,
    pub(crate) pol: Polarisation,
    pub(crate) selection: VisSelection,
    pub(crate) flag_config: FlagConfig,

    /// Don't derive statistics from samples taken at night.
    pub(crate) evaluate_day_only: bool,

    /// Never flag samples taken at night.
    pub(crate) flag_day_only: bool,

    /// "Night" is any time outside of the sun's windows. Only needed for the
    /// day-only options.
    pub(crate) sun: Option<SunParams>,

    pub(crate) plot: Option<PlotParams>,
}

impl FlagParams {
    pub(crate) fn run(&self, dry_run: bool) -> Result<(), FlagRunError> {
        let all_vis = read_datasets(&self.datasets)?;

        let day_only_sun = self
            .sun
            .as_ref()
            .filter(|_| self.evaluate_day_only || self.flag_day_only);
        let mut sets = Vec::with_capacity(all_vis.len());
        let mut unflag: Option<Vec<bool>> = match day_only_sun {
            Some(_) if self.flag_day_only => Some(Vec::with_capacity(
                all_vis.iter().map(|v| v.num_rows()).sum(),
            )),
            _ => None,
        };
        for (vis, dataset) in all_vis.iter().zip(self.datasets.iter()) {
            let mut samples = vis.to_samples(self.pol, &self.selection)?;
            if let Some(sun) = day_only_sun {
                let windows = sun.windows(vis)?;
                let night: Vec<bool> = windows.flags.iter().map(|&day| !day).collect();
                info!(
                    "{}: {} of {} rows are at night",
                    dataset.reader.get_path().display(),
                    night.iter().filter(|&&n| n).count(),
                    night.len()
                );
                if self.evaluate_day_only {
                    let num_excluded = samples.exclude_samples(&night)?;
                    debug!("Excluded {num_excluded} night-time samples from the statistics");
                }
                if let Some(unflag) = unflag.as_mut() {
                    unflag.extend(night);
                }
            }
            sets.push(samples);
        }
        let samples = Samples::concatenate(sets)?;

        let outcome = flag_samples(
            &samples,
            &self.flag_config,
            unflag.as_deref(),
            self.plot.is_some(),
        )?;

        // Plots are made even on a dry run.
        if let Some(plot) = self.plot.as_ref() {
            let files = plot_diagnostics(&samples, &outcome, plot)?;
            debug!("Wrote {} plots", files.len());
        }

        if dry_run {
            info!("Dry run -- not writing flags.");
            return Ok(());
        }

        for (i_dataset, dataset) in self.datasets.iter().enumerate() {
            let range = samples.dataset_range(i_dataset);
            let num_flagged = dataset.writer.write_row_flags(&outcome.mask[range.clone()])?;
            info!(
                "Flagged {num_flagged} of {} rows in {}",
                range.len(),
                dataset.writer.get_path().display()
            );
        }

        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum FlagRunError {
    #[error(transparent)]
    VisRead(#[from] VisReadError),

    #[error(transparent)]
    VisWrite(#[from] VisWriteError),

    #[error(transparent)]
    Vis(#[from] VisError),

    #[error(transparent)]
    Flag(#[from] FlagError),

    #[error(transparent)]
    Solar(#[from] SolarError),

    #[error(transparent)]
    Plot(#[from] PlotError),
}
