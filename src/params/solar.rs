// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use log::info;
use vec1::Vec1;

use super::{read_datasets, DatasetParams, SunParams};
use crate::{
    io::{VisReadError, VisWriteError},
    solar::SolarError,
};

/// Flag whole rows by the time of day.
pub(crate) struct SolarParams {
    pub(crate) datasets: Vec1<DatasetParams>,
    pub(crate) sun: SunParams,
}

impl SolarParams {
    pub(crate) fn run(&self, dry_run: bool) -> Result<(), SolarRunError> {
        let all_vis = read_datasets(&self.datasets)?;

        let mut all_flags = Vec::with_capacity(all_vis.len());
        for (vis, dataset) in all_vis.iter().zip(self.datasets.iter()) {
            let windows = self.sun.windows(vis)?;
            info!(
                "{}: {} windows; {} of {} rows are to be flagged",
                dataset.reader.get_path().display(),
                windows.windows.len(),
                windows.flags.iter().filter(|&&f| f).count(),
                windows.flags.len()
            );
            all_flags.push(windows.flags);
        }

        if dry_run {
            info!("Dry run -- not writing flags.");
            return Ok(());
        }

        for (flags, dataset) in all_flags.iter().zip(self.datasets.iter()) {
            let num_flagged = dataset.writer.write_row_flags(flags)?;
            info!(
                "Flagged {num_flagged} of {} rows in {}",
                flags.len(),
                dataset.writer.get_path().display()
            );
        }

        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum SolarRunError {
    #[error(transparent)]
    VisRead(#[from] VisReadError),

    #[error(transparent)]
    VisWrite(#[from] VisWriteError),

    #[error(transparent)]
    Solar(#[from] SolarError),
}
