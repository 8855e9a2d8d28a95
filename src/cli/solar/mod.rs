// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Flag whole rows of visibilities near sunrise and sunset, or during the
//! day or night.


use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{display_warnings, SunArgs, VisArgs, ARG_FILE_HELP};
use crate::{params::SolarParams, SunflagError};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SolarCliArgs {
    /// Flag the times outside of the windows, rather than inside them. With
    /// --nononsoleil, this flags the night.
    #[clap(long, help_heading = "SOLAR WINDOWS")]
    #[serde(default)]
    pub(super) invert: bool,
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SolarArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "data")]
    #[serde(default)]
    pub(super) vis_args: VisArgs,

    #[clap(flatten)]
    #[serde(rename = "sun")]
    #[serde(default)]
    pub(super) sun_args: SunArgs,

    #[clap(flatten)]
    #[serde(rename = "solar")]
    #[serde(default)]
    pub(super) solar_args: SolarCliArgs,
}

impl SolarArgs {
    /// Merge the command-line arguments with those in the arguments file,
    /// preferring the command line.
    pub(super) fn merge(self) -> Result<SolarArgs, SunflagError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let SolarArgs {
                args_file: _,
                vis_args,
                sun_args,
                solar_args,
            } = unpack_arg_file!(arg_file);

            Ok(SolarArgs {
                args_file: None,
                vis_args: cli_args.vis_args.merge(vis_args),
                sun_args: cli_args.sun_args.merge(sun_args),
                solar_args: SolarCliArgs {
                    invert: cli_args.solar_args.invert || solar_args.invert,
                },
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<SolarParams, SunflagError> {
        debug!("{:#?}", self);

        let SolarArgs {
            args_file: _,
            vis_args,
            sun_args,
            solar_args: SolarCliArgs { invert },
        } = self;

        let sun = sun_args.parse(invert)?;
        let datasets = vis_args.parse()?;
        display_warnings();

        Ok(SolarParams { datasets, sun })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), SunflagError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- flags will not be written.");
        }

        params.run(dry_run)?;
        Ok(())
    }
}
