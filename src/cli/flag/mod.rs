// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Flag visibilities that are contaminated by the sun.


use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use thiserror::Error;

use super::common::{display_warnings, InfoPrinter, SunArgs, VisArgs, Warn, ARG_FILE_HELP};
use crate::{
    constants::{DEFAULT_CELL_ARCSEC, DEFAULT_IMSIZE, DEFAULT_THRESHOLD},
    flagging::{ClipConfig, FlagConfig, GroupMode, WedgeConfig},
    grid::GridConfig,
    params::FlagParams,
    plotting::PlotParams,
    stats::ThresholdMode,
    vis::{read_baselines_file, read_channels_file, Polarisation, VisSelection},
    SunflagError,
};

lazy_static::lazy_static! {
    static ref POL_HELP: String =
        format!("The polarisation that statistics are derived from. Supported: {}. Default: {}",
                Polarisation::iter().join(", "), Polarisation::default());

    static ref IMSIZE_HELP: String =
        format!("The number of pixels along each side of the image that the uv grid corresponds to. Default: {DEFAULT_IMSIZE}");

    static ref CELL_HELP: String =
        format!("The angular size of an image pixel [arcseconds]. Default: {DEFAULT_CELL_ARCSEC}");

    static ref MODE_HELP: String =
        format!("How samples are grouped for their statistics. Supported: {}. Default: {}",
                GroupMode::iter().join(", "), GroupMode::default());

    static ref THRESHMODE_HELP: String =
        format!("The statistic that the threshold is relative to. Supported: {}. Default: {}",
                ThresholdMode::iter().join(", "), ThresholdMode::default());

    static ref THRESHOLD_HELP: String =
        format!("Gridded amplitudes this many scales above the location are flagged. Default: {DEFAULT_THRESHOLD}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct FlagCliArgs {
    #[clap(long, help = POL_HELP.as_str(), help_heading = "SELECTION")]
    pub(super) pol: Option<String>,

    /// Only use these fields. The default is to use all fields.
    #[clap(long, multiple_values(true), help_heading = "SELECTION")]
    pub(super) fields: Option<Vec<usize>>,

    /// A file with a boolean for each channel; only channels that are "true"
    /// are used. The default is to use all channels.
    #[clap(long, help_heading = "SELECTION")]
    pub(super) channels_file: Option<PathBuf>,

    /// A file with a pair of antenna indices on each line; only these
    /// baselines are used. The default is to use all cross-correlation
    /// baselines.
    #[clap(long, help_heading = "SELECTION")]
    pub(super) baselines_file: Option<PathBuf>,

    #[clap(long, help = IMSIZE_HELP.as_str(), help_heading = "GRIDDING")]
    pub(super) imsize: Option<usize>,

    #[clap(long, help = CELL_HELP.as_str(), help_heading = "GRIDDING")]
    pub(super) cell: Option<f64>,

    /// Samples with baselines not longer than this are ignored [wavelengths].
    /// Default: 0
    #[clap(long, help_heading = "GRIDDING")]
    pub(super) uvmin: Option<f64>,

    /// Samples with baselines not shorter than this are ignored
    /// [wavelengths]. A value of 0 means there is no maximum. Default: 0
    #[clap(long, help_heading = "GRIDDING")]
    pub(super) uvmax: Option<f64>,

    #[clap(long, help = MODE_HELP.as_str(), help_heading = "CLIPPING")]
    pub(super) mode: Option<String>,

    #[clap(long, help = THRESHMODE_HELP.as_str(), help_heading = "CLIPPING")]
    pub(super) threshmode: Option<String>,

    #[clap(long, allow_hyphen_values = true, help = THRESHOLD_HELP.as_str(), help_heading = "CLIPPING")]
    pub(super) threshold: Option<f64>,

    /// The radial extent of the wedge drawn around each flagged sample; other
    /// samples inside it are flagged too [wavelengths]. 0 disables wedges.
    /// Default: 0
    #[clap(long, help_heading = "WEDGES")]
    pub(super) radrange: Option<f64>,

    /// The angular extent of each wedge [degrees]. 0 disables wedges.
    /// Default: 0
    #[clap(long, help_heading = "WEDGES")]
    pub(super) angle: Option<f64>,

    /// Don't derive statistics from samples taken at night.
    #[clap(long, help_heading = "DAY AND NIGHT")]
    #[serde(default)]
    pub(super) evaluate_day_only: bool,

    /// Never flag samples taken at night.
    #[clap(long, help_heading = "DAY AND NIGHT")]
    #[serde(default)]
    pub(super) flag_day_only: bool,

    /// Write diagnostic plots with this base name. Only available if compiled
    /// with the "plotting" feature.
    #[clap(long, help_heading = "PLOTTING")]
    pub(super) plot: Option<String>,

    /// The directory to write diagnostic plots into. Default: the current
    /// directory
    #[clap(long, help_heading = "PLOTTING")]
    pub(super) plot_dir: Option<PathBuf>,
}

impl FlagCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            pol: self.pol.or(other.pol),
            fields: self.fields.or(other.fields),
            channels_file: self.channels_file.or(other.channels_file),
            baselines_file: self.baselines_file.or(other.baselines_file),
            imsize: self.imsize.or(other.imsize),
            cell: self.cell.or(other.cell),
            uvmin: self.uvmin.or(other.uvmin),
            uvmax: self.uvmax.or(other.uvmax),
            mode: self.mode.or(other.mode),
            threshmode: self.threshmode.or(other.threshmode),
            threshold: self.threshold.or(other.threshold),
            radrange: self.radrange.or(other.radrange),
            angle: self.angle.or(other.angle),
            evaluate_day_only: self.evaluate_day_only || other.evaluate_day_only,
            flag_day_only: self.flag_day_only || other.flag_day_only,
            plot: self.plot.or(other.plot),
            plot_dir: self.plot_dir.or(other.plot_dir),
        }
    }
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct FlagArgs {
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
    #[serde(rename = "flag")]
    #[serde(default)]
    pub(super) flag_args: FlagCliArgs,
}

impl FlagArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<FlagArgs, SunflagError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Ensure all of the file args are accounted for by pattern
            // matching.
            let FlagArgs {
                args_file: _,
                vis_args,
                sun_args,
                flag_args,
            } = unpack_arg_file!(arg_file);

            Ok(FlagArgs {
                args_file: None,
                vis_args: cli_args.vis_args.merge(vis_args),
                sun_args: cli_args.sun_args.merge(sun_args),
                flag_args: cli_args.flag_args.merge(flag_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<FlagParams, SunflagError> {
        debug!("{:#?}", self);

        let FlagArgs {
            args_file: _,
            vis_args,
            sun_args,
            flag_args:
                FlagCliArgs {
                    pol,
                    fields,
                    channels_file,
                    baselines_file,
                    imsize,
                    cell,
                    uvmin,
                    uvmax,
                    mode,
                    threshmode,
                    threshold,
                    radrange,
                    angle,
                    evaluate_day_only,
                    flag_day_only,
                    plot,
                    plot_dir,
                },
        } = self;

        // Make sense of the flagging configuration before touching any files.
        let pol = match pol {
            Some(p) => Polarisation::from_str(&p).map_err(|_| FlagArgsError::ParsePol(p))?,
            None => Polarisation::default(),
        };
        let group_mode = match mode {
            Some(m) => GroupMode::from_str(&m).map_err(|_| FlagArgsError::ParseMode(m))?,
            None => GroupMode::default(),
        };
        let threshold_mode = match threshmode {
            Some(m) => {
                ThresholdMode::from_str(&m).map_err(|_| FlagArgsError::ParseThresholdMode(m))?
            }
            None => ThresholdMode::default(),
        };

        let imsize = imsize.unwrap_or(DEFAULT_IMSIZE);
        if imsize == 0 {
            return Err(FlagArgsError::ZeroImsize.into());
        }
        let cell_arcsec = cell.unwrap_or(DEFAULT_CELL_ARCSEC);
        if !(cell_arcsec > 0.0 && cell_arcsec.is_finite()) {
            return Err(FlagArgsError::BadCell(cell_arcsec).into());
        }
        let threshold = threshold.unwrap_or(DEFAULT_THRESHOLD);
        if !threshold.is_finite() {
            return Err(FlagArgsError::BadThreshold(threshold).into());
        }

        let uvmin = uvmin.unwrap_or(0.0);
        let uvmax = uvmax.filter(|&m| m != 0.0);
        if !(uvmin.is_finite() && uvmin >= 0.0) || uvmax.map(|m| !(m > uvmin)).unwrap_or(false) {
            return Err(FlagArgsError::BadUvRange { uvmin, uvmax }.into());
        }

        let wedge = WedgeConfig {
            radrange: radrange.unwrap_or(0.0),
            angle_deg: angle.unwrap_or(0.0),
        };
        for (what, value) in [("radial range", wedge.radrange), ("angle", wedge.angle_deg)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(FlagArgsError::BadWedge { what, value }.into());
            }
        }

        let plot: Option<PlotParams> = match plot {
            #[cfg(not(feature = "plotting"))]
            Some(_) => return Err(crate::plotting::PlotError::NoPlottingFeature.into()),

            #[cfg(feature = "plotting")]
            Some(name) => Some(PlotParams {
                name,
                dir: plot_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
            }),

            None => {
                if plot_dir.is_some() {
                    "--plot-dir was given without --plot; no plots will be made".warn();
                }
                None
            }
        };

        let selection = VisSelection {
            fields,
            channels: channels_file
                .as_deref()
                .map(read_channels_file)
                .transpose()?,
            baselines: baselines_file
                .as_deref()
                .map(read_baselines_file)
                .transpose()?,
        };

        let datasets = vis_args.parse()?;

        let sun = if evaluate_day_only || flag_day_only {
            Some(sun_args.parse(false)?)
        } else {
            None
        };

        let grid = GridConfig {
            imsize,
            cell_arcsec,
            uvmin,
            uvmax,
        };
        let mut printer = InfoPrinter::new("Flagging".into());
        printer.push_line(format!("Polarisation: {pol}").into());
        let mut block: Vec<std::borrow::Cow<'static, str>> = vec![];
        if let Some(fields) = selection.fields.as_ref() {
            block.push(format!("Using fields {}", fields.iter().join(", ")).into());
        }
        if let Some(channels) = selection.channels.as_ref() {
            block.push(
                format!(
                    "Using {} of {} channels",
                    channels.iter().filter(|&&c| c).count(),
                    channels.len()
                )
                .into(),
            );
        }
        if let Some(baselines) = selection.baselines.as_ref() {
            block.push(format!("Using {} baselines", baselines.len()).into());
        }
        printer.push_block(block);
        printer.push_block(vec![
            format!("Grid: {imsize} pixels of {cell_arcsec}\"").into(),
            format!("Cells are {:.3} wavelengths wide", grid.duv()).into(),
        ]);
        match uvmax {
            Some(uvmax) => printer.push_line(format!("uv range: {uvmin} to {uvmax} wavelengths").into()),
            None if uvmin > 0.0 => printer.push_line(format!("uv range: above {uvmin} wavelengths").into()),
            None => (),
        }
        printer.push_line(
            format!("Clipping {group_mode} groups at {threshold} ({threshold_mode})").into(),
        );
        if wedge.is_enabled() {
            printer.push_line(
                format!(
                    "Wedges: {} wavelengths by {}°",
                    wedge.radrange, wedge.angle_deg
                )
                .into(),
            );
        }
        if evaluate_day_only {
            printer.push_line("Deriving statistics from day-time samples only".into());
        }
        if flag_day_only {
            printer.push_line("Flagging day-time samples only".into());
        }
        if let Some(plot) = plot.as_ref() {
            printer.push_line(format!("Writing diagnostic plots to {}", plot.path("*").display()).into());
        }
        printer.display();
        display_warnings();

        Ok(FlagParams {
            datasets,
            pol,
            selection,
            flag_config: FlagConfig {
                grid,
                group_mode,
                clip: ClipConfig {
                    threshold,
                    mode: threshold_mode,
                },
                wedge,
            },
            evaluate_day_only,
            flag_day_only,
            sun,
            plot,
        })
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

#[derive(Error, Debug)]
pub(super) enum FlagArgsError {
    #[error("Unrecognised polarisation '{0}'")]
    ParsePol(String),

    #[error("Unrecognised grouping mode '{0}'")]
    ParseMode(String),

    #[error("Unrecognised threshold mode '{0}'")]
    ParseThresholdMode(String),

    #[error("The image size must be at least 1 pixel")]
    ZeroImsize,

    #[error("The cell size must be a positive number of arcseconds; got {0}")]
    BadCell(f64),

    #[error("The clipping threshold must be a finite number; got {0}")]
    BadThreshold(f64),

    #[error("The uv range is invalid: minimum {uvmin}, maximum {uvmax:?}")]
    BadUvRange { uvmin: f64, uvmax: Option<f64> },

    #[error("The wedge {what} must be a finite, non-negative number; got {value}")]
    BadWedge { what: &'static str, value: f64 },
}
