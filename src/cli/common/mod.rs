// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. Both the `flag` and `solar`
//! subcommands read visibility tables and write flags back to them, and both
//! may need to know where the sun is, so those arguments are shared.

mod printers;

pub(super) use printers::InfoPrinter;
pub(crate) use printers::{display_warnings, Warn};

use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;
use marlu::LatLngHeight;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;
use vec1::Vec1;

use crate::{
    constants::{
        DEFAULT_APRESNUIT, DEFAULT_APRESOLEIL, DEFAULT_AVANTNUIT, DEFAULT_AVANTSOLEIL,
        DEFAULT_HORIZON_ARCMIN,
    },
    io::{expand_input_paths, get_flag_writer, get_vis_reader, GlobError, VisReadError, VisWriteError},
    params::{DatasetParams, SunParams},
    solar::{LowPrecisionSun, SolarConfig, SolarMargins},
    unit_parsing::{parse_angle_deg, parse_duration, UnitParseError},
};

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    static ref ARRAY_POSITION_HELP: String =
        "The Earth longitude, latitude, and height of the instrumental array [degrees, degrees, meters]. Default: the mean position of each table's antennas".to_string();

    static ref AVANTSOLEIL_HELP: String =
        format!("How long before sunrise the sunrise window starts. Default: {DEFAULT_AVANTSOLEIL}");

    static ref APRESNUIT_HELP: String =
        format!("How long after sunrise the sunrise window ends. Default: {DEFAULT_APRESNUIT}");

    static ref AVANTNUIT_HELP: String =
        format!("How long before sunset the sunset window starts. Default: {DEFAULT_AVANTNUIT}");

    static ref APRESOLEIL_HELP: String =
        format!("How long after sunset the sunset window ends. Default: {DEFAULT_APRESOLEIL}");

    static ref HORIZON_HELP: String =
        format!("The altitude of the centre of the sun at sunrise and sunset. Naked numbers are arcminutes. Default: {DEFAULT_HORIZON_ARCMIN}arcmin");
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(SunflagError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(SunflagError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            _ => {
                return Err(SunflagError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}

/// The visibility tables to read, and where to write their flags.
#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct VisArgs {
    /// Paths to input visibility tables. Globs are expanded.
    #[clap(
        short = 'd',
        long = "data",
        multiple_values(true),
        help_heading = "INPUT DATA"
    )]
    pub(super) files: Option<Vec<String>>,

    /// Paths to the tables that flags are written to, one per input table. A
    /// table that doesn't exist is created as a copy of its input. The default
    /// is to write flags into the input tables.
    #[clap(short, long, multiple_values(true), help_heading = "OUTPUT FILES")]
    pub(super) outputs: Option<Vec<PathBuf>>,
}

impl VisArgs {
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            files: self.files.or(other.files),
            outputs: self.outputs.or(other.outputs),
        }
    }

    pub(super) fn parse(self) -> Result<Vec1<DatasetParams>, VisArgsError> {
        let Self { files, outputs } = self;

        let inputs = match files {
            Some(files) => expand_input_paths(&files)?,
            None => return Err(VisArgsError::NoInputs),
        };
        let outputs = match outputs {
            Some(outputs) => {
                if outputs.len() != inputs.len() {
                    return Err(VisArgsError::OutputCountMismatch {
                        inputs: inputs.len(),
                        outputs: outputs.len(),
                    });
                }
                outputs
            }
            None => {
                "No outputs were specified; flags will be written into the input tables".warn();
                inputs.to_vec()
            }
        };

        let mut printer = InfoPrinter::new("Visibility tables".into());
        let mut datasets = Vec::with_capacity(inputs.len());
        for (input, output) in inputs.into_iter().zip(outputs) {
            if input == output {
                printer.push_line(format!("{}", input.display()).into());
            } else {
                printer.push_line(format!("{} -> {}", input.display(), output.display()).into());
            }
            datasets.push(DatasetParams {
                reader: get_vis_reader(input.clone())?,
                writer: get_flag_writer(input, output)?,
            });
        }
        printer.display();

        Ok(Vec1::try_from_vec(datasets).expect("inputs cannot be empty"))
    }
}

/// Where the sun is, and the time windows around sunrise and sunset.
#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SunArgs {
    #[clap(long, help = AVANTSOLEIL_HELP.as_str(), help_heading = "SOLAR WINDOWS")]
    pub(super) avantsoleil: Option<String>,

    #[clap(long, help = APRESNUIT_HELP.as_str(), help_heading = "SOLAR WINDOWS")]
    pub(super) apresnuit: Option<String>,

    #[clap(long, help = AVANTNUIT_HELP.as_str(), help_heading = "SOLAR WINDOWS")]
    pub(super) avantnuit: Option<String>,

    #[clap(long, help = APRESOLEIL_HELP.as_str(), help_heading = "SOLAR WINDOWS")]
    pub(super) apresoleil: Option<String>,

    #[clap(long, allow_hyphen_values = true, help = HORIZON_HELP.as_str(), help_heading = "SOLAR WINDOWS")]
    pub(super) horizon: Option<String>,

    /// Use one window for the whole day, from before sunrise until after
    /// sunset, rather than one window around each of them.
    #[clap(long, help_heading = "SOLAR WINDOWS")]
    #[serde(default)]
    pub(super) nononsoleil: bool,

    #[clap(
        long, help = ARRAY_POSITION_HELP.as_str(), help_heading = "SOLAR WINDOWS",
        number_of_values = 3,
        allow_hyphen_values = true,
        value_names = &["LONG_DEG", "LAT_DEG", "HEIGHT_M"]
    )]
    pub(super) array_position: Option<Vec<f64>>,
}

impl SunArgs {
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            avantsoleil: self.avantsoleil.or(other.avantsoleil),
            apresnuit: self.apresnuit.or(other.apresnuit),
            avantnuit: self.avantnuit.or(other.avantnuit),
            apresoleil: self.apresoleil.or(other.apresoleil),
            horizon: self.horizon.or(other.horizon),
            nononsoleil: self.nononsoleil || other.nononsoleil,
            array_position: self.array_position.or(other.array_position),
        }
    }

    /// Windows (or, with `invert`, the times outside them) are what get
    /// flagged.
    pub(super) fn parse(self, invert: bool) -> Result<SunParams, SunArgsError> {
        let Self {
            avantsoleil,
            apresnuit,
            avantnuit,
            apresoleil,
            horizon,
            nononsoleil,
            array_position,
        } = self;

        let mut printer = InfoPrinter::new("Solar windows".into());

        let margin = |arg: Option<String>, default: &str| {
            parse_duration(arg.as_deref().unwrap_or(default)).map_err(SunArgsError::ParseMargin)
        };
        let margins = SolarMargins {
            avantsoleil: margin(avantsoleil, DEFAULT_AVANTSOLEIL)?,
            apresnuit: margin(apresnuit, DEFAULT_APRESNUIT)?,
            avantnuit: margin(avantnuit, DEFAULT_AVANTNUIT)?,
            apresoleil: margin(apresoleil, DEFAULT_APRESOLEIL)?,
        };
        if nononsoleil {
            printer.push_line(
                format!(
                    "From {} before sunrise until {} after sunset",
                    margins.avantsoleil, margins.apresoleil
                )
                .into(),
            );
        } else {
            printer.push_block(vec![
                format!(
                    "Sunrise: {} before until {} after",
                    margins.avantsoleil, margins.apresnuit
                )
                .into(),
                format!(
                    "Sunset:  {} before until {} after",
                    margins.avantnuit, margins.apresoleil
                )
                .into(),
            ]);
        }
        if invert {
            printer.push_line("Flagging the times outside of the windows".into());
        }

        let horizon_deg = match horizon {
            Some(h) => parse_angle_deg(&h).map_err(SunArgsError::ParseHorizon)?,
            None => DEFAULT_HORIZON_ARCMIN / 60.0,
        };
        if !(-90.0..=90.0).contains(&horizon_deg) {
            return Err(SunArgsError::BadHorizon(horizon_deg));
        }
        printer.push_line(format!("The sun rises and sets at an altitude of {horizon_deg:.3}°").into());

        let array_position = match array_position {
            None => {
                printer.push_line("Array position: mean antenna position".into());
                None
            }
            Some(v) => {
                if v.len() != 3 {
                    return Err(SunArgsError::BadArrayPosition { pos: v });
                }
                printer.push_line(
                    format!(
                        "Array position: ({:.4}°, {:.4}°, {:.1}m)",
                        v[0], v[1], v[2]
                    )
                    .into(),
                );
                Some(LatLngHeight {
                    longitude_rad: v[0].to_radians(),
                    latitude_rad: v[1].to_radians(),
                    height_metres: v[2],
                })
            }
        };
        printer.display();

        Ok(SunParams {
            config: SolarConfig {
                margins,
                nononsoleil,
                invert,
            },
            ephemeris: LowPrecisionSun::new(horizon_deg.to_radians()),
            array_position,
        })
    }
}

#[derive(Error, Debug)]
pub(super) enum VisArgsError {
    #[error("No input visibility tables were supplied")]
    NoInputs,

    #[error("{inputs} input tables were supplied, but {outputs} outputs; these must match")]
    OutputCountMismatch { inputs: usize, outputs: usize },

    #[error(transparent)]
    Glob(#[from] GlobError),

    #[error(transparent)]
    VisRead(#[from] VisReadError),

    #[error(transparent)]
    VisWrite(#[from] VisWriteError),
}

#[derive(Error, Debug)]
pub(super) enum SunArgsError {
    #[error("Couldn't parse a solar window margin: {0}")]
    ParseMargin(UnitParseError),

    #[error("Couldn't parse the horizon: {0}")]
    ParseHorizon(UnitParseError),

    #[error("The sun's altitude at sunrise and sunset must be between -90 and 90 degrees; got {0}")]
    BadHorizon(f64),

    #[error("Array position specified as {pos:?}, not [<Longitude>, <Latitude>, <Height>]")]
    BadArrayPosition { pos: Vec<f64> },
}
