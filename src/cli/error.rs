// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all sunflag-related errors. This should be the *only* error
//! enum that is publicly visible.

use thiserror::Error;

use super::{
    common::{SunArgsError, VisArgsError},
    flag::FlagArgsError,
};
use crate::{
    flagging::FlagError,
    io::{GlobError, VisReadError, VisWriteError},
    params::{FlagRunError, SolarRunError},
    plotting::PlotError,
    solar::SolarError,
    vis::VisError,
};

/// The *only* publicly visible error from sunflag.
#[derive(Error, Debug)]
pub enum SunflagError {
    /// An error related to flagging.
    #[error("{0}")]
    Flag(String),

    /// An error related to the sun's windows.
    #[error("{0}")]
    Solar(String),

    /// An error related to reading visibilities.
    #[error("{0}\n\nSupported visibility tables are JSON files; try increasing the verbosity (-v) for more details.")]
    VisRead(String),

    /// An error related to writing flags.
    #[error("{0}")]
    VisWrite(String),

    /// An error related to argument files.
    #[error("{0}")]
    ArgFile(String),

    /// An error related to diagnostic plots.
    #[error("{0}")]
    Plot(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

// Binary sub-command errors.

impl From<VisArgsError> for SunflagError {
    fn from(e: VisArgsError) -> Self {
        let s = e.to_string();
        match e {
            VisArgsError::NoInputs | VisArgsError::OutputCountMismatch { .. } => {
                Self::VisRead(s)
            }
            VisArgsError::Glob(e) => Self::from(e),
            VisArgsError::VisRead(e) => Self::from(e),
            VisArgsError::VisWrite(e) => Self::from(e),
        }
    }
}

impl From<SunArgsError> for SunflagError {
    fn from(e: SunArgsError) -> Self {
        Self::Solar(e.to_string())
    }
}

impl From<FlagArgsError> for SunflagError {
    fn from(e: FlagArgsError) -> Self {
        let s = e.to_string();
        match e {
            FlagArgsError::ParsePol(_) => Self::VisRead(s),
            FlagArgsError::ParseMode(_)
            | FlagArgsError::ParseThresholdMode(_)
            | FlagArgsError::ZeroImsize
            | FlagArgsError::BadCell(_)
            | FlagArgsError::BadThreshold(_)
            | FlagArgsError::BadUvRange { .. }
            | FlagArgsError::BadWedge { .. } => Self::Flag(s),
        }
    }
}

impl From<FlagRunError> for SunflagError {
    fn from(e: FlagRunError) -> Self {
        match e {
            FlagRunError::VisRead(e) => Self::from(e),
            FlagRunError::VisWrite(e) => Self::from(e),
            FlagRunError::Vis(e) => Self::from(e),
            FlagRunError::Flag(e) => Self::from(e),
            FlagRunError::Solar(e) => Self::from(e),
            FlagRunError::Plot(e) => Self::from(e),
        }
    }
}

impl From<SolarRunError> for SunflagError {
    fn from(e: SolarRunError) -> Self {
        match e {
            SolarRunError::VisRead(e) => Self::from(e),
            SolarRunError::VisWrite(e) => Self::from(e),
            SolarRunError::Solar(e) => Self::from(e),
        }
    }
}

// Library code errors.

impl From<FlagError> for SunflagError {
    fn from(e: FlagError) -> Self {
        Self::Flag(e.to_string())
    }
}

impl From<SolarError> for SunflagError {
    fn from(e: SolarError) -> Self {
        Self::Solar(e.to_string())
    }
}

impl From<VisError> for SunflagError {
    fn from(e: VisError) -> Self {
        let s = e.to_string();
        match e {
            VisError::IO(_) => Self::Generic(s),
            _ => Self::VisRead(s),
        }
    }
}

impl From<VisReadError> for SunflagError {
    fn from(e: VisReadError) -> Self {
        let s = e.to_string();
        match e {
            VisReadError::Glob(e) => Self::from(e),
            VisReadError::UnsupportedType { .. } | VisReadError::Json(_) => Self::VisRead(s),
        }
    }
}

impl From<VisWriteError> for SunflagError {
    fn from(e: VisWriteError) -> Self {
        Self::VisWrite(e.to_string())
    }
}

impl From<PlotError> for SunflagError {
    fn from(e: PlotError) -> Self {
        let s = e.to_string();
        match e {
            PlotError::IO(_) => Self::Generic(s),
            _ => Self::Plot(s),
        }
    }
}

impl From<GlobError> for SunflagError {
    fn from(e: GlobError) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<std::io::Error> for SunflagError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
