// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use super::GlobError;

#[derive(Error, Debug)]
pub enum JsonVisError {
    #[error("'{file}' has no rows")]
    NoRows { file: String },

    #[error("'{file}' has no frequencies")]
    NoFrequencies { file: String },

    #[error("Row {row} of '{file}' has {got} {what}, but {expected} were expected")]
    BadRowShape {
        file: String,
        row: usize,
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("'{file}' isn't a visibility table: {reason}")]
    NotATable { file: String, reason: &'static str },

    #[error("Couldn't parse '{file}': {err}")]
    Parse {
        file: String,
        err: serde_json::Error,
    },

    #[error("Couldn't write '{file}': {err}")]
    Serialise {
        file: String,
        err: serde_json::Error,
    },

    #[error("IO error for '{file}': {err}")]
    IO { file: String, err: std::io::Error },
}

#[derive(Error, Debug)]
pub enum VisReadError {
    #[error("Can't read '{file}'; only visibility tables with these extensions are supported: {supported}")]
    UnsupportedType { file: String, supported: String },

    #[error(transparent)]
    Glob(#[from] GlobError),

    #[error(transparent)]
    Json(#[from] JsonVisError),
}

#[derive(Error, Debug)]
pub enum VisWriteError {
    #[error("Can't write '{file}'; only visibility tables with these extensions are supported: {supported}")]
    UnsupportedType { file: String, supported: String },

    #[error("'{file}' has {got} rows, but {expected} flags were supplied")]
    RowCountMismatch {
        file: String,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Json(#[from] JsonVisError),
}
