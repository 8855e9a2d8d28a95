// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! File stuff (input/output, reading/writing, globs), for visibility tables.

mod error;
mod glob;
mod json;
#[cfg(test)]
mod tests;

pub use error::{JsonVisError, VisReadError, VisWriteError};
pub(crate) use glob::expand_input_paths;
pub use glob::GlobError;
pub use json::write_json_vis;

use std::path::{Path, PathBuf};

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use json::{JsonFlagWriter, JsonVisReader};
use crate::vis::RawVis;

/// The kinds of visibility tables that can be read and flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
pub(crate) enum VisInputType {
    #[strum(serialize = "json")]
    Json,
}

impl VisInputType {
    fn from_path(file: &Path) -> Option<VisInputType> {
        file.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.to_lowercase().parse().ok())
    }

    fn supported() -> String {
        VisInputType::iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub(crate) trait VisRead: Sync + Send {
    /// The file being read.
    fn get_path(&self) -> &Path;

    /// Read the whole visibility table.
    fn read(&self) -> Result<RawVis, VisReadError>;
}

pub(crate) trait FlagWrite: Sync + Send {
    /// The file being written.
    fn get_path(&self) -> &Path;

    /// Flag every channel and correlation product of each row that is `true`
    /// in `row_flags`. Existing flags are kept. Returns the number of rows
    /// that were flagged.
    fn write_row_flags(&self, row_flags: &[bool]) -> Result<usize, VisWriteError>;
}

pub(crate) fn get_vis_reader(file: PathBuf) -> Result<Box<dyn VisRead>, VisReadError> {
    match VisInputType::from_path(&file) {
        Some(VisInputType::Json) => Ok(Box::new(JsonVisReader::new(file))),
        None => Err(VisReadError::UnsupportedType {
            file: file.display().to_string(),
            supported: VisInputType::supported(),
        }),
    }
}

/// Get a writer for `output`; if `output` doesn't exist, it is made from
/// `input` during the write.
pub(crate) fn get_flag_writer(
    input: PathBuf,
    output: PathBuf,
) -> Result<Box<dyn FlagWrite>, VisWriteError> {
    match VisInputType::from_path(&output) {
        Some(VisInputType::Json) => Ok(Box::new(JsonFlagWriter::new(input, output))),
        None => Err(VisWriteError::UnsupportedType {
            file: output.display().to_string(),
            supported: VisInputType::supported(),
        }),
    }
}
