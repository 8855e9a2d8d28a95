// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Functions to glob files.

use std::path::{Path, PathBuf};

use glob::glob;
use thiserror::Error;
use vec1::Vec1;

/// Given a glob pattern, get all of the matches from the filesystem.
pub(crate) fn get_all_matches_from_glob(g: &str) -> Result<Vec<PathBuf>, GlobError> {
    let mut entries = vec![];
    for entry in glob(g)? {
        match entry {
            Ok(e) => entries.push(e),
            Err(e) => return Err(GlobError::GlobCrate(e)),
        }
    }
    Ok(entries)
}

/// Turn user-supplied paths into files. A string that names an existing file
/// is used as is; otherwise it is treated as a glob, and its matches are used
/// in sorted order. Duplicates are removed, preserving the first occurrence.
pub(crate) fn expand_input_paths(inputs: &[String]) -> Result<Vec1<PathBuf>, GlobError> {
    let mut files: Vec<PathBuf> = vec![];
    for input in inputs {
        let path = Path::new(input);
        let matches = if path.exists() {
            vec![path.to_path_buf()]
        } else {
            let mut matches = get_all_matches_from_glob(input)?;
            if matches.is_empty() {
                return Err(GlobError::NoMatches {
                    glob: input.clone(),
                });
            }
            matches.sort();
            matches
        };
        for m in matches {
            if !files.contains(&m) {
                files.push(m);
            }
        }
    }
    Vec1::try_from_vec(files).map_err(|_| GlobError::NoInputs)
}

#[derive(Error, Debug)]
/// Error type associated with glob helper functions.
pub enum GlobError {
    #[error("'{glob}' isn't a file, and no glob matches were found for it")]
    NoMatches { glob: String },

    #[error("No input files were supplied")]
    NoInputs,

    #[error(transparent)]
    GlobCrate(#[from] glob::GlobError),

    #[error(transparent)]
    PatternError(#[from] glob::PatternError),
}
