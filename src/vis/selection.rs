// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Selecting which visibilities are used to derive statistics.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use super::VisError;

/// Which visibilities are used. Auto-correlations are never used.
#[derive(Debug, Clone, Default)]
pub struct VisSelection {
    /// Only use these fields. All fields are used if this is `None`.
    pub fields: Option<Vec<usize>>,

    /// Only use channels that are `true`. All channels are used if this is
    /// `None`.
    pub channels: Option<Vec<bool>>,

    /// Only use these baselines (either antenna order). All baselines are used
    /// if this is `None`.
    pub baselines: Option<Vec<(usize, usize)>>,
}

impl VisSelection {
    pub(crate) fn uses_row(&self, (ant1, ant2): (usize, usize), field: usize) -> bool {
        if ant1 == ant2 {
            return false;
        }
        if let Some(fields) = self.fields.as_ref() {
            if !fields.contains(&field) {
                return false;
            }
        }
        if let Some(baselines) = self.baselines.as_ref() {
            if !baselines
                .iter()
                .any(|&(a, b)| (a == ant1 && b == ant2) || (a == ant2 && b == ant1))
            {
                return false;
            }
        }
        true
    }
}

/// Yield the non-empty lines of a text file with comments (starting with
/// '#') removed, along with their line numbers.
fn content_lines(file: &Path) -> Result<Vec<(usize, String)>, VisError> {
    let reader = BufReader::new(File::open(file)?);
    let mut lines = vec![];
    for (i_line, line) in reader.lines().enumerate() {
        let line = line?;
        let content = line.split('#').next().unwrap_or("").trim();
        if !content.is_empty() {
            lines.push((i_line + 1, content.to_string()));
        }
    }
    Ok(lines)
}

/// Read a channel selection; each channel has a boolean ("true", "false", "1"
/// or "0"). Booleans may be separated by whitespace, commas or new lines.
pub(crate) fn read_channels_file(file: &Path) -> Result<Vec<bool>, VisError> {
    let mut channels = vec![];
    for (line_num, line) in content_lines(file)? {
        for token in line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            let b = match token.to_lowercase().as_str() {
                "true" | "t" | "1" => true,
                "false" | "f" | "0" => false,
                _ => {
                    return Err(VisError::BadSelectionFile {
                        file: file.display().to_string(),
                        line_num,
                        line: line.clone(),
                    })
                }
            };
            channels.push(b);
        }
    }
    Ok(channels)
}

/// Read a baseline selection; each line has a pair of antenna indices.
pub(crate) fn read_baselines_file(file: &Path) -> Result<Vec<(usize, usize)>, VisError> {
    let mut baselines = vec![];
    for (line_num, line) in content_lines(file)? {
        let tokens: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .collect();
        let pair = match tokens.as_slice() {
            [a, b] => a.parse().ok().zip(b.parse().ok()),
            _ => None,
        };
        match pair {
            Some(p) => baselines.push(p),
            None => {
                return Err(VisError::BadSelectionFile {
                    file: file.display().to_string(),
                    line_num,
                    line,
                })
            }
        }
    }
    Ok(baselines)
}
