// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Visibility tables as JSON.
//!
//! A table looks like
//!
//! ```json
//! {
//!   "name": "optional",
//!   "frequencies_hz": [1.0e8, 1.1e8],
//!   "antenna_names": ["A", "B"],
//!   "antenna_positions": [[x, y, z], [x, y, z]],
//!   "rows": [
//!     {
//!       "time": 5.1e9,
//!       "interval": 10.0,
//!       "uvw": [u, v, w],
//!       "antenna1": 0,
//!       "antenna2": 1,
//!       "field": 0,
//!       "data": [[[re, im], [re, im]], [[re, im], [re, im]]],
//!       "flags": [[false, false], [false, true]]
//!     }
//!   ]
//! }
//! ```
//!
//! Times are MJD seconds (UTC), intervals seconds, UVWs metres and antenna
//! positions geocentric metres. `data` and `flags` are indexed by channel,
//! then by correlation product. `flags` may be omitted. When flags are
//! written, everything else in the file is preserved.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use hifitime::{Duration, Epoch};
use log::debug;
use marlu::{c64, UVW};
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{FlagWrite, JsonVisError, VisRead, VisReadError, VisWriteError};
use crate::{constants::SECONDS_PER_DAY, vis::RawVis};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct JsonVisTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,

    pub(crate) frequencies_hz: Vec<f64>,

    #[serde(default)]
    pub(crate) antenna_names: Vec<String>,

    #[serde(default)]
    pub(crate) antenna_positions: Vec<[f64; 3]>,

    pub(crate) rows: Vec<JsonVisRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct JsonVisRow {
    pub(crate) time: f64,
    pub(crate) interval: f64,
    pub(crate) uvw: [f64; 3],
    pub(crate) antenna1: usize,
    pub(crate) antenna2: usize,

    #[serde(default)]
    pub(crate) field: usize,

    pub(crate) data: Vec<Vec<[f64; 2]>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) flags: Vec<Vec<bool>>,
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, JsonVisError> {
    let file = File::open(path).map_err(|err| JsonVisError::IO {
        file: display(path),
        err,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|err| JsonVisError::Parse {
        file: display(path),
        err,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), JsonVisError> {
    let file = File::create(path).map_err(|err| JsonVisError::IO {
        file: display(path),
        err,
    })?;
    serde_json::to_writer(BufWriter::new(file), value).map_err(|err| JsonVisError::Serialise {
        file: display(path),
        err,
    })
}

impl JsonVisTable {
    fn into_raw_vis(self, file: &Path) -> Result<RawVis, JsonVisError> {
        let num_chans = self.frequencies_hz.len();
        if num_chans == 0 {
            return Err(JsonVisError::NoFrequencies {
                file: display(file),
            });
        }
        let num_pols = match self.rows.first() {
            Some(row) => row.data.first().map(|c| c.len()).unwrap_or(0),
            None => {
                return Err(JsonVisError::NoRows {
                    file: display(file),
                })
            }
        };
        let num_rows = self.rows.len();

        let bad_shape = |row, what, expected, got| JsonVisError::BadRowShape {
            file: display(file),
            row,
            what,
            expected,
            got,
        };

        let mut data = Array3::zeros((num_rows, num_chans, num_pols));
        let mut flags = Array3::from_elem((num_rows, num_chans, num_pols), false);
        let mut times = Vec::with_capacity(num_rows);
        let mut intervals = Vec::with_capacity(num_rows);
        let mut uvws_m = Vec::with_capacity(num_rows);
        let mut antenna_pairs = Vec::with_capacity(num_rows);
        let mut fields = Vec::with_capacity(num_rows);
        for (i_row, row) in self.rows.into_iter().enumerate() {
            if row.data.len() != num_chans {
                return Err(bad_shape(i_row, "data channels", num_chans, row.data.len()));
            }
            for (i_chan, chan) in row.data.iter().enumerate() {
                if chan.len() != num_pols {
                    return Err(bad_shape(i_row, "correlation products", num_pols, chan.len()));
                }
                for (i_pol, &[re, im]) in chan.iter().enumerate() {
                    data[(i_row, i_chan, i_pol)] = c64::new(re, im);
                }
            }
            if !row.flags.is_empty() {
                if row.flags.len() != num_chans {
                    return Err(bad_shape(i_row, "flag channels", num_chans, row.flags.len()));
                }
                for (i_chan, chan) in row.flags.iter().enumerate() {
                    if chan.len() != num_pols {
                        return Err(bad_shape(i_row, "flag products", num_pols, chan.len()));
                    }
                    for (i_pol, &f) in chan.iter().enumerate() {
                        flags[(i_row, i_chan, i_pol)] = f;
                    }
                }
            }

            times.push(Epoch::from_mjd_utc(row.time / SECONDS_PER_DAY));
            intervals.push(Duration::from_seconds(row.interval));
            let [u, v, w] = row.uvw;
            uvws_m.push(UVW { u, v, w });
            antenna_pairs.push((row.antenna1, row.antenna2));
            fields.push(row.field);
        }

        Ok(RawVis {
            times,
            intervals,
            uvws_m,
            antenna_pairs,
            fields,
            data,
            flags,
            freqs_hz: self.frequencies_hz,
            antenna_names: self.antenna_names,
            antenna_positions: self.antenna_positions,
        })
    }

    pub(crate) fn from_raw_vis(raw: &RawVis) -> JsonVisTable {
        let rows = (0..raw.num_rows())
            .map(|i_row| {
                let data = raw.data.slice(s![i_row, .., ..]);
                let flags = raw.flags.slice(s![i_row, .., ..]);
                let uvw = raw.uvws_m[i_row];
                JsonVisRow {
                    time: raw.times[i_row].to_mjd_utc_seconds(),
                    interval: raw.intervals[i_row].to_seconds(),
                    uvw: [uvw.u, uvw.v, uvw.w],
                    antenna1: raw.antenna_pairs[i_row].0,
                    antenna2: raw.antenna_pairs[i_row].1,
                    field: raw.fields[i_row],
                    data: data
                        .outer_iter()
                        .map(|chan| chan.iter().map(|v| [v.re, v.im]).collect())
                        .collect(),
                    flags: flags
                        .outer_iter()
                        .map(|chan| chan.to_vec())
                        .collect(),
                }
            })
            .collect();
        JsonVisTable {
            name: None,
            frequencies_hz: raw.freqs_hz.clone(),
            antenna_names: raw.antenna_names.clone(),
            antenna_positions: raw.antenna_positions.clone(),
            rows,
        }
    }
}

/// Write a visibility table to a JSON file.
pub fn write_json_vis(path: &Path, raw: &RawVis) -> Result<(), JsonVisError> {
    write_json(path, &JsonVisTable::from_raw_vis(raw))
}

pub(crate) struct JsonVisReader {
    path: PathBuf,
}

impl JsonVisReader {
    pub(crate) fn new(path: PathBuf) -> JsonVisReader {
        JsonVisReader { path }
    }
}

impl VisRead for JsonVisReader {
    fn get_path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<RawVis, VisReadError> {
        let table: JsonVisTable = read_json(&self.path)?;
        debug!(
            "'{}' has {} rows and {} channels",
            self.path.display(),
            table.rows.len(),
            table.frequencies_hz.len()
        );
        Ok(table.into_raw_vis(&self.path)?)
    }
}

pub(crate) struct JsonFlagWriter {
    input: PathBuf,
    output: PathBuf,
}

impl JsonFlagWriter {
    /// If `output` doesn't exist, it's made from `input`.
    pub(crate) fn new(input: PathBuf, output: PathBuf) -> JsonFlagWriter {
        JsonFlagWriter { input, output }
    }
}

impl FlagWrite for JsonFlagWriter {
    fn get_path(&self) -> &Path {
        &self.output
    }

    fn write_row_flags(&self, row_flags: &[bool]) -> Result<usize, VisWriteError> {
        let source = if self.output.exists() {
            &self.output
        } else {
            debug!(
                "'{}' doesn't exist; it will be made from '{}'",
                self.output.display(),
                self.input.display()
            );
            &self.input
        };
        let mut table: Value = read_json(source)?;
        let not_a_table = |reason| JsonVisError::NotATable {
            file: display(source),
            reason,
        };

        let rows = table
            .get_mut("rows")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| not_a_table("there is no 'rows' array"))?;
        if rows.len() != row_flags.len() {
            return Err(VisWriteError::RowCountMismatch {
                file: display(source),
                expected: row_flags.len(),
                got: rows.len(),
            });
        }

        let mut num_flagged = 0;
        for (row, _) in rows.iter_mut().zip(row_flags).filter(|(_, &f)| f) {
            let shape: Vec<usize> = row
                .get("data")
                .and_then(Value::as_array)
                .ok_or_else(|| not_a_table("a row has no 'data' array"))?
                .iter()
                .map(|chan| chan.as_array().map(|c| c.len()).unwrap_or(0))
                .collect();
            let flags: Vec<Value> = shape
                .into_iter()
                .map(|num_pols| Value::from(vec![true; num_pols]))
                .collect();
            let row = row
                .as_object_mut()
                .ok_or_else(|| not_a_table("a row isn't an object"))?;
            row.insert("flags".to_string(), Value::from(flags));
            num_flagged += 1;
        }

        write_json(&self.output, &table)?;
        Ok(num_flagged)
    }
}
