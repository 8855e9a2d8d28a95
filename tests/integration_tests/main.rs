// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod flag;
mod no_stderr;
mod solar;

use std::{
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};
use serde_json::{json, Value};

fn sunflag() -> Command {
    Command::cargo_bin("sunflag").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// 2000-01-01 00:00:00 UTC [MJD seconds].
const MIDNIGHT_MJD_S: f64 = 51544.0 * 86400.0;

/// Write a table of `num_rows` rows of one baseline, starting at `start` [MJD
/// seconds] with 10 s between rows. The row `bright` is 100 times brighter
/// than the others, and each row sits in its own grid cell when cells are 1
/// wavelength wide.
fn write_table(dir: &Path, name: &str, num_rows: usize, bright: usize, start: f64) -> PathBuf {
    let rows: Vec<Value> = (0..num_rows)
        .map(|i| {
            let amp = if i == bright { 100.0 } else { 1.0 };
            json!({
                "time": start + 10.0 * i as f64,
                "interval": 10.0,
                "uvw": [10.0 * (i + 1) as f64, 5.0, 0.0],
                "antenna1": 0,
                "antenna2": 1,
                "data": [[[amp, 0.0], [amp, 0.0]]],
            })
        })
        .collect();
    let table = json!({
        "frequencies_hz": [1.5e8],
        "antenna_names": ["A", "B"],
        // On the equator at longitude 0.
        "antenna_positions": [[6378137.0, 0.0, 0.0], [6378137.0, 10.0, 0.0]],
        "rows": rows,
    });
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(&table).unwrap()).unwrap();
    path
}

/// Per row, whether every channel and correlation product is flagged.
fn read_row_flags(path: &Path) -> Vec<bool> {
    let table: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    table["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| match row["flags"].as_array() {
            Some(chans) => chans.iter().all(|chan| {
                chan.as_array()
                    .unwrap()
                    .iter()
                    .all(|f| f.as_bool().unwrap())
            }),
            None => false,
        })
        .collect()
}
