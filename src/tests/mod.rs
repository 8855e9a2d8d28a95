// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helpers for tests that need visibility tables on disk.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

/// 2000-01-01 00:00:00 UTC [MJD seconds]; midnight at (0°, 0°).
pub(crate) const MIDNIGHT_MJD_S: f64 = 51544.0 * 86400.0;

/// A table of `num_rows` rows of a single baseline; the row `bright` is much
/// brighter than the others. The antennas are on the equator at longitude 0.
pub(crate) fn make_table(num_rows: usize, bright: usize) -> Value {
    let rows: Vec<Value> = (0..num_rows)
        .map(|i| {
            let amp = if i == bright { 100.0 } else { 1.0 };
            json!({
                "time": MIDNIGHT_MJD_S + 10.0 * i as f64,
                "interval": 10.0,
                "uvw": [10.0 * (i + 1) as f64, 5.0, 0.0],
                "antenna1": 0,
                "antenna2": 1,
                "data": [[[amp, 0.0], [amp, 0.0]]],
            })
        })
        .collect();
    json!({
        "frequencies_hz": [1.5e8],
        "antenna_names": ["A", "B"],
        "antenna_positions": [[6378137.0, 0.0, 0.0], [6378137.0, 10.0, 0.0]],
        "rows": rows,
    })
}

pub(crate) fn write_table(dir: &Path, name: &str, table: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(table).unwrap()).unwrap();
    path
}

/// Per row, whether every channel and correlation product is flagged.
pub(crate) fn read_row_flags(path: &Path) -> Vec<bool> {
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
