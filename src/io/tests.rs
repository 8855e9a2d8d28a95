// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use approx::assert_abs_diff_eq;
use indoc::indoc;
use serde_json::Value;
use tempfile::TempDir;

use super::*;

const TABLE: &str = indoc! {r#"
    {
        "name": "two rows",
        "frequencies_hz": [1.0e8, 2.0e8],
        "antenna_names": ["A", "B"],
        "antenna_positions": [[-2559454.0, 5095372.0, -2849057.0], [-2559444.0, 5095381.0, -2849061.0]],
        "rows": [
            {
                "time": 5131728000.0,
                "interval": 10.0,
                "uvw": [100.0, -50.0, 1.0],
                "antenna1": 0,
                "antenna2": 1,
                "data": [[[1.0, 0.0], [2.0, 1.0]], [[3.0, 0.0], [4.0, -1.0]]],
                "flags": [[false, true], [false, false]]
            },
            {
                "time": 5131728010.0,
                "interval": 10.0,
                "uvw": [101.0, -49.0, 1.0],
                "antenna1": 0,
                "antenna2": 1,
                "field": 2,
                "data": [[[5.0, 0.0], [6.0, 0.0]], [[7.0, 0.0], [8.0, 0.0]]]
            }
        ]
    }
"#};

fn write_table(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_read_json_table() {
    let dir = TempDir::new().unwrap();
    let path = write_table(&dir, "vis.json", TABLE);
    let reader = get_vis_reader(path.clone()).unwrap();
    assert_eq!(reader.get_path(), path.as_path());
    let raw = reader.read().unwrap();

    assert_eq!(raw.num_rows(), 2);
    assert_eq!(raw.data.dim(), (2, 2, 2));
    assert_eq!(raw.freqs_hz, vec![1.0e8, 2.0e8]);
    assert_eq!(raw.antenna_names, vec!["A", "B"]);
    assert_eq!(raw.antenna_pairs, vec![(0, 1), (0, 1)]);
    assert_eq!(raw.fields, vec![0, 2]);
    assert_abs_diff_eq!(raw.data[(0, 0, 1)].im, 1.0);
    assert_abs_diff_eq!(raw.data[(1, 1, 1)].re, 8.0);
    assert!(raw.flags[(0, 0, 1)]);
    assert!(!raw.flags[(0, 1, 1)]);
    // Omitted flags mean unflagged.
    assert!(raw.flags.slice(ndarray::s![1, .., ..]).iter().all(|&f| !f));
    assert_abs_diff_eq!(raw.uvws_m[1].u, 101.0);
    assert_abs_diff_eq!(
        (raw.times[1] - raw.times[0]).to_seconds(),
        10.0,
        epsilon = 1e-3
    );
    assert_abs_diff_eq!(raw.intervals[0].to_seconds(), 10.0);
}

#[test]
fn test_read_rejects_bad_shapes() {
    let dir = TempDir::new().unwrap();
    let bad = TABLE.replace(
        r#""data": [[[5.0, 0.0], [6.0, 0.0]], [[7.0, 0.0], [8.0, 0.0]]]"#,
        r#""data": [[[5.0, 0.0], [6.0, 0.0]]]"#,
    );
    let path = write_table(&dir, "bad.json", &bad);
    let result = get_vis_reader(path).unwrap().read();
    assert!(matches!(
        result,
        Err(VisReadError::Json(JsonVisError::BadRowShape {
            row: 1,
            expected: 2,
            got: 1,
            ..
        }))
    ));

    let path = write_table(
        &dir,
        "empty.json",
        r#"{"frequencies_hz": [1.0e8], "rows": []}"#,
    );
    let result = get_vis_reader(path).unwrap().read();
    assert!(matches!(
        result,
        Err(VisReadError::Json(JsonVisError::NoRows { .. }))
    ));

    let path = write_table(&dir, "garbage.json", "not json");
    let result = get_vis_reader(path).unwrap().read();
    assert!(matches!(
        result,
        Err(VisReadError::Json(JsonVisError::Parse { .. }))
    ));
}

#[test]
fn test_unsupported_extension() {
    let result = get_vis_reader(PathBuf::from("vis.ms"));
    assert!(matches!(result, Err(VisReadError::UnsupportedType { .. })));
    let result = get_flag_writer(PathBuf::from("vis.json"), PathBuf::from("vis.uvfits"));
    assert!(matches!(result, Err(VisWriteError::UnsupportedType { .. })));
}

#[test]
fn test_write_flags_to_new_output() {
    let dir = TempDir::new().unwrap();
    let input = write_table(&dir, "in.json", TABLE);
    let output = dir.path().join("out.json");
    let writer = get_flag_writer(input.clone(), output.clone()).unwrap();
    let num_flagged = writer.write_row_flags(&[false, true]).unwrap();
    assert_eq!(num_flagged, 1);

    // The input is untouched.
    let input_raw = get_vis_reader(input).unwrap().read().unwrap();
    assert!(input_raw
        .flags
        .slice(ndarray::s![1, .., ..])
        .iter()
        .all(|&f| !f));

    let output_raw = get_vis_reader(output.clone()).unwrap().read().unwrap();
    assert!(output_raw
        .flags
        .slice(ndarray::s![1, .., ..])
        .iter()
        .all(|&f| f));
    // Existing flags survive, and nothing new is flagged in row 0.
    assert!(output_raw.flags[(0, 0, 1)]);
    assert!(!output_raw.flags[(0, 0, 0)]);

    // Other keys are preserved.
    let value: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(value["name"], "two rows");
}

#[test]
fn test_write_flags_never_clears() {
    let dir = TempDir::new().unwrap();
    let path = write_table(&dir, "vis.json", TABLE);
    let writer = get_flag_writer(path.clone(), path.clone()).unwrap();
    assert_eq!(writer.write_row_flags(&[true, false]).unwrap(), 1);
    assert_eq!(writer.write_row_flags(&[false, false]).unwrap(), 0);

    let raw = get_vis_reader(path).unwrap().read().unwrap();
    assert!(raw.flags.slice(ndarray::s![0, .., ..]).iter().all(|&f| f));
    assert!(raw.flags.slice(ndarray::s![1, .., ..]).iter().all(|&f| !f));
}

#[test]
fn test_write_flags_checks_row_count() {
    let dir = TempDir::new().unwrap();
    let path = write_table(&dir, "vis.json", TABLE);
    let writer = get_flag_writer(path.clone(), path).unwrap();
    let result = writer.write_row_flags(&[true]);
    assert!(matches!(
        result,
        Err(VisWriteError::RowCountMismatch {
            expected: 1,
            got: 2,
            ..
        })
    ));
}

#[test]
fn test_write_json_vis() {
    let dir = TempDir::new().unwrap();
    let input = write_table(&dir, "in.json", TABLE);
    let raw = get_vis_reader(input).unwrap().read().unwrap();
    let output = dir.path().join("copy.json");
    write_json_vis(&output, &raw).unwrap();
    let copy = get_vis_reader(output).unwrap().read().unwrap();

    assert_eq!(copy.antenna_positions, raw.antenna_positions);
    assert_eq!(copy.flags, raw.flags);
    assert_eq!(copy.fields, raw.fields);
    assert_abs_diff_eq!(
        (copy.times[0] - raw.times[0]).to_seconds(),
        0.0,
        epsilon = 1e-3
    );
}
