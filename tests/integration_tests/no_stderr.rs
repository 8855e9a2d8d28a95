// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{get_cmd_output, sunflag, write_table, MIDNIGHT_MJD_S};

#[test]
fn test_flag_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let data = write_table(tmp_dir.path(), "vis.json", 5, 3, MIDNIGHT_MJD_S);
    let output = tmp_dir.path().join("out.json");

    #[rustfmt::skip]
    let cmd = sunflag()
        .args([
            "flag",
            "--data", &format!("{}", data.display()),
            "--outputs", &format!("{}", output.display()),
            "--mode", "antenna",
            "--radrange", "3",
            "--angle", "10",
        ])
        .ok();
    assert!(cmd.is_ok(), "flag failed on simple test data: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_solar_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let data = write_table(tmp_dir.path(), "vis.json", 5, 3, MIDNIGHT_MJD_S);
    let output = tmp_dir.path().join("out.json");

    #[rustfmt::skip]
    let cmd = sunflag()
        .args([
            "solar",
            "--data", &format!("{}", data.display()),
            "--outputs", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "solar failed on simple test data: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_help_no_stderr() {
    let cmd = sunflag().args(["flag", "--help"]).ok();
    assert!(cmd.is_ok());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stdout.contains("--threshmode"), "{stdout}");
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
