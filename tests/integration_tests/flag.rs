// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use indoc::formatdoc;
use tempfile::TempDir;

use crate::{get_cmd_output, read_row_flags, sunflag, write_table, MIDNIGHT_MJD_S};

#[test]
fn test_flag_writes_outputs() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let data = write_table(tmp_dir.path(), "vis.json", 5, 3, MIDNIGHT_MJD_S);
    let output = tmp_dir.path().join("flagged.json");

    #[rustfmt::skip]
    let cmd = sunflag()
        .args([
            "flag",
            "--data", &format!("{}", data.display()),
            "--outputs", &format!("{}", output.display()),
            "--cell", "805.7",
            "--threshmode", "fixed",
            "--threshold", "10",
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "flag failed on simple test data: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("sunflag flag complete."), "{stdout}");

    assert_eq!(read_row_flags(&output), vec![false, false, false, true, false]);
    assert!(read_row_flags(&data).iter().all(|&f| !f));
}

#[test]
fn test_flag_dry_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let data = write_table(tmp_dir.path(), "vis.json", 5, 3, MIDNIGHT_MJD_S);
    let output = tmp_dir.path().join("flagged.json");

    #[rustfmt::skip]
    let cmd = sunflag()
        .args([
            "flag",
            "--data", &format!("{}", data.display()),
            "--outputs", &format!("{}", output.display()),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "dry run failed: {}", cmd.err().unwrap());
    assert!(!output.exists());
}

#[test]
fn test_flag_arg_file_and_save_toml() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let data = write_table(tmp_dir.path(), "vis.json", 5, 1, MIDNIGHT_MJD_S);
    let output = tmp_dir.path().join("flagged.json");
    let args_file = tmp_dir.path().join("args.toml");
    let saved = tmp_dir.path().join("saved.toml");
    let mut f = std::fs::File::create(&args_file).unwrap();
    let contents = formatdoc! {r#"
        [data]
        files = ["{}"]
        outputs = ["{}"]

        [flag]
        cell = 805.7
        threshmode = "fixed"
        threshold = 10.0
    "#, data.display(), output.display()};
    f.write_all(contents.as_bytes()).unwrap();
    drop(f);

    #[rustfmt::skip]
    let cmd = sunflag()
        .args([
            "flag",
            &format!("{}", args_file.display()),
            "--save-toml", &format!("{}", saved.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "flag failed with an arguments file: {}", cmd.err().unwrap());
    assert_eq!(read_row_flags(&output), vec![false, true, false, false, false]);

    // The saved arguments reproduce the run.
    let saved_str = std::fs::read_to_string(&saved).unwrap();
    assert!(saved_str.contains("threshmode = \"fixed\""), "{saved_str}");
    std::fs::remove_file(&output).unwrap();
    let cmd = sunflag()
        .args(["flag", &format!("{}", saved.display())])
        .ok();
    assert!(cmd.is_ok(), "flag failed with saved arguments: {}", cmd.err().unwrap());
    assert_eq!(read_row_flags(&output), vec![false, true, false, false, false]);
}

#[test]
fn test_flag_bad_mode_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let data = write_table(tmp_dir.path(), "vis.json", 5, 3, MIDNIGHT_MJD_S);

    #[rustfmt::skip]
    let cmd = sunflag()
        .args([
            "flag",
            "--data", &format!("{}", data.display()),
            "--mode", "tile",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Unrecognised grouping mode 'tile'"), "{stderr}");
    // Nothing was written.
    assert!(read_row_flags(&data).iter().all(|&f| !f));
}

#[test]
fn test_flag_missing_input_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let missing = tmp_dir.path().join("missing.json");

    let cmd = sunflag()
        .args(["flag", "--data", &format!("{}", missing.display())])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: "), "{stderr}");
}
