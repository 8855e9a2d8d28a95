// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use crate::{read_row_flags, sunflag, write_table, MIDNIGHT_MJD_S};

#[test]
fn test_solar_flags_the_day() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    // Midday at longitude 0.
    let day = write_table(tmp_dir.path(), "day.json", 4, 0, MIDNIGHT_MJD_S + 43200.0);
    let night = write_table(tmp_dir.path(), "night.json", 4, 0, MIDNIGHT_MJD_S);

    #[rustfmt::skip]
    let cmd = sunflag()
        .args([
            "solar",
            "--data", &format!("{}", day.display()), &format!("{}", night.display()),
            "--nononsoleil",
        ])
        .ok();
    assert!(cmd.is_ok(), "solar failed on simple test data: {}", cmd.err().unwrap());

    assert_eq!(read_row_flags(&day), vec![true; 4]);
    assert_eq!(read_row_flags(&night), vec![false; 4]);
}

#[test]
fn test_solar_invert_flags_the_night() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let night = write_table(tmp_dir.path(), "night.json", 4, 0, MIDNIGHT_MJD_S);
    let output = tmp_dir.path().join("out.json");

    #[rustfmt::skip]
    let cmd = sunflag()
        .args([
            "solar",
            "--data", &format!("{}", night.display()),
            "--outputs", &format!("{}", output.display()),
            "--nononsoleil",
            "--invert",
            "--array-position", "0", "0", "0",
        ])
        .ok();
    assert!(cmd.is_ok(), "solar failed on simple test data: {}", cmd.err().unwrap());
    assert_eq!(read_row_flags(&output), vec![true; 4]);
}

#[test]
fn test_solar_rejects_bad_horizon() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let night = write_table(tmp_dir.path(), "night.json", 4, 0, MIDNIGHT_MJD_S);

    #[rustfmt::skip]
    let cmd = sunflag()
        .args([
            "solar",
            "--data", &format!("{}", night.display()),
            "--horizon", "100deg",
        ])
        .ok();
    assert!(cmd.is_err());
}
