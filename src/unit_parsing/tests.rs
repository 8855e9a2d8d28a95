// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::*;

use approx::assert_abs_diff_eq;

#[test]
fn test_parse_time_str_without_units() {
    let result = parse_time("1");
    assert!(result.is_ok(), "{:?}", result.unwrap_err());
    let pair = result.unwrap();
    assert_abs_diff_eq!(pair.0, 1.0);
    assert_eq!(pair.1, TimeFormat::NoUnit);

    let result = parse_time(" 1.0 ");
    assert!(result.is_ok(), "{:?}", result.unwrap_err());
    let pair = result.unwrap();
    assert_abs_diff_eq!(pair.0, 1.0);
    assert_eq!(pair.1, TimeFormat::NoUnit);
}

#[test]
fn test_parse_time_str_with_units() {
    // Iterate over all possible units.
    for time_format in TimeFormat::iter().filter(|&tf| tf != TimeFormat::NoUnit) {
        let time_format_str: &'static str = time_format.into();
        for time_format_str in [
            time_format_str.to_lowercase(),
            time_format_str.to_uppercase(),
        ] {
            let result = parse_time(&format!("1{}", time_format_str));
            assert!(result.is_ok(), "{:?}", result.unwrap_err());
            let pair = result.unwrap();
            assert_abs_diff_eq!(pair.0, 1.0);
            assert_eq!(pair.1, time_format);

            let result = parse_time(&format!(" 1.5 {} ", time_format_str));
            assert!(result.is_ok(), "{:?}", result.unwrap_err());
            let pair = result.unwrap();
            assert_abs_diff_eq!(pair.0, 1.5);
            assert_eq!(pair.1, time_format);
        }
    }
}

#[test]
fn test_parse_time_errors() {
    let result = parse_time("1.0.0s");
    assert!(matches!(
        result,
        Err(UnitParseError::GotTimeUnitButCantParse { .. })
    ));

    let result = parse_time("1fortnight");
    assert!(matches!(result, Err(UnitParseError::Unknown { .. })));
}

#[test]
fn test_parse_duration() {
    assert_abs_diff_eq!(parse_duration("30min").unwrap().to_seconds(), 1800.0);
    assert_abs_diff_eq!(parse_duration("1h").unwrap().to_seconds(), 3600.0);
    assert_abs_diff_eq!(parse_duration("0.5d").unwrap().to_seconds(), 43200.0);
    assert_abs_diff_eq!(
        parse_duration("250ms").unwrap().to_seconds(),
        0.25,
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(parse_duration("60").unwrap().to_seconds(), 60.0);
    assert_abs_diff_eq!(parse_duration("0").unwrap().to_seconds(), 0.0);
}

#[test]
fn test_parse_angle() {
    let (number, format) = parse_angle("-34arcmin").unwrap();
    assert_abs_diff_eq!(number, -34.0);
    assert_eq!(format, AngleFormat::Arcmin);

    let (number, format) = parse_angle("-0.5 DEG").unwrap();
    assert_abs_diff_eq!(number, -0.5);
    assert_eq!(format, AngleFormat::Deg);

    let (number, format) = parse_angle("12").unwrap();
    assert_abs_diff_eq!(number, 12.0);
    assert_eq!(format, AngleFormat::NoUnit);

    assert!(matches!(
        parse_angle("-3-4arcmin"),
        Err(UnitParseError::GotAngleUnitButCantParse { .. })
    ));
    assert!(matches!(
        parse_angle("5parsecs"),
        Err(UnitParseError::Unknown { .. })
    ));
}

#[test]
fn test_parse_angle_deg() {
    assert_abs_diff_eq!(parse_angle_deg("-34arcmin").unwrap(), -34.0 / 60.0);
    assert_abs_diff_eq!(parse_angle_deg("-34").unwrap(), -34.0 / 60.0);
    assert_abs_diff_eq!(parse_angle_deg("36arcsec").unwrap(), 0.01);
    assert_abs_diff_eq!(parse_angle_deg("-0.5deg").unwrap(), -0.5);
    assert_abs_diff_eq!(
        parse_angle_deg("1rad").unwrap(),
        57.29577951308232,
        epsilon = 1e-12
    );
}
