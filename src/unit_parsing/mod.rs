// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to parse strings into plain numbers or some quantity with a unit.

mod error;
#[cfg(test)]
mod tests;

pub use error::UnitParseError;

use hifitime::{Duration, Unit};
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, EnumIter, EnumString, IntoStaticStr)]
pub(crate) enum TimeFormat {
    /// Seconds
    S,

    /// Milliseconds
    Ms,

    /// Minutes
    Min,

    /// Hours
    H,

    /// Days
    D,

    NoUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, EnumIter, EnumString, IntoStaticStr)]
pub(crate) enum AngleFormat {
    /// Degrees
    Deg,

    /// Arcminutes
    Arcmin,

    /// Arcseconds
    Arcsec,

    /// Radians
    Rad,

    NoUnit,
}

/// Split a string like "-34arcmin" into its number and its (untrimmed) unit
/// suffix.
fn split_number_and_unit(s: &str) -> (&str, &str) {
    let s = s.trim();
    let suffix = s
        .trim_start_matches(|c: char| c.is_numeric() || c == '.' || c == '-' || c == '+')
        .trim();
    let prefix = s.trim_end_matches(char::is_alphabetic).trim();
    (prefix, suffix)
}

/// Parse a string that may have a unit of time attached to it.
pub(crate) fn parse_time(s: &str) -> Result<(f64, TimeFormat), UnitParseError> {
    // Try to parse a naked number.
    let maybe_number: Option<f64> = s.trim().parse().ok();
    if let Some(number) = maybe_number {
        return Ok((number, TimeFormat::NoUnit));
    };

    // That didn't work; let's search over our supported formats.
    let (prefix, suffix) = split_number_and_unit(s);
    for time_format in TimeFormat::iter().filter(|&tf| tf != TimeFormat::NoUnit) {
        let time_format_str: &'static str = time_format.into();
        if suffix.to_uppercase() == time_format_str.to_uppercase() {
            let number: f64 = match prefix.parse() {
                Ok(n) => n,
                Err(_) => {
                    return Err(UnitParseError::GotTimeUnitButCantParse {
                        input: s.to_string(),
                        unit: time_format_str,
                    })
                }
            };
            return Ok((number, time_format));
        }
    }

    // If we made it this far, we don't know how to parse the string.
    Err(UnitParseError::Unknown {
        input: s.to_string(),
        unit_type: "time",
    })
}

/// Parse a string into a [`Duration`]. Naked numbers are treated as seconds.
pub(crate) fn parse_duration(s: &str) -> Result<Duration, UnitParseError> {
    let (number, format) = parse_time(s)?;
    let unit = match format {
        TimeFormat::S | TimeFormat::NoUnit => Unit::Second,
        TimeFormat::Ms => Unit::Millisecond,
        TimeFormat::Min => Unit::Minute,
        TimeFormat::H => Unit::Hour,
        TimeFormat::D => Unit::Day,
    };
    Ok(Duration::from_f64(number, unit))
}

/// Parse a string that may have a unit of angle attached to it.
pub(crate) fn parse_angle(s: &str) -> Result<(f64, AngleFormat), UnitParseError> {
    let maybe_number: Option<f64> = s.trim().parse().ok();
    if let Some(number) = maybe_number {
        return Ok((number, AngleFormat::NoUnit));
    };

    let (prefix, suffix) = split_number_and_unit(s);
    for angle_format in AngleFormat::iter().filter(|&af| af != AngleFormat::NoUnit) {
        let angle_format_str: &'static str = angle_format.into();
        if suffix.to_uppercase() == angle_format_str.to_uppercase() {
            let number: f64 = match prefix.parse() {
                Ok(n) => n,
                Err(_) => {
                    return Err(UnitParseError::GotAngleUnitButCantParse {
                        input: s.to_string(),
                        unit: angle_format_str,
                    })
                }
            };
            return Ok((number, angle_format));
        }
    }

    Err(UnitParseError::Unknown {
        input: s.to_string(),
        unit_type: "angle",
    })
}

/// Parse a string into an angle [degrees]. Naked numbers are treated as
/// arcminutes, the unit usually used for horizon depressions.
pub(crate) fn parse_angle_deg(s: &str) -> Result<f64, UnitParseError> {
    let (number, format) = parse_angle(s)?;
    Ok(match format {
        AngleFormat::Deg => number,
        AngleFormat::Arcmin | AngleFormat::NoUnit => number / 60.0,
        AngleFormat::Arcsec => number / 3600.0,
        AngleFormat::Rad => number.to_degrees(),
    })
}
