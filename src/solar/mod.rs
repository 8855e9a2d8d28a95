// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Finding the times near sunrise and sunset (or during the day).
//!
//! The sun is followed through the observation: from each sunrise, find the
//! following sunset, emit time windows around them, then find the next sunrise.
//! Without `nononsoleil`, each crossing gets its own window (from `avantsoleil`
//! before sunrise until `apresnuit` after it, and from `avantnuit` before
//! sunset until `apresoleil` after it). With it, one window spans the whole
//! day.

mod ephemeris;
mod error;

pub use ephemeris::{LowPrecisionSun, SunEphemeris};
pub use error::SolarError;

use hifitime::{Duration, Epoch};
use log::{debug, info};
use marlu::LatLngHeight;

/// Time margins around sunrise and sunset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarMargins {
    /// Before sunrise.
    pub avantsoleil: Duration,

    /// After sunrise.
    pub apresnuit: Duration,

    /// Before sunset.
    pub avantnuit: Duration,

    /// After sunset.
    pub apresoleil: Duration,
}

impl Default for SolarMargins {
    fn default() -> Self {
        let zero = Duration::from_seconds(0.0);
        Self {
            avantsoleil: zero,
            apresnuit: zero,
            avantnuit: zero,
            apresoleil: zero,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolarConfig {
    pub margins: SolarMargins,

    /// Make one window for the whole day, rather than one around each of
    /// sunrise and sunset.
    pub nononsoleil: bool,

    /// Report times outside the windows rather than inside.
    pub invert: bool,
}

/// A time window (including its ends).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarWindow {
    pub start: Epoch,
    pub end: Epoch,
}

impl SolarWindow {
    pub fn contains(&self, time: Epoch) -> bool {
        self.start <= time && time <= self.end
    }
}

/// The result of [`solar_windows`].
#[derive(Debug, Clone)]
pub struct SolarWindows {
    /// In chronological order.
    pub windows: Vec<SolarWindow>,

    /// For each timestamp, whether it is in any window (or not in any window,
    /// if inverted).
    pub flags: Vec<bool>,

    /// The number of sunrises and sunsets during the observation.
    pub num_crossings: usize,
}

/// Find the windows near sunrise and sunset for an observation with the given
/// timestamps and integration times, and flag the timestamps inside them. The
/// observation spans from half an integration before the first timestamp until
/// half an integration after the last.
pub fn solar_windows(
    times: &[Epoch],
    intervals: &[Duration],
    observer: &LatLngHeight,
    ephemeris: &dyn SunEphemeris,
    config: &SolarConfig,
) -> Result<SolarWindows, SolarError> {
    if times.is_empty() {
        return Err(SolarError::NoTimes);
    }
    if times.len() != intervals.len() {
        return Err(SolarError::IntervalCount {
            times: times.len(),
            intervals: intervals.len(),
        });
    }

    let half = |d: &Duration| Duration::from_seconds(d.to_seconds() / 2.0);
    let (obs_start, obs_end) = times.iter().zip(intervals).fold(
        (times[0] - half(&intervals[0]), times[0] + half(&intervals[0])),
        |(start, end), (&t, i)| {
            let (s, e) = (t - half(i), t + half(i));
            (
                if s < start { s } else { start },
                if e > end { e } else { end },
            )
        },
    );
    debug!("Observation spans {obs_start} to {obs_end}");

    let next_sunrise = ephemeris.next_sunrise(observer, obs_start);
    let next_sunset = ephemeris.next_sunset(observer, obs_start);
    let sun_is_up = match (next_sunrise, next_sunset) {
        (Some(rise), Some(set)) => set < rise,
        (None, Some(_)) => true,
        (Some(_), None) => false,
        (None, None) => ephemeris.sun_is_up(observer, obs_start),
    };
    debug!(
        "The sun is {} at the start of the observation",
        if sun_is_up { "up" } else { "down" }
    );

    let in_obs = |t: Epoch| obs_start <= t && t <= obs_end;
    let SolarMargins {
        avantsoleil,
        apresnuit,
        avantnuit,
        apresoleil,
    } = config.margins;
    let mut windows = vec![];
    let mut num_crossings = 0;
    let mut sunrise = if sun_is_up {
        Some(obs_start)
    } else {
        next_sunrise
    };
    while let Some(rise) = sunrise {
        if rise - avantsoleil >= obs_end {
            break;
        }
        if in_obs(rise) && rise != obs_start {
            num_crossings += 1;
        }
        let sunset = ephemeris.next_sunset(observer, rise);
        let set = match sunset {
            Some(set) => {
                if in_obs(set) {
                    num_crossings += 1;
                }
                set
            }
            // The sun doesn't set again within the search limit.
            None => obs_end,
        };

        if config.nononsoleil {
            windows.push(SolarWindow {
                start: rise - avantsoleil,
                end: set + apresoleil,
            });
        } else {
            windows.push(SolarWindow {
                start: rise - avantsoleil,
                end: rise + apresnuit,
            });
            windows.push(SolarWindow {
                start: set - avantnuit,
                end: set + apresoleil,
            });
        }

        sunrise = match sunset {
            Some(set) => ephemeris.next_sunrise(observer, set),
            None => None,
        };
    }

    info!("The sun crosses the horizon {num_crossings} times during the observation");
    for window in &windows {
        let start = if window.start < obs_start {
            obs_start
        } else {
            window.start
        };
        let end = if window.end > obs_end {
            obs_end
        } else {
            window.end
        };
        if start <= end {
            info!("    Solar window: {start} to {end}");
        }
    }

    let flags: Vec<bool> = times
        .iter()
        .map(|&t| windows.iter().any(|w| w.contains(t)) != config.invert)
        .collect();
    debug!(
        "{} of {} timestamps are flagged",
        flags.iter().filter(|&&f| f).count(),
        flags.len()
    );

    Ok(SolarWindows {
        windows,
        flags,
        num_crossings,
    })
}
