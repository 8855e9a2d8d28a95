// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! When does the sun rise and set?

use hifitime::{Duration, Epoch};
use log::trace;
use marlu::{precession::get_lmst, LatLngHeight, RADec};

use crate::constants::{
    DEFAULT_HORIZON_ARCMIN, SUN_CROSSING_PRECISION_S, SUN_SEARCH_LIMIT_S, SUN_SEARCH_STEP_S,
};

/// Something that knows when the sun crosses the horizon.
pub trait SunEphemeris: Sync {
    /// The first time after `after` that the sun rises, if it does so in the
    /// foreseeable future.
    fn next_sunrise(&self, observer: &LatLngHeight, after: Epoch) -> Option<Epoch>;

    /// The first time after `after` that the sun sets, if it does so in the
    /// foreseeable future.
    fn next_sunset(&self, observer: &LatLngHeight, after: Epoch) -> Option<Epoch>;

    /// Is the sun above the horizon? This is only needed when the sun neither
    /// rises nor sets (i.e. polar day or night).
    fn sun_is_up(&self, observer: &LatLngHeight, at: Epoch) -> bool;
}

/// The sun's position from the low-precision formulae of the Astronomical
/// Almanac, which are good to about 0.01 degrees between 1950 and 2050.
/// Crossings are found by stepping through time and then bisecting.
#[derive(Debug, Clone, Copy)]
pub struct LowPrecisionSun {
    /// The altitude of the centre of the sun when it rises or sets [radians].
    pub horizon_rad: f64,
}

impl Default for LowPrecisionSun {
    fn default() -> Self {
        Self::new((DEFAULT_HORIZON_ARCMIN / 60.0).to_radians())
    }
}

impl LowPrecisionSun {
    pub fn new(horizon_rad: f64) -> LowPrecisionSun {
        LowPrecisionSun { horizon_rad }
    }

    /// The sun's right ascension and declination [radians].
    pub fn ra_dec(epoch: Epoch) -> (f64, f64) {
        let n = days_since_j2000(epoch);
        let mean_longitude = (280.460 + 0.9856474 * n).rem_euclid(360.0);
        let mean_anomaly = (357.528 + 0.9856003 * n).rem_euclid(360.0).to_radians();
        let ecliptic_longitude = (mean_longitude
            + 1.915 * mean_anomaly.sin()
            + 0.020 * (2.0 * mean_anomaly).sin())
        .to_radians();
        let obliquity = (23.439 - 0.0000004 * n).to_radians();

        let ra = (obliquity.cos() * ecliptic_longitude.sin()).atan2(ecliptic_longitude.cos());
        let dec = (obliquity.sin() * ecliptic_longitude.sin()).asin();
        (ra, dec)
    }

    /// The altitude of the centre of the sun [radians]. DUT1 is taken as 0.
    pub fn altitude(observer: &LatLngHeight, epoch: Epoch) -> f64 {
        let (ra, dec) = Self::ra_dec(epoch);
        let lst_rad = get_lmst(observer.longitude_rad, epoch, Duration::from_seconds(0.0));
        RADec::from_radians(ra, dec)
            .to_hadec(lst_rad)
            .to_azel(observer.latitude_rad)
            .el
    }

    /// Find the first horizon crossing in the given direction after `after`.
    fn next_crossing(&self, observer: &LatLngHeight, after: Epoch, rising: bool) -> Option<Epoch> {
        let above = |t: Epoch| Self::altitude(observer, t) >= self.horizon_rad;
        let is_crossing = |before: bool, now: bool| if rising { !before && now } else { before && !now };

        let step = Duration::from_seconds(SUN_SEARCH_STEP_S);
        let num_steps = (SUN_SEARCH_LIMIT_S / SUN_SEARCH_STEP_S).ceil() as usize;
        let mut t0 = after;
        let mut was_above = above(t0);
        for _ in 0..num_steps {
            let t1 = t0 + step;
            let is_above = above(t1);
            if is_crossing(was_above, is_above) {
                // Bisect; the crossing is in (lo, hi].
                let (mut lo, mut hi) = (t0, t1);
                while (hi - lo).to_seconds() > SUN_CROSSING_PRECISION_S {
                    let mid = lo + Duration::from_seconds((hi - lo).to_seconds() / 2.0);
                    if above(mid) == is_above {
                        hi = mid;
                    } else {
                        lo = mid;
                    }
                }
                trace!(
                    "Sun {} at {hi}",
                    if rising { "rises" } else { "sets" }
                );
                return Some(hi);
            }
            t0 = t1;
            was_above = is_above;
        }
        None
    }
}

fn days_since_j2000(epoch: Epoch) -> f64 {
    // JD 2451545.0 is MJD 51544.5.
    epoch.to_mjd_utc_days() - 51544.5
}

impl SunEphemeris for LowPrecisionSun {
    fn next_sunrise(&self, observer: &LatLngHeight, after: Epoch) -> Option<Epoch> {
        self.next_crossing(observer, after, true)
    }

    fn next_sunset(&self, observer: &LatLngHeight, after: Epoch) -> Option<Epoch> {
        self.next_crossing(observer, after, false)
    }

    fn sun_is_up(&self, observer: &LatLngHeight, at: Epoch) -> bool {
        Self::altitude(observer, at) >= self.horizon_rad
    }
}
