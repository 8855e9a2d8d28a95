// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. `sunflag` does all of its statistics
in double precision, regardless of the precision of the input visibilities.
 */

pub use std::f64::consts::{PI, TAU};

/// Speed of light [metres/second].
pub const VEL_C: f64 = 299_792_458.0;

/// The factor converting a median absolute deviation into a Gaussian-consistent
/// standard deviation.
pub const MAD_TO_STD: f64 = 1.482602218505602;

/// Seconds in a day.
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// The default number of pixels along each side of the uv grid.
pub const DEFAULT_IMSIZE: usize = 256;

/// The default angular size of a grid cell [arcseconds].
pub const DEFAULT_CELL_ARCSEC: f64 = 1.0;

/// The default clipping threshold [multiples of the scale].
pub const DEFAULT_THRESHOLD: f64 = 5.0;

/// The number of vertices used for each arc of a wedge.
pub const WEDGE_ARC_POINTS: usize = 100;

/// The default altitude of the centre of the sun at sunrise and sunset
/// [arcminutes]. This accounts for refraction at the horizon.
pub const DEFAULT_HORIZON_ARCMIN: f64 = -34.0;

/// Default margin before sunrise.
pub const DEFAULT_AVANTSOLEIL: &str = "30min";

/// Default margin after sunrise.
pub const DEFAULT_APRESNUIT: &str = "60min";

/// Default margin before sunset.
pub const DEFAULT_AVANTNUIT: &str = "60min";

/// Default margin after sunset.
pub const DEFAULT_APRESOLEIL: &str = "30min";

/// When searching for the sun crossing the horizon, the sun's altitude is
/// sampled with this step [seconds].
pub const SUN_SEARCH_STEP_S: f64 = 300.0;

/// How far into the future the sun is searched for a horizon crossing
/// [seconds].
pub const SUN_SEARCH_LIMIT_S: f64 = 2.0 * SECONDS_PER_DAY;

/// Horizon-crossing times are refined to this precision [seconds].
pub const SUN_CROSSING_PRECISION_S: f64 = 1.0;
