// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Flag solar interference in radio-interferometric visibilities.

Visibilities are gridded in the uv plane, the gridded amplitudes are clipped
against robust statistics (globally, per antenna or per baseline), flagged
points may be grown into wedges, and whole rows may be flagged around sunrise
and sunset.
 */

mod cli;
pub mod constants;
pub mod flagging;
pub mod grid;
pub mod io;
pub(crate) mod math;
pub(crate) mod params;
pub(crate) mod plotting;
pub mod solar;
pub mod stats;
pub(crate) mod unit_parsing;
pub mod vis;

#[cfg(test)]
mod tests;

use crossbeam_utils::atomic::AtomicCell;

/// Should progress bars be drawn? They're only drawn if the binary asks for
/// them.
pub(crate) static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);

// Re-exports.
pub use cli::{Sunflag, SunflagError};
pub use flagging::{flag_samples, FlagConfig, FlagOutcome, GroupMode};
pub use grid::{grid_samples, GridConfig, GriddedVis};
pub use solar::{solar_windows, LowPrecisionSun, SolarConfig, SolarWindows, SunEphemeris};
pub use stats::ThresholdMode;
pub use vis::{Samples, SampleValues};
