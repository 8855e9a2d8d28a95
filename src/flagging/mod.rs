// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Flagging samples contaminated by the sun.
//!
//! The samples are gridded in the uv plane, each group of samples is clipped
//! against its own robust statistics, and the flags are optionally grown into
//! wedges.

mod clip;
mod error;
mod group;
#[cfg(test)]
mod tests;
mod wedge;

pub use clip::{clip_group, ClipConfig, ClipDiagnostics, ClipOutcome};
pub use error::FlagError;
pub use group::{clip_groups, GroupMode, GroupOutcome};
pub use wedge::{expand_wedges, Wedge, WedgeConfig, WedgeOutcome};

use log::info;

use crate::{
    grid::{grid_samples, GridConfig, GriddedVis},
    vis::Samples,
};

/// Everything that controls how samples are flagged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlagConfig {
    pub grid: GridConfig,
    pub group_mode: GroupMode,
    pub clip: ClipConfig,
    pub wedge: WedgeConfig,
}

impl FlagConfig {
    fn validate(&self) -> Result<(), FlagError> {
        if !self.clip.threshold.is_finite() {
            return Err(FlagError::BadThreshold(self.clip.threshold));
        }
        for (what, value) in [
            ("radial range", self.wedge.radrange),
            ("angle", self.wedge.angle_deg),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(FlagError::BadWedge { what, value });
            }
        }
        Ok(())
    }
}

/// The result of [`flag_samples`].
#[derive(Debug, Clone)]
pub struct FlagOutcome {
    /// The final flags, one per sample.
    pub mask: Vec<bool>,

    /// The flags before wedge expansion.
    pub clip_mask: Vec<bool>,

    pub gridded: GriddedVis,

    /// Empty unless diagnostics were requested.
    pub diagnostics: Vec<ClipDiagnostics>,

    pub wedges: Vec<Wedge>,
}

/// Grid, clip and expand. Samples that are `true` in `unflag` are never
/// flagged.
pub fn flag_samples(
    samples: &Samples,
    config: &FlagConfig,
    unflag: Option<&[bool]>,
    with_diagnostics: bool,
) -> Result<FlagOutcome, FlagError> {
    config.validate()?;
    if let Some(unflag) = unflag {
        if unflag.len() != samples.len() {
            return Err(FlagError::MaskLength {
                what: "unflag",
                expected: samples.len(),
                got: unflag.len(),
            });
        }
    }

    let gridded = grid_samples(samples, &config.grid)?;
    let GroupOutcome {
        mask: clip_mask,
        diagnostics,
    } = clip_groups(
        samples,
        &gridded,
        config.group_mode,
        unflag,
        &config.clip,
        with_diagnostics,
    );
    let WedgeOutcome { mask, wedges } = expand_wedges(samples, &clip_mask, &config.wedge, unflag);

    info!(
        "Flagged {} of {} samples",
        mask.iter().filter(|&&m| m).count(),
        samples.len()
    );
    Ok(FlagOutcome {
        mask,
        clip_mask,
        gridded,
        diagnostics,
        wedges,
    })
}
