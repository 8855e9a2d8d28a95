// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Clipping groups of samples (e.g. everything touching one antenna)
//! independently, and combining their masks.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use itertools::Itertools;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use super::clip::{clip_group, ClipConfig, ClipDiagnostics};
use crate::{grid::GriddedVis, vis::Samples, PROGRESS_BARS};

/// How samples are grouped for clipping.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum GroupMode {
    /// One group containing every sample.
    #[default]
    #[strum(serialize = "all")]
    #[serde(rename = "all")]
    All,

    /// One group per antenna, containing every sample involving that antenna.
    #[strum(serialize = "antenna")]
    #[serde(rename = "antenna")]
    Antenna,

    /// One group per (unordered) cross-correlation baseline.
    #[strum(serialize = "baseline")]
    #[serde(rename = "baseline")]
    Baseline,
}

/// A set of samples that are clipped together.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Group {
    pub(crate) title: String,

    /// `true` for samples that aren't in the group.
    pub(crate) ignore: Vec<bool>,
}

#[inline]
fn unordered((a1, a2): (usize, usize)) -> (usize, usize) {
    (a1.min(a2), a1.max(a2))
}

/// Split the samples into groups.
pub(crate) fn make_groups(samples: &Samples, mode: GroupMode) -> Vec<Group> {
    match mode {
        GroupMode::All => vec![Group {
            title: "All baselines".to_string(),
            ignore: vec![false; samples.len()],
        }],

        GroupMode::Antenna => samples
            .antenna_pairs
            .iter()
            .flat_map(|&(a1, a2)| [a1, a2])
            .unique()
            .sorted()
            .map(|ant| Group {
                title: format!("Antenna {}", samples.antenna_name(ant)),
                ignore: samples
                    .antenna_pairs
                    .iter()
                    .map(|&(a1, a2)| a1 != ant && a2 != ant)
                    .collect(),
            })
            .collect(),

        GroupMode::Baseline => samples
            .antenna_pairs
            .iter()
            .map(|&pair| unordered(pair))
            .filter(|(a1, a2)| a1 != a2)
            .unique()
            .sorted()
            .map(|key| Group {
                title: format!(
                    "Baseline {} - {}",
                    samples.antenna_name(key.0),
                    samples.antenna_name(key.1)
                ),
                ignore: samples
                    .antenna_pairs
                    .iter()
                    .map(|&pair| unordered(pair) != key)
                    .collect(),
            })
            .collect(),
    }
}

/// The combined result of clipping every group.
#[derive(Debug, Clone)]
pub struct GroupOutcome {
    /// The OR of every group's mask.
    pub mask: Vec<bool>,

    /// Per-group diagnostics, in group order.
    pub diagnostics: Vec<ClipDiagnostics>,
}

/// Clip each group of samples in parallel. A sample is flagged if any group
/// flags it. A group without enough data flags nothing, and doesn't affect the
/// other groups.
pub fn clip_groups(
    samples: &Samples,
    gridded: &GriddedVis,
    mode: GroupMode,
    unflag: Option<&[bool]>,
    config: &ClipConfig,
    with_diagnostics: bool,
) -> GroupOutcome {
    let groups = make_groups(samples, mode);
    info!(
        "Clipping {} group{} (mode '{mode}', threshold mode '{}', threshold {})",
        groups.len(),
        if groups.len() == 1 { "" } else { "s" },
        config.mode,
        config.threshold
    );

    let progress_bar = ProgressBar::with_draw_target(
        Some(groups.len() as _),
        if PROGRESS_BARS.load() {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        },
    )
    .with_style(
        ProgressStyle::default_bar()
            .template("{msg:17}: [{wide_bar:.blue}] {pos:2}/{len:2} groups ({elapsed_precise}<{eta_precise})")
            .unwrap()
            .progress_chars("=> "),
    )
    .with_position(0)
    .with_message("Clipping");

    let outcomes: Vec<_> = groups
        .par_iter()
        .map(|group| {
            let outcome = clip_group(
                gridded,
                &group.ignore,
                unflag,
                config,
                &group.title,
                with_diagnostics,
            );
            progress_bar.inc(1);
            outcome
        })
        .collect();
    progress_bar.abandon_with_message("Finished clipping");

    let mut mask = vec![false; samples.len()];
    let mut diagnostics = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        for (m, g) in mask.iter_mut().zip(outcome.mask) {
            *m |= g;
        }
        diagnostics.extend(outcome.diagnostics);
    }
    debug!(
        "{} samples flagged by clipping",
        mask.iter().filter(|&&m| m).count()
    );

    GroupOutcome { mask, diagnostics }
}
