// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Growing flags into wedges (annular sectors) of the uv plane.
//!
//! Solar interference on a baseline tends to affect a range of uv distances
//! and position angles around a flagged point, not just the point itself.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info};
use rayon::prelude::*;

use crate::{
    constants::WEDGE_ARC_POINTS,
    math::{atan2, bounding_box, point_in_polygon},
    vis::Samples,
    PROGRESS_BARS,
};

/// The size of each wedge. Wedges are disabled if either extent is not
/// positive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WedgeConfig {
    /// The radial extent [wavelengths].
    pub radrange: f64,

    /// The angular extent [degrees].
    pub angle_deg: f64,
}

impl WedgeConfig {
    pub fn is_enabled(&self) -> bool {
        self.radrange > 0.0 && self.angle_deg > 0.0
    }
}

/// A polygon approximating an annular sector centred on a flagged point.
#[derive(Debug, Clone)]
pub struct Wedge {
    /// The (u, v) of the point that made this wedge [wavelengths].
    pub centre: (f64, f64),

    /// The outer arc, anticlockwise in position angle, then the inner arc in
    /// reverse. The outer vertices sit just beyond the outer radius so that
    /// the polygon's chords never cut inside it.
    pub vertices: Vec<(f64, f64)>,

    bbox: (f64, f64, f64, f64),
}

impl Wedge {
    /// The wedge around the point `(u, v)`. Position angles are measured from
    /// the v axis towards the u axis.
    pub fn new(u: f64, v: f64, config: &WedgeConfig) -> Wedge {
        let r = u.hypot(v);
        let theta = atan2(u, v);
        let half_angle = config.angle_deg.to_radians() / 2.0;
        let r_outer = r + config.radrange / 2.0;
        let r_inner = (r - config.radrange / 2.0).max(0.0);

        let step = 2.0 * half_angle / (WEDGE_ARC_POINTS - 1) as f64;
        let r_outer = r_outer / (step / 2.0).cos();
        let arc = |radius: f64, i: usize| {
            let alpha = theta - half_angle + i as f64 * step;
            (radius * alpha.sin(), radius * alpha.cos())
        };
        let vertices: Vec<(f64, f64)> = (0..WEDGE_ARC_POINTS)
            .map(|i| arc(r_outer, i))
            .chain((0..WEDGE_ARC_POINTS).rev().map(|i| arc(r_inner, i)))
            .collect();
        let bbox = bounding_box(&vertices);

        Wedge {
            centre: (u, v),
            vertices,
            bbox,
        }
    }

    pub fn contains(&self, u: f64, v: f64) -> bool {
        // A wedge centred on the origin has its point on a vertex.
        if (u, v) == self.centre {
            return true;
        }
        let (min_u, max_u, min_v, max_v) = self.bbox;
        if u < min_u || u > max_u || v < min_v || v > max_v {
            return false;
        }
        point_in_polygon(u, v, &self.vertices)
    }
}

/// The result of [`expand_wedges`].
#[derive(Debug, Clone)]
pub struct WedgeOutcome {
    /// The input mask OR'd with every sample inside a wedge.
    pub mask: Vec<bool>,

    /// One wedge per sample flagged in the input mask.
    pub wedges: Vec<Wedge>,
}

/// Put a wedge around every sample flagged in `mask`, and flag every sample
/// inside any wedge. Only the input flags make wedges. Samples that are `true`
/// in `unflag` are never flagged by a wedge.
pub fn expand_wedges(
    samples: &Samples,
    mask: &[bool],
    config: &WedgeConfig,
    unflag: Option<&[bool]>,
) -> WedgeOutcome {
    if !config.is_enabled() {
        debug!("Not expanding flags into wedges");
        return WedgeOutcome {
            mask: mask.to_vec(),
            wedges: vec![],
        };
    }

    let wedges: Vec<Wedge> = mask
        .iter()
        .zip(samples.uvws.iter())
        .filter(|(&flagged, _)| flagged)
        .map(|(_, uvw)| Wedge::new(uvw.u, uvw.v, config))
        .collect();
    info!(
        "Expanding {} flagged samples into wedges ({} wavelengths by {}°)",
        wedges.len(),
        config.radrange,
        config.angle_deg
    );

    let progress_bar = ProgressBar::with_draw_target(
        Some(wedges.len() as _),
        if PROGRESS_BARS.load() {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        },
    )
    .with_style(
        ProgressStyle::default_bar()
            .template("{msg:17}: [{wide_bar:.blue}] {pos:2}/{len:2} wedges ({elapsed_precise}<{eta_precise})")
            .unwrap()
            .progress_chars("=> "),
    )
    .with_position(0)
    .with_message("Expanding wedges");

    let hits: Vec<usize> = wedges
        .par_iter()
        .flat_map_iter(|wedge| {
            let inside: Vec<usize> = samples
                .uvws
                .iter()
                .enumerate()
                .filter(|(_, uvw)| wedge.contains(uvw.u, uvw.v))
                .map(|(i, _)| i)
                .collect();
            progress_bar.inc(1);
            inside
        })
        .collect();
    progress_bar.abandon_with_message("Finished expanding wedges");

    let mut new_mask = mask.to_vec();
    for i in hits {
        if !unflag.map(|u| u[i]).unwrap_or(false) {
            new_mask[i] = true;
        }
    }
    info!(
        "Wedges flagged {} more samples",
        new_mask.iter().filter(|&&m| m).count() - mask.iter().filter(|&&m| m).count()
    );

    WedgeOutcome {
        mask: new_mask,
        wedges,
    }
}
