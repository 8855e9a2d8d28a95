// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Gridding samples in the uv plane.
//!
//! Samples are binned into square cells. Within each cell, the samples'
//! values are summed as vectors per channel, and the magnitudes of these sums
//! are averaged over channels; this one number is the statistic for every
//! sample in the cell.

mod error;

pub use error::GridError;

use std::collections::HashMap;

use log::{debug, info};
use marlu::c64;
use ndarray::prelude::*;

use crate::{
    constants::{DEFAULT_CELL_ARCSEC, DEFAULT_IMSIZE, PI},
    vis::Samples,
};

/// How samples are gridded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    /// The number of pixels along each side of the corresponding image.
    pub imsize: usize,

    /// The angular size of an image pixel [arcseconds].
    pub cell_arcsec: f64,

    /// Samples with baselines not longer than this are ignored [wavelengths].
    pub uvmin: f64,

    /// If set, samples with baselines not shorter than this are ignored, and
    /// the grid spans `-uvmax..uvmax` on both axes [wavelengths].
    pub uvmax: Option<f64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            imsize: DEFAULT_IMSIZE,
            cell_arcsec: DEFAULT_CELL_ARCSEC,
            uvmin: 0.0,
            uvmax: None,
        }
    }
}

impl GridConfig {
    /// The width of a grid cell [wavelengths].
    pub fn duv(&self) -> f64 {
        1.0 / (self.imsize as f64 * self.cell_arcsec * PI / (3600.0 * 180.0))
    }

    fn validate(&self) -> Result<(), GridError> {
        if self.imsize == 0 {
            return Err(GridError::ZeroImsize);
        }
        if !(self.cell_arcsec > 0.0 && self.cell_arcsec.is_finite()) {
            return Err(GridError::BadCell(self.cell_arcsec));
        }
        if let Some(uvmax) = self.uvmax {
            if !(uvmax > 0.0) {
                return Err(GridError::BadUvmax(uvmax));
            }
        }
        Ok(())
    }

    /// Is a sample at `(u, v)` within the uv range?
    pub fn in_uv_range(&self, u: f64, v: f64) -> bool {
        let r2 = u * u + v * v;
        r2 > self.uvmin * self.uvmin && self.uvmax.map(|m| r2 < m * m).unwrap_or(true)
    }
}

/// An occupied grid cell.
#[derive(Debug, Clone)]
pub struct GridCell {
    /// The (u, v) indices of the cell.
    pub index: (usize, usize),

    /// The coordinates of the cell's centre [wavelengths].
    pub centre: (f64, f64),

    /// The mean over channels of the magnitude of the vector sum of the
    /// members' values.
    pub value: f64,

    /// Indices of the samples in the cell.
    pub members: Vec<usize>,
}

/// Samples after gridding.
#[derive(Debug, Clone)]
pub struct GriddedVis {
    /// The width of each cell [wavelengths].
    pub duv: f64,

    /// The (u, v) coordinates of the grid's lower corner [wavelengths].
    pub origin: (f64, f64),

    /// The number of cells along the u and v axes.
    pub dims: (usize, usize),

    pub cells: Vec<GridCell>,

    /// For each sample, the index into `cells`. `None` for samples that are
    /// excluded or outside the uv range.
    pub sample_cells: Vec<Option<usize>>,

    /// For each sample, the value of its cell (`NaN` if it has no cell).
    pub sample_values: Vec<f64>,
}

impl GriddedVis {
    /// The centre coordinate of a sample's cell.
    pub fn sample_centre(&self, i_sample: usize) -> Option<(f64, f64)> {
        self.sample_cells[i_sample].map(|i_cell| self.cells[i_cell].centre)
    }

    /// The grid as an image indexed by (u, v) cell indices. Unoccupied cells
    /// are `NaN`.
    pub fn image(&self) -> Array2<f64> {
        let mut image = Array2::from_elem(self.dims, f64::NAN);
        for cell in &self.cells {
            image[cell.index] = cell.value;
        }
        image
    }
}

fn axis_extent(coords: impl Iterator<Item = f64>, uvmax: Option<f64>) -> (f64, f64) {
    let (min, max) = match uvmax {
        Some(m) => (-m, m),
        None => coords.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        }),
    };
    if min.is_finite() && max.is_finite() {
        (min.floor(), max.ceil())
    } else {
        (0.0, 0.0)
    }
}

#[inline]
fn cell_index(x: f64, min: f64, duv: f64, n: usize) -> usize {
    let i = ((x - min) / duv).floor();
    if i <= 0.0 {
        0
    } else {
        (i as usize).min(n - 1)
    }
}

/// Grid the samples.
pub fn grid_samples(samples: &Samples, config: &GridConfig) -> Result<GriddedVis, GridError> {
    config.validate()?;
    let duv = config.duv();

    let (u_min, u_max) = axis_extent(samples.uvws.iter().map(|uvw| uvw.u), config.uvmax);
    let (v_min, v_max) = axis_extent(samples.uvws.iter().map(|uvw| uvw.v), config.uvmax);
    info!("Gridding visibilities with cells of {duv:.3} wavelengths");
    info!("    u ranges from {u_min:.0} to {u_max:.0}, v from {v_min:.0} to {v_max:.0}");
    let num_u = (((u_max - u_min) / duv).ceil() as usize).max(1);
    let num_v = (((v_max - v_min) / duv).ceil() as usize).max(1);
    debug!("Grid dimensions: {num_u} x {num_v}");

    let mut index_to_cell: HashMap<(usize, usize), usize> = HashMap::new();
    let mut cells: Vec<GridCell> = vec![];
    let mut sample_cells = vec![None; samples.len()];
    for (i_sample, uvw) in samples.uvws.iter().enumerate() {
        if samples.values.is_excluded(i_sample) || !config.in_uv_range(uvw.u, uvw.v) {
            continue;
        }
        let index = (
            cell_index(uvw.u, u_min, duv, num_u),
            cell_index(uvw.v, v_min, duv, num_v),
        );
        let i_cell = *index_to_cell.entry(index).or_insert_with(|| {
            cells.push(GridCell {
                index,
                centre: (
                    u_min + (index.0 as f64 + 0.5) * duv,
                    v_min + (index.1 as f64 + 0.5) * duv,
                ),
                value: f64::NAN,
                members: vec![],
            });
            cells.len() - 1
        });
        cells[i_cell].members.push(i_sample);
        sample_cells[i_sample] = Some(i_cell);
    }

    let num_chans = samples.values.num_chans();
    for cell in cells.iter_mut() {
        cell.value = cell_statistic(samples, &cell.members, num_chans);
    }
    let sample_values = sample_cells
        .iter()
        .map(|c| c.map(|i_cell: usize| cells[i_cell].value).unwrap_or(f64::NAN))
        .collect();
    info!(
        "{} samples were gridded into {} cells",
        sample_cells.iter().filter(|c| c.is_some()).count(),
        cells.len()
    );

    Ok(GriddedVis {
        duv,
        origin: (u_min, v_min),
        dims: (num_u, num_v),
        cells,
        sample_cells,
        sample_values,
    })
}

/// The mean over channels of the magnitude of the vector sum of the members'
/// values. Channels where every member is excluded are skipped.
fn cell_statistic(samples: &Samples, members: &[usize], num_chans: usize) -> f64 {
    let mut total = 0.0;
    let mut num_used_chans = 0;
    for i_chan in 0..num_chans {
        let mut sum = c64::new(0.0, 0.0);
        let mut any = false;
        for &i_sample in members {
            if let Some(v) = samples.values.get(i_sample, i_chan) {
                sum += v;
                any = true;
            }
        }
        if any {
            total += sum.norm();
            num_used_chans += 1;
        }
    }
    if num_used_chans == 0 {
        f64::NAN
    } else {
        total / num_used_chans as f64
    }
}
