// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Visibilities as the flagging code sees them.
//!
//! A visibility table ([`RawVis`]) has a row per baseline and time, with data
//! for every frequency channel and correlation product. Combining the
//! correlation products into a single polarisation and applying the user's
//! selections produces [`Samples`]; excluded data are `NaN` from then on.

mod error;
mod pol;
mod selection;

pub use error::VisError;
pub use pol::Polarisation;
pub(crate) use pol::combine_pols;
pub use selection::VisSelection;
pub(crate) use selection::{read_baselines_file, read_channels_file};

use std::ops::Range;

use hifitime::{Duration, Epoch};
use log::{debug, warn};
use marlu::{c64, XyzGeocentric, UVW};
use ndarray::prelude::*;

use crate::constants::VEL_C;

/// The values of all samples; one row per sample, one column per channel.
/// Whether samples are real or complex is decided once when they are loaded.
#[derive(Debug, Clone)]
pub enum SampleValues {
    Real(Array2<f64>),
    Complex(Array2<c64>),
}

impl SampleValues {
    pub fn num_samples(&self) -> usize {
        match self {
            SampleValues::Real(a) => a.len_of(Axis(0)),
            SampleValues::Complex(a) => a.len_of(Axis(0)),
        }
    }

    pub fn num_chans(&self) -> usize {
        match self {
            SampleValues::Real(a) => a.len_of(Axis(1)),
            SampleValues::Complex(a) => a.len_of(Axis(1)),
        }
    }

    /// The value of one sample in one channel, or `None` if that value is
    /// excluded (i.e. not finite).
    #[inline]
    pub fn get(&self, i_sample: usize, i_chan: usize) -> Option<c64> {
        match self {
            SampleValues::Real(a) => {
                let v = a[(i_sample, i_chan)];
                v.is_finite().then(|| c64::new(v, 0.0))
            }
            SampleValues::Complex(a) => {
                let v = a[(i_sample, i_chan)];
                v.is_finite().then_some(v)
            }
        }
    }

    /// Is every channel of this sample excluded?
    pub fn is_excluded(&self, i_sample: usize) -> bool {
        (0..self.num_chans()).all(|i_chan| self.get(i_sample, i_chan).is_none())
    }

    /// Exclude every channel of a sample.
    pub fn exclude(&mut self, i_sample: usize) {
        match self {
            SampleValues::Real(a) => a.row_mut(i_sample).fill(f64::NAN),
            SampleValues::Complex(a) => a.row_mut(i_sample).fill(c64::new(f64::NAN, f64::NAN)),
        }
    }
}

/// All samples used in a flagging pass. Samples from multiple datasets are
/// concatenated; dataset `i` owns the samples in
/// `dataset_offsets[i]..dataset_offsets[i + 1]`.
#[derive(Debug, Clone)]
pub struct Samples {
    pub values: SampleValues,

    /// The baseline coordinates of each sample [wavelengths].
    pub uvws: Vec<UVW>,

    /// The antenna indices of each sample.
    pub antenna_pairs: Vec<(usize, usize)>,

    /// Names of the antennas, if known. Used only for reporting.
    pub antenna_names: Vec<String>,

    pub dataset_offsets: Vec<usize>,
}

impl Samples {
    /// Make samples from a single dataset.
    pub fn new(
        values: SampleValues,
        uvws: Vec<UVW>,
        antenna_pairs: Vec<(usize, usize)>,
    ) -> Result<Samples, VisError> {
        let num_samples = values.num_samples();
        if uvws.len() != num_samples || antenna_pairs.len() != num_samples {
            return Err(VisError::BadSampleCount {
                values: num_samples,
                uvws: uvws.len(),
                antennas: antenna_pairs.len(),
            });
        }
        Ok(Samples {
            values,
            uvws,
            antenna_pairs,
            antenna_names: vec![],
            dataset_offsets: vec![0, num_samples],
        })
    }

    pub fn with_antenna_names(mut self, antenna_names: Vec<String>) -> Samples {
        self.antenna_names = antenna_names;
        self
    }

    /// Concatenate samples from multiple datasets into a single arena.
    pub fn concatenate(sets: Vec<Samples>) -> Result<Samples, VisError> {
        let mut sets = sets.into_iter();
        let mut arena = match sets.next() {
            Some(s) => s,
            None => return Err(VisError::NoDatasets),
        };

        for (i_set, set) in sets.enumerate() {
            let i_set = i_set + 1;
            if set.values.num_chans() != arena.values.num_chans() {
                return Err(VisError::ChannelCountMismatch {
                    dataset: i_set,
                    expected: arena.values.num_chans(),
                    got: set.values.num_chans(),
                });
            }
            if !set.antenna_names.is_empty()
                && !arena.antenna_names.is_empty()
                && set.antenna_names != arena.antenna_names
            {
                warn!("The antennas of dataset {i_set} differ from those of the first dataset; only the 'all' mode is meaningful, and baseline selections might not do what you expect");
            }

            arena.values = match (arena.values, set.values) {
                (SampleValues::Real(a), SampleValues::Real(b)) => SampleValues::Real(
                    ndarray::concatenate(Axis(0), &[a.view(), b.view()])
                        .expect("channel counts checked above"),
                ),
                (SampleValues::Complex(a), SampleValues::Complex(b)) => SampleValues::Complex(
                    ndarray::concatenate(Axis(0), &[a.view(), b.view()])
                        .expect("channel counts checked above"),
                ),
                _ => return Err(VisError::MixedValueTypes { dataset: i_set }),
            };
            arena.uvws.extend(set.uvws);
            arena.antenna_pairs.extend(set.antenna_pairs);
            arena.dataset_offsets.push(arena.uvws.len());
        }

        debug!(
            "Concatenated {} datasets into {} samples",
            arena.get_num_datasets(),
            arena.len()
        );
        Ok(arena)
    }

    pub fn len(&self) -> usize {
        self.uvws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uvws.is_empty()
    }

    pub fn get_num_datasets(&self) -> usize {
        self.dataset_offsets.len() - 1
    }

    /// The samples belonging to a dataset.
    pub fn dataset_range(&self, i_dataset: usize) -> Range<usize> {
        self.dataset_offsets[i_dataset]..self.dataset_offsets[i_dataset + 1]
    }

    /// Exclude each sample whose entry in `exclude` is `true`. Returns the
    /// number of newly-excluded samples.
    pub fn exclude_samples(&mut self, exclude: &[bool]) -> Result<usize, VisError> {
        if exclude.len() != self.len() {
            return Err(VisError::MaskLength {
                expected: self.len(),
                got: exclude.len(),
            });
        }
        let mut num_excluded = 0;
        for (i_sample, _) in exclude.iter().enumerate().filter(|(_, &e)| e) {
            if !self.values.is_excluded(i_sample) {
                num_excluded += 1;
            }
            self.values.exclude(i_sample);
        }
        Ok(num_excluded)
    }

    /// The name of an antenna for reporting, falling back to its index.
    pub fn antenna_name(&self, antenna: usize) -> String {
        match self.antenna_names.get(antenna) {
            Some(name) => format!("{antenna}: {name}"),
            None => antenna.to_string(),
        }
    }
}

/// A visibility table, as read from a file.
#[derive(Debug, Clone)]
pub struct RawVis {
    /// The centroid time of each row.
    pub times: Vec<Epoch>,

    /// The integration time of each row.
    pub intervals: Vec<Duration>,

    /// The baseline coordinates of each row [metres].
    pub uvws_m: Vec<UVW>,

    pub antenna_pairs: Vec<(usize, usize)>,

    pub fields: Vec<usize>,

    /// Visibilities with dimensions (row, channel, correlation product).
    pub data: Array3<c64>,

    /// Flags with the same dimensions as `data`.
    pub flags: Array3<bool>,

    pub freqs_hz: Vec<f64>,

    pub antenna_names: Vec<String>,

    /// Antenna positions in geocentric coordinates [metres].
    pub antenna_positions: Vec<[f64; 3]>,
}

impl RawVis {
    pub fn num_rows(&self) -> usize {
        self.times.len()
    }

    /// Combine the correlation products into `pol`, apply `selection`, and
    /// convert the baseline coordinates into wavelengths. The wavelength used
    /// is that of the mean frequency.
    pub fn to_samples(
        &self,
        pol: Polarisation,
        selection: &VisSelection,
    ) -> Result<Samples, VisError> {
        let num_chans = self.data.len_of(Axis(1));
        if self.freqs_hz.is_empty() {
            return Err(VisError::NoFrequencies);
        }
        if let Some(channels) = selection.channels.as_ref() {
            if channels.len() != num_chans {
                return Err(VisError::ChannelSelectionMismatch {
                    selection: channels.len(),
                    data: num_chans,
                });
            }
        }

        let (mut values, _) = combine_pols(self.data.view(), self.flags.view(), pol)?;
        let excluded_value = c64::new(f64::NAN, f64::NAN);
        let mut num_excluded_rows = 0;
        for (i_row, mut row) in values.outer_iter_mut().enumerate() {
            if !selection.uses_row(self.antenna_pairs[i_row], self.fields[i_row]) {
                row.fill(excluded_value);
                num_excluded_rows += 1;
                continue;
            }
            if let Some(channels) = selection.channels.as_ref() {
                row.iter_mut()
                    .zip(channels)
                    .filter(|(_, &use_chan)| !use_chan)
                    .for_each(|(v, _)| *v = excluded_value);
            }
        }
        debug!(
            "{num_excluded_rows} of {} rows were excluded by selections",
            self.num_rows()
        );

        let mean_freq_hz = self.freqs_hz.iter().sum::<f64>() / self.freqs_hz.len() as f64;
        debug!("Mean wavelength: {:.3} m", VEL_C / mean_freq_hz);
        let uvws = self
            .uvws_m
            .iter()
            .map(|uvw| *uvw * (mean_freq_hz / VEL_C))
            .collect();

        Ok(Samples::new(
            SampleValues::Complex(values),
            uvws,
            self.antenna_pairs.clone(),
        )?
        .with_antenna_names(self.antenna_names.clone()))
    }

    /// The mean antenna position, which is used as the position of the array.
    pub fn mean_antenna_position(&self) -> Option<XyzGeocentric> {
        if self.antenna_positions.is_empty() {
            return None;
        }
        let mut average_xyz = XyzGeocentric::default();
        for &[x, y, z] in &self.antenna_positions {
            average_xyz.x += x;
            average_xyz.y += y;
            average_xyz.z += z;
        }
        let n = self.antenna_positions.len() as f64;
        average_xyz.x /= n;
        average_xyz.y /= n;
        average_xyz.z /= n;
        Some(average_xyz)
    }
}
