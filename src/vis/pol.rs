// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Combining correlation products into a single polarisation.

use marlu::c64;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use super::VisError;

/// The polarisation that flagging statistics are derived from. The first and
/// last correlation products are combined (e.g. XX and YY, or RR and LL).
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
pub enum Polarisation {
    /// Stokes I; the mean of whichever of the two products are unflagged.
    #[default]
    #[strum(serialize = "i")]
    #[serde(rename = "i")]
    I,

    /// Stokes Q; the half-difference of the two products. Both products must
    /// be unflagged.
    #[strum(serialize = "q")]
    #[serde(rename = "q")]
    Q,
}

/// Combine the first and last correlation products of `data` (dimensions row,
/// channel, product) into a single polarisation. Values that can't be formed
/// from unflagged products are `NaN` and flagged in the returned flags.
pub(crate) fn combine_pols(
    data: ArrayView3<c64>,
    flags: ArrayView3<bool>,
    pol: Polarisation,
) -> Result<(Array2<c64>, Array2<bool>), VisError> {
    let (num_rows, num_chans, num_pols) = data.dim();
    if num_pols == 0 {
        return Err(VisError::NoPolarisations);
    }
    if flags.dim() != data.dim() {
        return Err(VisError::FlagShapeMismatch {
            data: data.dim(),
            flags: flags.dim(),
        });
    }
    let last = num_pols - 1;
    let (sign, min_count) = match pol {
        Polarisation::I => (1.0, 1.0),
        Polarisation::Q => (-1.0, 2.0),
    };

    let mut values = Array2::from_elem((num_rows, num_chans), c64::new(f64::NAN, f64::NAN));
    let mut out_flags = Array2::from_elem((num_rows, num_chans), true);
    for i_row in 0..num_rows {
        for i_chan in 0..num_chans {
            let w_first = if flags[(i_row, i_chan, 0)] { 0.0 } else { 1.0 };
            let w_last = if flags[(i_row, i_chan, last)] { 0.0 } else { 1.0 };
            let count = w_first + w_last;
            if count < min_count {
                continue;
            }
            // Flagged products may hold non-finite values; leave them out
            // rather than weighting them by zero.
            let zero = c64::new(0.0, 0.0);
            let first_val = if w_first > 0.0 { data[(i_row, i_chan, 0)] } else { zero };
            let last_val = if w_last > 0.0 { data[(i_row, i_chan, last)] } else { zero };
            values[(i_row, i_chan)] = (first_val + last_val * sign) / count;
            out_flags[(i_row, i_chan)] = false;
        }
    }

    Ok((values, out_flags))
}
