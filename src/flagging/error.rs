// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::grid::GridError;

#[derive(Error, Debug)]
pub enum FlagError {
    #[error("The {what} mask has {got} entries, but there are {expected} samples")]
    MaskLength {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("The clipping threshold must be a finite number; got {0}")]
    BadThreshold(f64),

    #[error("The wedge {what} must be a finite, non-negative number; got {value}")]
    BadWedge { what: &'static str, value: f64 },

    #[error(transparent)]
    Grid(#[from] GridError),
}
