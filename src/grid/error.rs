// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("The image size must be at least 1 pixel")]
    ZeroImsize,

    #[error("The cell size must be a positive number of arcseconds; got {0}")]
    BadCell(f64),

    #[error("The maximum uv distance must be positive; got {0}")]
    BadUvmax(f64),
}
