// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[cfg(not(feature = "plotting"))]
    #[error("sunflag was not compiled with the \"plotting\" feature.\nYou need to compile sunflag from source with this feature to make diagnostic plots.")]
    NoPlottingFeature,

    #[cfg(feature = "plotting")]
    #[error("There is nothing to plot")]
    NothingToPlot,

    #[cfg(feature = "plotting")]
    #[error("Error from the plotters library: {0}")]
    Plotters(Box<dyn std::error::Error>),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
