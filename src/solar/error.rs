// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolarError {
    #[error("There are no timestamps to find day and night for")]
    NoTimes,

    #[error("There are {times} timestamps, but {intervals} integration times")]
    IntervalCount { times: usize, intervals: usize },

    #[error("Couldn't determine the array position; no antenna positions are available. Use --array-position")]
    NoArrayPosition,
}
