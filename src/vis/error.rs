// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisError {
    #[error("The visibilities have no correlation products")]
    NoPolarisations,

    #[error("The visibilities have no frequency channels")]
    NoFrequencies,

    #[error("The visibility flags have dimensions {flags:?}, but the data have {data:?}")]
    FlagShapeMismatch {
        data: (usize, usize, usize),
        flags: (usize, usize, usize),
    },

    #[error("The channel selection has {selection} channels, but the data have {data}")]
    ChannelSelectionMismatch { selection: usize, data: usize },

    #[error("There are {values} sample values, but {uvws} uvw coordinates and {antennas} antenna pairs")]
    BadSampleCount {
        values: usize,
        uvws: usize,
        antennas: usize,
    },

    #[error("The exclusion mask has {got} entries, but there are {expected} samples")]
    MaskLength { expected: usize, got: usize },

    #[error("No datasets were supplied")]
    NoDatasets,

    #[error("Dataset {dataset} has {got} channels, but the first dataset has {expected}")]
    ChannelCountMismatch {
        dataset: usize,
        expected: usize,
        got: usize,
    },

    #[error("Dataset {dataset} has a different type of sample values to the first dataset")]
    MixedValueTypes { dataset: usize },

    #[error("Couldn't parse line {line_num} of selection file '{file}': {line}")]
    BadSelectionFile {
        file: String,
        line_num: usize,
        line: String,
    },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
