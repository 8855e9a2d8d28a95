// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use super::*;

#[test]
fn test_plot_paths() {
    let params = PlotParams {
        name: "obs1".to_string(),
        dir: PathBuf::from("plots"),
    };
    assert_eq!(params.path("histo"), PathBuf::from("plots/histo_obs1.png"));

    let params = PlotParams {
        name: "obs1.png".to_string(),
        dir: PathBuf::from("."),
    };
    assert_eq!(params.path("select"), PathBuf::from("./select_obs1.png"));
}

#[cfg(feature = "plotting")]
#[test]
fn test_colour_scale() {
    use plotters::style::RGBColor;

    assert_eq!(plotting::colour_scale(0.0), RGBColor(255, 255, 255));
    assert_eq!(plotting::colour_scale(1.0), RGBColor(20, 30, 90));
    // Out-of-range and non-finite fractions are clamped.
    assert_eq!(plotting::colour_scale(2.0), plotting::colour_scale(1.0));
    assert_eq!(plotting::colour_scale(f64::NAN), plotting::colour_scale(0.0));
}

#[cfg(not(feature = "plotting"))]
#[test]
fn test_no_plotting_feature() {
    use crate::{
        flagging::{flag_samples, FlagConfig},
        grid::GridConfig,
        vis::{SampleValues, Samples},
    };
    use marlu::UVW;
    use ndarray::Array2;

    let samples = Samples::new(
        SampleValues::Real(Array2::from_elem((3, 1), 1.0)),
        vec![UVW::default(); 3],
        vec![(0, 1); 3],
    )
    .unwrap();
    let config = FlagConfig {
        grid: GridConfig::default(),
        group_mode: Default::default(),
        clip: Default::default(),
        wedge: Default::default(),
    };
    let outcome = flag_samples(&samples, &config, None, false).unwrap();
    let params = PlotParams {
        name: "x".to_string(),
        dir: PathBuf::from("."),
    };
    assert!(matches!(
        plot_diagnostics(&samples, &outcome, &params),
        Err(PlotError::NoPlottingFeature)
    ));
}
