// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use marlu::UVW;
use ndarray::prelude::*;

use super::*;
use crate::{constants::PI, stats::ThresholdMode, vis::SampleValues};

/// A grid whose cells are 10 wavelengths wide.
fn get_grid_config() -> GridConfig {
    GridConfig {
        imsize: 1,
        cell_arcsec: 64800.0 / PI,
        uvmin: 0.0,
        uvmax: None,
    }
}

fn make_samples(values: Vec<f64>, uvs: &[(f64, f64)], pairs: Vec<(usize, usize)>) -> Samples {
    let num = values.len();
    Samples::new(
        SampleValues::Real(Array2::from_shape_vec((num, 1), values).unwrap()),
        uvs.iter().map(|&(u, v)| UVW { u, v, w: 0.0 }).collect(),
        pairs,
    )
    .unwrap()
}

/// Samples that are each in their own cell.
fn spread_samples(values: Vec<f64>) -> Samples {
    let num = values.len();
    let uvs: Vec<(f64, f64)> = (0..num).map(|i| (10.0 * i as f64 + 1.5, 5.0)).collect();
    make_samples(values, &uvs, vec![(0, 1); num])
}

fn num_flagged(mask: &[bool]) -> usize {
    mask.iter().filter(|&&m| m).count()
}

fn clip_all(samples: &Samples, config: &ClipConfig, unflag: Option<&[bool]>) -> ClipOutcome {
    let gridded = grid_samples(samples, &get_grid_config()).unwrap();
    clip_group(
        &gridded,
        &vec![false; samples.len()],
        unflag,
        config,
        "test",
        true,
    )
}

/// 4 antennas, 20 times. The noise is uniform within 1 +/- 0.1, and the
/// baselines of antenna 0 are 50 brighter at times 5 and 12.
fn contaminated_array() -> (Samples, Vec<bool>) {
    let baselines = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];
    let num_times = 20;
    let mut values = vec![];
    let mut pairs = vec![];
    let mut uvs = vec![];
    let mut contaminated = vec![];
    for i_time in 0..num_times {
        for (i_bl, &pair) in baselines.iter().enumerate() {
            let k = i_time * baselines.len() + i_bl;
            let noise = 0.9 + 0.2 * ((k * 7919) % 120) as f64 / 119.0;
            let is_bad = pair.0 == 0 && (i_time == 5 || i_time == 12);
            values.push(if is_bad { noise + 50.0 } else { noise });
            pairs.push(pair);
            uvs.push((10.0 * k as f64 + 1.5, 5.0));
            contaminated.push(is_bad);
        }
    }
    (make_samples(values, &uvs, pairs), contaminated)
}

/// 8 antennas, 20 times. Baselines without antenna 0 are spread over
/// [0, 0.99], and antenna 0's baselines are within [1.0, 1.01] except at times
/// 5 and 12, where they're 1.5.
fn diluted_array() -> (Samples, Vec<bool>) {
    let num_antennas = 8;
    let baselines: Vec<(usize, usize)> = (0..num_antennas)
        .flat_map(|a1| (a1 + 1..num_antennas).map(move |a2| (a1, a2)))
        .collect();
    let num_times = 20;
    let mut values = vec![];
    let mut pairs = vec![];
    let mut uvs = vec![];
    let mut contaminated = vec![];
    for i_time in 0..num_times {
        for (i_bl, &pair) in baselines.iter().enumerate() {
            let k = i_time * baselines.len() + i_bl;
            let frac = ((k * 7919) % 557) as f64 / 556.0;
            let is_bad = pair.0 == 0 && (i_time == 5 || i_time == 12);
            values.push(if pair.0 != 0 {
                0.99 * frac
            } else if is_bad {
                1.5
            } else {
                1.0 + 0.01 * frac
            });
            pairs.push(pair);
            uvs.push((10.0 * k as f64 + 1.5, 5.0));
            contaminated.push(is_bad);
        }
    }
    (make_samples(values, &uvs, pairs), contaminated)
}

#[test]
fn test_fixed_threshold_boundary_is_flagged() {
    let samples = spread_samples(vec![0.0; 5]);
    let config = ClipConfig {
        threshold: 0.0,
        mode: ThresholdMode::Fixed,
    };
    let outcome = clip_all(&samples, &config, None);
    assert_eq!(outcome.mask, vec![true; 5]);
}

#[test]
fn test_equal_values_flag_nothing() {
    let samples = spread_samples(vec![2.0; 10]);
    for mode in [ThresholdMode::Std, ThresholdMode::Mad, ThresholdMode::Fit] {
        let config = ClipConfig {
            threshold: 5.0,
            mode,
        };
        let outcome = clip_all(&samples, &config, None);
        assert_eq!(num_flagged(&outcome.mask), 0, "{mode}");
        // Diagnostics are still available.
        assert!(outcome.diagnostics.is_some());
    }
}

#[test]
fn test_insufficient_data_flags_nothing() {
    let samples = spread_samples(vec![1.0, 100.0]);
    let config = ClipConfig {
        threshold: 0.0,
        mode: ThresholdMode::Fixed,
    };
    let outcome = clip_all(&samples, &config, None);
    assert_eq!(outcome.mask, vec![false, false]);
    assert!(outcome.diagnostics.is_none());
}

#[test]
fn test_clip_is_idempotent() {
    let (samples, _) = contaminated_array();
    let config = ClipConfig {
        threshold: 5.0,
        mode: ThresholdMode::Fit,
    };
    let first = clip_all(&samples, &config, None);
    let second = clip_all(&samples, &config, None);
    assert_eq!(first.mask, second.mask);
}

#[test]
fn test_increasing_threshold_never_flags_more() {
    let values = (0..50).map(|i| (i as f64 * 0.37).sin().abs() * 10.0).collect();
    let samples = spread_samples(values);
    let mut previous = usize::MAX;
    for threshold in [0.0, 1.0, 2.5, 5.0, 7.5, 9.9, 20.0] {
        let config = ClipConfig {
            threshold,
            mode: ThresholdMode::Fixed,
        };
        let n = num_flagged(&clip_all(&samples, &config, None).mask);
        assert!(n <= previous, "threshold {threshold}: {n} > {previous}");
        previous = n;
    }
    assert_eq!(previous, 0);
}

#[test]
fn test_unflag_is_respected() {
    let samples = spread_samples(vec![1.0, 2.0, 3.0, 4.0]);
    let config = ClipConfig {
        threshold: 2.0,
        mode: ThresholdMode::Fixed,
    };
    let unflag = [false, false, true, false];
    let outcome = clip_all(&samples, &config, Some(&unflag[..]));
    assert_eq!(outcome.mask, vec![false, true, false, true]);
}

#[test]
fn test_cells_are_counted_once() {
    // Samples 0 and 1 share a cell.
    let samples = make_samples(
        vec![1.0, 1.0, 2.0, 3.0],
        &[(1.0, 1.0), (2.0, 2.0), (15.0, 1.0), (25.0, 1.0)],
        vec![(0, 1), (0, 2), (0, 3), (1, 2)],
    );
    let config = ClipConfig {
        threshold: 5.0,
        mode: ThresholdMode::Std,
    };
    let outcome = clip_all(&samples, &config, None);
    let diagnostics = outcome.diagnostics.unwrap();
    assert_eq!(diagnostics.statistics.num_points, 3);
    assert_eq!(diagnostics.unclipped.len(), 3);
}

#[test]
fn test_ignored_samples_dont_contribute() {
    let samples = spread_samples(vec![1.0, 2.0, 3.0, 100.0]);
    let gridded = grid_samples(&samples, &get_grid_config()).unwrap();
    let config = ClipConfig {
        threshold: 5.0,
        mode: ThresholdMode::Std,
    };
    let outcome = clip_group(
        &gridded,
        &[false, false, false, true],
        None,
        &config,
        "test",
        true,
    );
    let diagnostics = outcome.diagnostics.unwrap();
    assert_eq!(diagnostics.statistics.num_points, 3);
    // Ignored samples are still flagged if they're bright.
    assert_eq!(outcome.mask, vec![false, false, false, true]);
}

#[test]
fn test_make_groups() {
    let samples = make_samples(
        vec![1.0; 5],
        &[(1.0, 1.0); 5],
        vec![(0, 1), (1, 0), (2, 2), (1, 2), (0, 1)],
    );

    let groups = group::make_groups(&samples, GroupMode::All);
    assert_eq!(groups.len(), 1);
    assert!(groups[0].ignore.iter().all(|i| !i));

    let groups = group::make_groups(&samples, GroupMode::Antenna);
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].ignore, vec![false, false, true, true, false]);
    assert_eq!(groups[2].ignore, vec![true, true, false, false, true]);

    // The auto-correlation makes no group, and (1, 0) is the same as (0, 1).
    let groups = group::make_groups(&samples, GroupMode::Baseline);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].ignore, vec![false, false, true, true, false]);
    assert_eq!(groups[1].ignore, vec![true, true, true, false, true]);
    assert_eq!(groups[1].title, "Baseline 1 - 2");
}

#[test]
fn test_contaminated_antenna_is_flagged() {
    let (samples, contaminated) = contaminated_array();
    let gridded = grid_samples(&samples, &get_grid_config()).unwrap();
    assert_eq!(gridded.cells.len(), samples.len());
    let config = ClipConfig {
        threshold: 5.0,
        mode: ThresholdMode::Std,
    };
    for mode in [GroupMode::Antenna, GroupMode::Baseline] {
        let outcome = clip_groups(&samples, &gridded, mode, None, &config, false);
        assert_eq!(outcome.mask, contaminated, "{mode}");
        assert!(outcome.diagnostics.is_empty());
    }
    assert_eq!(num_flagged(&contaminated), 6);
}

#[test]
fn test_antenna_mode_finds_what_all_mode_misses() {
    let (samples, contaminated) = diluted_array();
    let gridded = grid_samples(&samples, &get_grid_config()).unwrap();
    assert_eq!(gridded.cells.len(), samples.len());
    assert_eq!(num_flagged(&contaminated), 14);
    for threshmode in [ThresholdMode::Std, ThresholdMode::Mad] {
        let config = ClipConfig {
            threshold: 5.0,
            mode: threshmode,
        };
        // Against the whole array, antenna 0's excess is within the noise.
        let outcome = clip_groups(&samples, &gridded, GroupMode::All, None, &config, false);
        assert_eq!(num_flagged(&outcome.mask), 0, "{threshmode}");

        let outcome = clip_groups(&samples, &gridded, GroupMode::Antenna, None, &config, false);
        assert_eq!(outcome.mask, contaminated, "{threshmode}");
    }
}

#[test]
fn test_group_diagnostics_are_ordered() {
    let (samples, _) = contaminated_array();
    let gridded = grid_samples(&samples, &get_grid_config()).unwrap();
    let config = ClipConfig {
        threshold: 5.0,
        mode: ThresholdMode::Std,
    };
    let outcome = clip_groups(&samples, &gridded, GroupMode::Antenna, None, &config, true);
    let titles: Vec<&str> = outcome
        .diagnostics
        .iter()
        .map(|d| d.title.as_str())
        .collect();
    assert_eq!(
        titles,
        vec!["Antenna 0", "Antenna 1", "Antenna 2", "Antenna 3"]
    );
}

#[test]
fn test_wedge_contains_its_own_point() {
    let config = WedgeConfig {
        radrange: 10.0,
        angle_deg: 10.0,
    };
    for (u, v) in [(0.0, 100.0), (-30.0, 40.0), (250.0, -7.5), (-3.0, -3.0)] {
        let wedge = Wedge::new(u, v, &config);
        assert_eq!(wedge.vertices.len(), 200);
        assert!(wedge.contains(u, v), "({u}, {v})");
    }
}

#[test]
fn test_wide_wedge_contains_its_own_point() {
    // The flagged point is midway between two arc vertices, and the outer arc
    // is only half a wavelength beyond it.
    let config = WedgeConfig {
        radrange: 1.0,
        angle_deg: 180.0,
    };
    for (u, v) in [(10000.0, 0.0), (0.0, -10000.0), (7071.0, 7071.0)] {
        let wedge = Wedge::new(u, v, &config);
        assert!(wedge.contains(u, v), "({u}, {v})");
    }
    let wedge = Wedge::new(10000.0, 0.0, &config);
    assert!(wedge.contains(10000.45, 0.0));
    assert!(!wedge.contains(10000.6, 0.0));
    assert!(!wedge.contains(9997.0, 0.0));

    // Nor does any other radius or angle lose its own point.
    for radrange in [0.01, 1.0, 100.0] {
        for angle_deg in [0.5, 10.0, 90.0, 180.0, 300.0] {
            let config = WedgeConfig { radrange, angle_deg };
            for (u, v) in [(10000.0, 0.0), (-3.0, 4.0), (0.0, 0.0)] {
                let wedge = Wedge::new(u, v, &config);
                assert!(wedge.contains(u, v), "({u}, {v}) {radrange} {angle_deg}");
            }
        }
    }
}

#[test]
fn test_wedge_extent() {
    let config = WedgeConfig {
        radrange: 10.0,
        angle_deg: 10.0,
    };
    let wedge = Wedge::new(0.0, 100.0, &config);
    assert!(wedge.contains(0.0, 104.0));
    assert!(wedge.contains(0.0, 96.0));
    assert!(!wedge.contains(0.0, 106.0));
    assert!(!wedge.contains(0.0, 94.0));
    // 4 degrees off axis is inside, 6 degrees is not.
    let off_axis = |deg: f64| (100.0 * deg.to_radians().sin(), 100.0 * deg.to_radians().cos());
    let (u, v) = off_axis(4.0);
    assert!(wedge.contains(u, v));
    let (u, v) = off_axis(-4.0);
    assert!(wedge.contains(u, v));
    let (u, v) = off_axis(6.0);
    assert!(!wedge.contains(u, v));
    assert!(!wedge.contains(0.0, -100.0));
    assert!(!wedge.contains(100.0, 0.0));
}

#[test]
fn test_wedge_inner_radius_is_clamped() {
    let config = WedgeConfig {
        radrange: 10.0,
        angle_deg: 90.0,
    };
    let wedge = Wedge::new(0.0, 2.0, &config);
    assert!(wedge.contains(0.0, 0.5));
    assert!(wedge.contains(0.0, 6.5));
    assert!(!wedge.contains(0.0, -0.5));
}

#[test]
fn test_expand_wedges() {
    let samples = make_samples(
        vec![1.0; 5],
        &[
            (0.0, 100.0),
            (0.0, 104.0),
            (0.0, 108.0),
            (0.0, -100.0),
            (2.0, 99.0),
        ],
        vec![(0, 1); 5],
    );
    let config = WedgeConfig {
        radrange: 10.0,
        angle_deg: 10.0,
    };
    let mask = [true, false, false, false, false];
    let outcome = expand_wedges(&samples, &mask, &config, None);
    // Sample 2 is in sample 1's wedge, but wedge flags don't make wedges.
    assert_eq!(outcome.mask, vec![true, true, false, false, true]);
    assert_eq!(outcome.wedges.len(), 1);

    let unflag = [false, false, false, false, true];
    let outcome = expand_wedges(&samples, &mask, &config, Some(&unflag[..]));
    assert_eq!(outcome.mask, vec![true, true, false, false, false]);

    let disabled = WedgeConfig {
        radrange: 10.0,
        angle_deg: 0.0,
    };
    let outcome = expand_wedges(&samples, &mask, &disabled, None);
    assert_eq!(outcome.mask, mask.to_vec());
    assert!(outcome.wedges.is_empty());
}

#[test]
fn test_flag_samples() {
    let (samples, contaminated) = contaminated_array();
    let config = FlagConfig {
        grid: get_grid_config(),
        group_mode: GroupMode::Antenna,
        clip: ClipConfig {
            threshold: 5.0,
            mode: ThresholdMode::Std,
        },
        wedge: WedgeConfig::default(),
    };
    let outcome = flag_samples(&samples, &config, None, false).unwrap();
    assert_eq!(outcome.mask, contaminated);
    assert_eq!(outcome.clip_mask, contaminated);

    // Nothing is flagged if every sample is protected.
    let unflag = vec![true; samples.len()];
    let outcome = flag_samples(&samples, &config, Some(unflag.as_slice()), false).unwrap();
    assert_eq!(num_flagged(&outcome.mask), 0);

    let result = flag_samples(&samples, &config, Some(&[true][..]), false);
    assert!(matches!(
        result,
        Err(FlagError::MaskLength {
            what: "unflag",
            got: 1,
            ..
        })
    ));

    let mut bad = config;
    bad.clip.threshold = f64::NAN;
    assert!(matches!(
        flag_samples(&samples, &bad, None, false),
        Err(FlagError::BadThreshold(_))
    ));

    let mut bad = config;
    bad.grid.imsize = 0;
    assert!(matches!(
        flag_samples(&samples, &bad, None, false),
        Err(FlagError::Grid(_))
    ));
}
