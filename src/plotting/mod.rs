// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Diagnostic plots of a flagging run: histograms of each group's gridded
//! amplitudes, the gridded amplitudes in the uv plane, and which samples were
//! flagged.

mod error;
#[cfg(test)]
mod tests;

pub use error::PlotError;

use std::path::{Path, PathBuf};

use crate::{flagging::FlagOutcome, vis::Samples};

/// Where diagnostic plots are written. Each plot is named `<kind>_<name>`,
/// with a ".png" extension added if `name` doesn't have one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlotParams {
    pub(crate) name: String,
    pub(crate) dir: PathBuf,
}

impl PlotParams {
    pub(crate) fn path(&self, kind: &str) -> PathBuf {
        let mut name = format!("{kind}_{}", self.name);
        if Path::new(&name).extension().is_none() {
            name.push_str(".png");
        }
        self.dir.join(name)
    }
}

#[cfg(not(feature = "plotting"))]
pub(crate) fn plot_diagnostics(
    _samples: &Samples,
    _outcome: &FlagOutcome,
    _params: &PlotParams,
) -> Result<Vec<PathBuf>, PlotError> {
    Err(PlotError::NoPlottingFeature)
}

#[cfg(feature = "plotting")]
pub(crate) use plotting::plot_diagnostics;

#[cfg(feature = "plotting")]
mod plotting {
    use log::{debug, info};
    use plotters::{coord::Shift, prelude::*};

    use super::*;
    use crate::{
        flagging::ClipDiagnostics,
        math::{gaussian, Histogram},
        stats::clipped_histogram,
    };

    /// The size of each group's histogram.
    const HISTOGRAM_PIXELS: (u32, u32) = (800, 600);
    /// The size of the uv-plane plots.
    const MAP_PIXELS: (u32, u32) = (1600, 1600);
    /// The number of points on each Gaussian curve.
    const CURVE_POINTS: usize = 200;

    fn draw_err<E: std::error::Error + 'static>(e: E) -> PlotError {
        PlotError::Plotters(Box::new(e))
    }

    pub(crate) fn plot_diagnostics(
        samples: &Samples,
        outcome: &FlagOutcome,
        params: &PlotParams,
    ) -> Result<Vec<PathBuf>, PlotError> {
        std::fs::create_dir_all(&params.dir)?;
        let mut files = vec![];

        if !outcome.diagnostics.is_empty() {
            let file = params.path("histo");
            plot_histograms(&outcome.diagnostics, &file)?;
            files.push(file);
        }

        if !outcome.gridded.cells.is_empty() {
            let file = params.path("grid");
            plot_grid(outcome, &file)?;
            files.push(file);

            let file = params.path("select");
            plot_selection(samples, outcome, &file)?;
            files.push(file);
        }

        if files.is_empty() {
            return Err(PlotError::NothingToPlot);
        }
        for file in &files {
            info!("Wrote {}", file.display());
        }
        Ok(files)
    }

    fn plot_histograms(diagnostics: &[ClipDiagnostics], file: &Path) -> Result<(), PlotError> {
        let num_cols = (diagnostics.len() as f64).sqrt().ceil() as usize;
        let num_rows = (diagnostics.len() + num_cols - 1) / num_cols;
        debug!(
            "Plotting {} histograms on a {num_rows}x{num_cols} grid",
            diagnostics.len()
        );

        let root = BitMapBackend::new(
            file,
            (
                HISTOGRAM_PIXELS.0 * num_cols as u32,
                HISTOGRAM_PIXELS.1 * num_rows as u32,
            ),
        )
        .into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        for (diagnostic, area) in diagnostics
            .iter()
            .zip(root.split_evenly((num_rows, num_cols)))
        {
            plot_histogram(&area, diagnostic)?;
        }
        root.present().map_err(draw_err)?;
        Ok(())
    }

    /// Bars `(low edge, high edge, density)` of a histogram.
    fn density(histogram: &Histogram, num_values: usize) -> Vec<(f64, f64, f64)> {
        let norm = num_values as f64 * histogram.bin_width();
        histogram
            .edges
            .windows(2)
            .zip(&histogram.counts)
            .map(|(e, &c)| (e[0], e[1], if norm > 0.0 { c / norm } else { 0.0 }))
            .collect()
    }

    fn plot_histogram<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        diagnostic: &ClipDiagnostics,
    ) -> Result<(), PlotError>
    where
        DB::ErrorType: 'static,
    {
        let ClipDiagnostics {
            title,
            unclipped,
            clipped,
            statistics,
            ..
        } = diagnostic;

        let clipped_histogram = clipped_histogram(clipped);
        let (low, high) = unclipped
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if !(low.is_finite() && high.is_finite()) {
            area.fill(&RGBColor(220, 220, 220)).map_err(draw_err)?;
            return Ok(());
        }
        let unclipped_histogram = Histogram::new(
            unclipped,
            clipped_histogram.counts.len(),
            if low == high {
                (low - 0.5, high + 0.5)
            } else {
                (low, high)
            },
        );
        let clipped_bars = density(&clipped_histogram, clipped.len());
        let unclipped_bars = density(&unclipped_histogram, unclipped.len());

        let x_min = low.min(0.0);
        let x_max = unclipped_histogram
            .edges
            .last()
            .copied()
            .unwrap_or(1.0)
            .max(x_min + f64::EPSILON);
        let peak = clipped_bars.iter().map(|b| b.2).fold(0.0, f64::max);
        let y_max = unclipped_bars
            .iter()
            .map(|b| b.2)
            .fold(peak, f64::max)
            .max(f64::EPSILON)
            * 1.1;

        let mut cc = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(50)
            .build_cartesian_2d(x_min..x_max, 0.0..y_max)
            .map_err(draw_err)?;
        cc.configure_mesh()
            .light_line_style(&WHITE)
            .x_desc("Amplitude")
            .y_desc("PDF")
            .draw()
            .map_err(draw_err)?;

        for (bars, colour, label) in [
            (&clipped_bars, BLUE.mix(0.6), "Clipped"),
            (&unclipped_bars, RGBColor(255, 140, 0).mix(0.4), "Unclipped"),
        ] {
            cc.draw_series(
                bars.iter()
                    .map(|&(lo, hi, d)| Rectangle::new([(lo, 0.0), (hi, d)], colour.filled())),
            )
            .map_err(draw_err)?
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], colour.filled()));
        }

        // The candidate Gaussians, scaled to the peak of the clipped
        // histogram.
        let xs: Vec<f64> = (0..CURVE_POINTS)
            .map(|i| x_min + (x_max - x_min) * i as f64 / (CURVE_POINTS - 1) as f64)
            .collect();
        let mut curves = vec![
            ("calculated", statistics.mean, statistics.std, GREEN),
            ("mad", statistics.median, statistics.mad, MAGENTA),
        ];
        if let Some(fit) = statistics.fit {
            curves.push(("fitted", fit.centre, fit.sigma, RED));
        }
        for (label, centre, sigma, colour) in curves {
            if !(centre.is_finite() && sigma.is_finite() && sigma > 0.0) {
                continue;
            }
            let ys: Vec<f64> = xs.iter().map(|&x| gaussian(x, centre, 1.0, sigma)).collect();
            let max = ys.iter().copied().fold(0.0, f64::max);
            if max <= 0.0 {
                continue;
            }
            cc.draw_series(LineSeries::new(
                xs.iter().zip(ys).map(|(&x, y)| (x, y / max * peak)),
                colour.stroke_width(2),
            ))
            .map_err(draw_err)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], colour.stroke_width(2)));
        }

        let (lower, upper) = diagnostic.std_thresholds();
        for (label, x, colour) in [
            (format!("Lower threshold = {lower:.1}"), lower, BLACK),
            (format!("Upper threshold = {upper:.1}"), upper, RED),
        ] {
            if !x.is_finite() {
                continue;
            }
            cc.draw_series(LineSeries::new([(x, 0.0), (x, y_max)], colour))
            .map_err(draw_err)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], colour));
        }

        cc.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;
        Ok(())
    }

    /// Map a fraction in [0, 1] from white to a dark blue.
    pub(super) fn colour_scale(frac: f64) -> RGBColor {
        let frac = if frac.is_finite() {
            frac.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let lerp = |from: f64, to: f64| (from + (to - from) * frac).round() as u8;
        RGBColor(lerp(255.0, 20.0), lerp(255.0, 30.0), lerp(255.0, 90.0))
    }

    fn uv_ranges(outcome: &FlagOutcome) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
        let gridded = &outcome.gridded;
        let (u0, v0) = gridded.origin;
        (
            u0..u0 + gridded.dims.0 as f64 * gridded.duv,
            v0..v0 + gridded.dims.1 as f64 * gridded.duv,
        )
    }

    fn plot_grid(outcome: &FlagOutcome, file: &Path) -> Result<(), PlotError> {
        let gridded = &outcome.gridded;
        let (data_min, data_max) = gridded
            .cells
            .iter()
            .map(|c| c.value)
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        let (vmin, vmax) = match outcome.diagnostics.first() {
            Some(d) => {
                let (lower, upper) = d.std_thresholds();
                (data_min.max(lower), data_max.min(upper))
            }
            None => (data_min, data_max),
        };
        let span = if vmax > vmin { vmax - vmin } else { 1.0 };

        let root = BitMapBackend::new(file, MAP_PIXELS).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        let (u_range, v_range) = uv_ranges(outcome);
        let mut cc = ChartBuilder::on(&root)
            .caption("Gridded amplitudes", ("sans-serif", 40))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(u_range, v_range)
            .map_err(draw_err)?;
        cc.configure_mesh()
            .disable_mesh()
            .x_desc("u [λ]")
            .y_desc("v [λ]")
            .draw()
            .map_err(draw_err)?;

        let half = gridded.duv / 2.0;
        cc.draw_series(gridded.cells.iter().filter(|c| c.value.is_finite()).map(|c| {
            let (u, v) = c.centre;
            Rectangle::new(
                [(u - half, v - half), (u + half, v + half)],
                colour_scale((c.value - vmin) / span).filled(),
            )
        }))
        .map_err(draw_err)?;
        root.present().map_err(draw_err)?;
        Ok(())
    }

    fn plot_selection(
        samples: &Samples,
        outcome: &FlagOutcome,
        file: &Path,
    ) -> Result<(), PlotError> {
        let root = BitMapBackend::new(file, MAP_PIXELS).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        let (u_range, v_range) = uv_ranges(outcome);
        let in_range = |u: f64, v: f64| u_range.contains(&u) && v_range.contains(&v);
        let mut cc = ChartBuilder::on(&root)
            .caption("Flagged samples", ("sans-serif", 40))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(u_range.clone(), v_range.clone())
            .map_err(draw_err)?;
        cc.configure_mesh()
            .disable_mesh()
            .x_desc("u [λ]")
            .y_desc("v [λ]")
            .draw()
            .map_err(draw_err)?;

        let orange = RGBColor(255, 140, 0).mix(0.1);
        cc.draw_series(
            outcome
                .wedges
                .iter()
                .map(|w| Polygon::new(w.vertices.clone(), orange.filled())),
        )
        .map_err(draw_err)?;

        let points = move |want_flagged: bool| {
            samples
                .uvws
                .iter()
                .zip(&outcome.mask)
                .filter(move |(_, &f)| f == want_flagged)
                .map(|(uvw, _)| (uvw.u, uvw.v))
                .filter(move |&(u, v)| in_range(u, v))
        };
        cc.draw_series(points(false).map(|p| Circle::new(p, 1, BLUE.filled())))
            .map_err(draw_err)?
            .label("Not flagged")
            .legend(|(x, y)| Circle::new((x, y), 4, BLUE.filled()));
        cc.draw_series(points(true).map(|p| Circle::new(p, 1, RED.filled())))
            .map_err(draw_err)?
            .label("Flagged")
            .legend(|(x, y)| Circle::new((x, y), 4, RED.filled()));
        if !outcome.wedges.is_empty() {
            cc.draw_series(
                samples
                    .uvws
                    .iter()
                    .zip(&outcome.clip_mask)
                    .filter(|(_, &f)| f)
                    .map(|(uvw, _)| Circle::new((uvw.u, uvw.v), 1, GREEN.filled())),
            )
            .map_err(draw_err)?
            .label("Flagged before wedges")
            .legend(|(x, y)| Circle::new((x, y), 4, GREEN.filled()));
        }

        cc.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;
        root.present().map_err(draw_err)?;
        Ok(())
    }
}
