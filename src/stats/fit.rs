// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A Levenberg-Marquardt least-squares fit of a Gaussian
//! `A * exp(-0.5 * ((x - c) / σ)^2)` to (x, y) points.

use crate::math::gaussian;

/// Configuration for the optimiser.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LMConfig {
    pub(crate) max_iterations: usize,

    /// The fit has converged when no parameter changes by more than this
    /// (relative to its magnitude) in an accepted step.
    pub(crate) convergence_threshold: f64,

    pub(crate) initial_lambda: f64,
    pub(crate) lambda_up: f64,
    pub(crate) lambda_down: f64,
}

impl Default for LMConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            convergence_threshold: 1e-10,
            initial_lambda: 0.001,
            lambda_up: 10.0,
            lambda_down: 0.1,
        }
    }
}

/// The parameters are `[centre, amplitude, sigma]`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LMResult {
    pub(crate) params: [f64; 3],
    pub(crate) chi2: f64,
    pub(crate) converged: bool,
    pub(crate) iterations: usize,
}

fn jacobian_row(x: f64, [centre, amplitude, sigma]: &[f64; 3]) -> [f64; 3] {
    let z = (x - centre) / sigma;
    let e = (-0.5 * z * z).exp();
    [amplitude * e * z / sigma, e, amplitude * e * z * z / sigma]
}

fn chi2(xs: &[f64], ys: &[f64], [centre, amplitude, sigma]: &[f64; 3]) -> f64 {
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| (y - gaussian(x, *centre, *amplitude, *sigma)).powi(2))
        .sum()
}

/// Solve a 3x3 system with Gaussian elimination and partial pivoting.
#[allow(clippy::needless_range_loop)]
fn solve(a: &[[f64; 3]; 3], b: &[f64; 3]) -> Option<[f64; 3]> {
    let mut m = [[0.0; 4]; 3];
    for i in 0..3 {
        m[i][..3].copy_from_slice(&a[i]);
        m[i][3] = b[i];
    }
    for col in 0..3 {
        let pivot = (col..3).max_by(|&i, &j| m[i][col].abs().total_cmp(&m[j][col].abs()))?;
        if m[pivot][col].abs() < 1e-300 {
            return None;
        }
        m.swap(col, pivot);
        for row in col + 1..3 {
            let factor = m[row][col] / m[col][col];
            for k in col..4 {
                m[row][k] -= factor * m[col][k];
            }
        }
    }
    let mut x = [0.0; 3];
    for i in (0..3).rev() {
        let mut sum = m[i][3];
        for j in i + 1..3 {
            sum -= m[i][j] * x[j];
        }
        x[i] = sum / m[i][i];
    }
    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}

/// Fit a Gaussian to the points, starting at `initial_params`. A fit that
/// stalls because the damping can't find a better step is at a minimum and is
/// considered converged; running out of iterations or a singular system is
/// not.
pub(crate) fn fit_gaussian(
    xs: &[f64],
    ys: &[f64],
    initial_params: [f64; 3],
    config: &LMConfig,
) -> LMResult {
    let mut params = initial_params;
    let mut lambda = config.initial_lambda;
    let mut prev_chi2 = chi2(xs, ys, &params);
    let mut converged = false;
    let mut iterations = 0;

    if !prev_chi2.is_finite() {
        return LMResult {
            params,
            chi2: prev_chi2,
            converged,
            iterations,
        };
    }

    for iter in 0..config.max_iterations {
        iterations = iter + 1;

        let mut hessian = [[0.0; 3]; 3];
        let mut gradient = [0.0; 3];
        for (&x, &y) in xs.iter().zip(ys) {
            let row = jacobian_row(x, &params);
            let r = y - gaussian(x, params[0], params[1], params[2]);
            for i in 0..3 {
                gradient[i] += row[i] * r;
                for j in 0..3 {
                    hessian[i][j] += row[i] * row[j];
                }
            }
        }
        for (i, row) in hessian.iter_mut().enumerate() {
            row[i] *= 1.0 + lambda;
        }

        let Some(delta) = solve(&hessian, &gradient) else {
            break;
        };

        let mut new_params = params;
        for (p, d) in new_params.iter_mut().zip(delta.iter()) {
            *p += d;
        }
        let new_chi2 = chi2(xs, ys, &new_params);

        if new_chi2 < prev_chi2 {
            params = new_params;
            lambda *= config.lambda_down;
            prev_chi2 = new_chi2;

            let max_delta = delta
                .iter()
                .zip(params.iter())
                .fold(0.0f64, |a, (d, p)| a.max(d.abs() / p.abs().max(1e-300)));
            if max_delta < config.convergence_threshold || prev_chi2 == 0.0 {
                converged = true;
                break;
            }
        } else {
            lambda *= config.lambda_up;
            if lambda > 1e10 {
                converged = true;
                break;
            }
        }
    }

    LMResult {
        params,
        chi2: prev_chi2,
        converged,
        iterations,
    }
}
