//! Shared evaluation logic used by the CLI subcommands.
//!
//! Keeping this in one place avoids duplicating the workflow:
//! config -> likelihood -> point evaluation / grid scan
//!
//! The subcommands can then focus on presentation (text vs JSON vs CSV).

use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{Abundances, BoundsPolicy, Chi2Terms, ScanPoint};
use crate::error::AppError;
use crate::likelihood::BbnLikelihood;

/// Everything computed for a single `bbn eval`.
#[derive(Debug, Clone, Serialize)]
pub struct EvalOutput {
    pub omega_b: f64,
    pub dneff: f64,
    pub inside_grid: bool,
    /// Outside the grid under [`BoundsPolicy::Reject`]; `chi2` is then not the
    /// quantity behind `logp`.
    pub rejected: bool,
    pub predicted: Abundances,
    pub chi2: Chi2Terms,
    pub logp: f64,
}

/// All evaluated points of a `bbn scan` plus the best one.
#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub points: Vec<ScanPoint>,
    pub best: Option<ScanPoint>,
}

/// Evaluate the likelihood at one point with a full breakdown.
pub fn run_eval(likelihood: &BbnLikelihood, omega_b: f64, dneff: f64) -> EvalOutput {
    let predicted = likelihood.predict(omega_b, dneff);
    let inside_grid = likelihood.contains(omega_b, dneff);
    EvalOutput {
        omega_b,
        dneff,
        inside_grid,
        rejected: !inside_grid && likelihood.bounds_policy() == BoundsPolicy::Reject,
        predicted,
        chi2: likelihood.chi2_terms(&predicted),
        logp: likelihood.log_likelihood(omega_b, dneff),
    }
}

/// Evaluate the likelihood on a regular grid spanning the table bounds.
///
/// Points are independent, so they are evaluated in parallel; the output order
/// is `dneff`-major, matching the table layout.
pub fn run_scan(likelihood: &BbnLikelihood, omega_b_steps: usize, dneff_steps: usize) -> Result<ScanOutput, AppError> {
    let [x0, x1] = likelihood.ombh2_bounds();
    let [y0, y1] = likelihood.dneff_bounds();
    let xs = lin_space(x0, x1, omega_b_steps)?;
    let ys = lin_space(y0, y1, dneff_steps)?;

    let points: Vec<ScanPoint> = ys
        .par_iter()
        .flat_map_iter(|&dneff| {
            xs.iter().map(move |&ombh2| ScanPoint {
                ombh2,
                dneff,
                logp: likelihood.log_likelihood(ombh2, dneff),
            })
        })
        .collect();

    let best = points
        .iter()
        .filter(|p| !p.logp.is_nan())
        .copied()
        .max_by(|a, b| a.logp.total_cmp(&b.logp));

    Ok(ScanOutput { points, best })
}

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(AppError::configuration(format!(
            "Invalid scan range: min={min}, max={max} (must be finite and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::configuration("Scan steps must be >= 2."));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    let mut out: Vec<f64> = (0..steps).map(|i| min + step * i as f64).collect();
    // Pin the far end so the scan hits the last grid node exactly.
    out[steps - 1] = max;
    Ok(out)
}
