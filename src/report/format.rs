//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the likelihood code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::{EvalOutput, ScanOutput};
use crate::domain::{GridSummary, Observations};

/// Format a single-point evaluation with its chi² breakdown.
pub fn format_eval(out: &EvalOutput, obs: &Observations) -> String {
    let mut s = String::new();

    s.push_str("=== bbn - BBN abundance likelihood ===\n");
    s.push_str(&format!("Point: omega_b={:.6} | dneff={:.4}", out.omega_b, out.dneff));
    if out.rejected {
        s.push_str(" (outside table grid, rejected)");
    } else if !out.inside_grid {
        s.push_str(" (outside table grid)");
    }
    s.push('\n');

    s.push_str("\nObservable   predicted          measured           chi2\n");
    s.push_str(&format!(
        "Yp           {:.5} ± {:.5}  {:.5} ± {:.5}  {}\n",
        out.predicted.yp,
        out.predicted.yp_sigma,
        obs.yp_mean,
        obs.yp_err,
        term_label(obs.include_he, out.chi2.helium),
    ));
    s.push_str(&format!(
        "D/H (1e-5)   {:.4} ± {:.4}    {:.4} ± {:.4}    {}\n",
        out.predicted.dh,
        out.predicted.dh_sigma,
        obs.dh_mean,
        obs.dh_err,
        term_label(obs.include_dh, out.chi2.deuterium),
    ));

    if out.rejected {
        s.push_str(&format!("\nchi2 = rejected\nlogp = {}\n", out.logp));
    } else {
        s.push_str(&format!("\nchi2 = {:.6}\nlogp = {:.6}\n", out.chi2.total(), out.logp));
    }
    s
}

fn term_label(included: bool, chi2: f64) -> String {
    if included {
        format!("{chi2:.4}")
    } else {
        "excluded".to_string()
    }
}

/// Format the outcome of a likelihood scan.
pub fn format_scan(scan: &ScanOutput, summary: &GridSummary) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "Scanned {} points over omega_b=[{:.5}, {:.5}] x dneff=[{:.3}, {:.3}]\n",
        scan.points.len(),
        summary.ombh2_bounds[0],
        summary.ombh2_bounds[1],
        summary.dneff_bounds[0],
        summary.dneff_bounds[1],
    ));
    match &scan.best {
        Some(best) => s.push_str(&format!(
            "Best: omega_b={:.6} | dneff={:.4} | logp={:.6}\n",
            best.ombh2, best.dneff, best.logp
        )),
        None => s.push_str("Best: n/a (no finite log-likelihood)\n"),
    }
    s
}

/// Format a table summary.
pub fn format_info(summary: &GridSummary) -> String {
    format!(
        "Table: {}\nGrid: {} (omega_b) x {} (dneff)\nomega_b bounds: [{}, {}]\ndneff bounds: [{}, {}]\nOut-of-grid: {:?}\n",
        summary.table_file.display(),
        summary.ombh2_size,
        summary.deltaneff_size,
        summary.ombh2_bounds[0],
        summary.ombh2_bounds[1],
        summary.dneff_bounds[0],
        summary.dneff_bounds[1],
        summary.bounds_policy,
    )
}
