//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - loaded from a JSON configuration file
//! - passed between the loader, the evaluator and the front-ends
//! - exported to JSON/CSV

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Scale applied to the D/H columns so values are quoted in units of 10^-5.
pub const DH_SCALE: f64 = 1.0e5;

/// What to do with a query that falls outside the tabulated grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BoundsPolicy {
    /// Continue the boundary spline pieces outside the grid (no rejection).
    #[default]
    Extrapolate,
    /// Return a log-likelihood of `-inf` outside the grid.
    Reject,
}

/// Configuration for one BBN likelihood instance.
///
/// Field names follow the option names accepted in the JSON file; the
/// `include_He` / `include_DH` spellings are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BbnConfig {
    /// Table location, absolute or relative to `path`.
    pub table_file: PathBuf,
    /// Base directory used to resolve a relative `table_file`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    pub ombh2_size: usize,
    pub deltaneff_size: usize,

    #[serde(default = "default_true", alias = "include_He")]
    pub include_he: bool,
    #[serde(default = "default_true", alias = "include_DH")]
    pub include_dh: bool,

    #[serde(default = "default_yp_mean")]
    pub yp_mean: f64,
    #[serde(default = "default_yp_err")]
    pub yp_err: f64,
    /// Measured D/H in units of 10^-5.
    #[serde(default = "default_dh_mean")]
    pub dh_mean: f64,
    #[serde(default = "default_dh_err")]
    pub dh_err: f64,

    #[serde(default)]
    pub bounds_policy: BoundsPolicy,
}

fn default_true() -> bool {
    true
}

fn default_yp_mean() -> f64 {
    0.2449
}

fn default_yp_err() -> f64 {
    0.0040
}

fn default_dh_mean() -> f64 {
    2.527
}

fn default_dh_err() -> f64 {
    0.030
}

impl BbnConfig {
    /// A config with default observations for the given table and grid shape.
    pub fn new(table_file: impl Into<PathBuf>, ombh2_size: usize, deltaneff_size: usize) -> Self {
        Self {
            table_file: table_file.into(),
            path: None,
            ombh2_size,
            deltaneff_size,
            include_he: true,
            include_dh: true,
            yp_mean: default_yp_mean(),
            yp_err: default_yp_err(),
            dh_mean: default_dh_mean(),
            dh_err: default_dh_err(),
            bounds_policy: BoundsPolicy::default(),
        }
    }

    /// Read a config from a JSON file.
    pub fn from_json_file(path: &std::path::Path) -> Result<Self, AppError> {
        let file = std::fs::File::open(path).map_err(|e| {
            AppError::io(format!("Failed to open config '{}': {e}", path.display()))
        })?;
        serde_json::from_reader(file).map_err(|e| {
            AppError::configuration(format!("Invalid config '{}': {e}", path.display()))
        })
    }

    /// The fixed observational constants carried by this config.
    pub fn observations(&self) -> Observations {
        Observations {
            include_he: self.include_he,
            include_dh: self.include_dh,
            yp_mean: self.yp_mean,
            yp_err: self.yp_err,
            dh_mean: self.dh_mean,
            dh_err: self.dh_err,
        }
    }

    /// Check the values that do not depend on the table contents.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.ombh2_size < 2 || self.deltaneff_size < 2 {
            return Err(AppError::configuration(format!(
                "Grid sizes must be >= 2 (got ombh2_size={}, deltaneff_size={}).",
                self.ombh2_size, self.deltaneff_size
            )));
        }
        self.observations().validate()
    }
}

/// Measured abundances and inclusion flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observations {
    pub include_he: bool,
    pub include_dh: bool,
    pub yp_mean: f64,
    pub yp_err: f64,
    pub dh_mean: f64,
    pub dh_err: f64,
}

impl Observations {
    pub fn validate(&self) -> Result<(), AppError> {
        for (name, v) in [("yp_mean", self.yp_mean), ("dh_mean", self.dh_mean)] {
            if !v.is_finite() {
                return Err(AppError::configuration(format!("`{name}` must be finite, got {v}.")));
            }
        }
        for (name, v) in [("yp_err", self.yp_err), ("dh_err", self.dh_err)] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(AppError::configuration(format!(
                    "`{name}` must be finite and >= 0, got {v}."
                )));
            }
        }
        Ok(())
    }
}

/// Interpolated BBN predictions at one `(ombh2, dneff)` point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Abundances {
    pub yp: f64,
    pub yp_sigma: f64,
    /// D/H in units of 10^-5.
    pub dh: f64,
    pub dh_sigma: f64,
}

/// Per-observable chi² contributions (0 when the observable is excluded).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Chi2Terms {
    pub helium: f64,
    pub deuterium: f64,
}

impl Chi2Terms {
    pub fn total(&self) -> f64 {
        self.helium + self.deuterium
    }
}

/// One evaluated point of a likelihood scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanPoint {
    pub ombh2: f64,
    pub dneff: f64,
    pub logp: f64,
}

/// Describes a loaded table (for `bbn info`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSummary {
    pub table_file: PathBuf,
    pub ombh2_size: usize,
    pub deltaneff_size: usize,
    pub ombh2_bounds: [f64; 2],
    pub dneff_bounds: [f64; 2],
    pub bounds_policy: BoundsPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_defaults_and_aliases() {
        let cfg: BbnConfig = serde_json::from_str(
            r#"{"table_file": "table.dat", "ombh2_size": 4, "deltaneff_size": 3, "include_He": false}"#,
        )
        .unwrap();
        assert!(!cfg.include_he);
        assert!(cfg.include_dh);
        assert_eq!(cfg.path, None);
        assert_eq!(cfg.bounds_policy, BoundsPolicy::Extrapolate);
        assert!((cfg.yp_mean - 0.2449).abs() < 1e-15);
    }

    #[test]
    fn validate_rejects_degenerate_grid() {
        let cfg = BbnConfig::new("t.dat", 1, 5);
        assert_eq!(cfg.validate().unwrap_err().kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn validate_rejects_negative_error() {
        let mut cfg = BbnConfig::new("t.dat", 3, 3);
        cfg.dh_err = -0.1;
        assert!(cfg.validate().is_err());
        cfg.dh_err = 0.0;
        assert!(cfg.validate().is_ok());
    }
}
