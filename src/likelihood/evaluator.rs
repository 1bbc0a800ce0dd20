//! The BBN likelihood: interpolated abundances compared with measured ones.
//!
//! Construction reads the table once and builds four bicubic surfaces over
//! `(ombh2, dneff)`: Yp, sigma(Yp), D/H and sigma(D/H). After that the
//! likelihood is immutable and every evaluation is a pure function of its
//! inputs, so one instance can be shared across threads.
//!
//! For each included observable:
//!
//! ```text
//! chi2 += (pred - mean)^2 / (sigma_pred^2 + sigma_obs^2)
//! logp  = -chi2 / 2
//! ```

use nalgebra::DMatrix;
use tracing::debug;

use crate::domain::{Abundances, BbnConfig, BoundsPolicy, Chi2Terms, GridSummary, Observations};
use crate::error::AppError;
use crate::io::table::{TableGrid, TableLocation, base_dir_from_env, load_table_grid, resolve_table_path};
use crate::likelihood::source::ParameterSource;
use crate::math::BicubicSpline;

/// Parameter names the likelihood reads from a [`ParameterSource`].
pub const REQUIREMENTS: [&str; 2] = ["omega_b", "dneff"];

#[derive(Debug, Clone)]
pub struct BbnLikelihood {
    location: TableLocation,
    yp: BicubicSpline,
    yp_sigma: BicubicSpline,
    dh: BicubicSpline,
    dh_sigma: BicubicSpline,
    ombh2_bounds: [f64; 2],
    dneff_bounds: [f64; 2],
    observations: Observations,
    bounds_policy: BoundsPolicy,
}

impl BbnLikelihood {
    /// Resolve and read the configured table and build the interpolants.
    ///
    /// A relative `table_file` is resolved against `config.path`, falling back
    /// to the `BBN_PATH` environment variable.
    pub fn initialize(config: &BbnConfig) -> Result<Self, AppError> {
        config.validate()?;

        let base = config.path.clone().or_else(base_dir_from_env);
        let location = resolve_table_path(&config.table_file, base.as_deref())?;
        let grid = load_table_grid(&location, config.ombh2_size, config.deltaneff_size)?;

        Self::from_grid(grid, location, config.observations(), config.bounds_policy)
    }

    /// Build from an already reshaped table.
    pub fn from_grid(
        grid: TableGrid,
        location: TableLocation,
        observations: Observations,
        bounds_policy: BoundsPolicy,
    ) -> Result<Self, AppError> {
        observations.validate()?;

        let TableGrid {
            ombh2,
            deltaneff,
            yp,
            yp_sigma,
            dh,
            dh_sigma,
        } = grid;

        let surface = |name: &str, z: DMatrix<f64>| {
            BicubicSpline::new(&ombh2, &deltaneff, z).ok_or_else(|| {
                AppError::malformed_table(format!(
                    "Could not build the {name} interpolant from {}.",
                    location.file.display()
                ))
            })
        };

        let yp = surface("Yp", yp)?;
        let yp_sigma = surface("sigma(Yp)", yp_sigma)?;
        let dh = surface("D/H", dh)?;
        let dh_sigma = surface("sigma(D/H)", dh_sigma)?;

        // `surface` succeeded, so both axes have at least two ascending knots.
        let ombh2_bounds = [ombh2[0], ombh2[ombh2.len() - 1]];
        let dneff_bounds = [deltaneff[0], deltaneff[deltaneff.len() - 1]];
        debug!(?ombh2_bounds, ?dneff_bounds, "BBN interpolants ready");

        Ok(Self {
            location,
            yp,
            yp_sigma,
            dh,
            dh_sigma,
            ombh2_bounds,
            dneff_bounds,
            observations,
            bounds_policy,
        })
    }

    /// Names of the parameters [`Self::logp`] reads.
    pub fn requirements() -> &'static [&'static str] {
        &REQUIREMENTS
    }

    /// Log-likelihood at the point supplied by `source`.
    pub fn logp<S: ParameterSource + ?Sized>(&self, source: &S) -> Result<f64, AppError> {
        let [omega_b, dneff] = REQUIREMENTS;
        let ombh2 = source.param(omega_b).ok_or_else(|| AppError::missing_parameter(omega_b))?;
        let delta_neff = source.param(dneff).ok_or_else(|| AppError::missing_parameter(dneff))?;
        Ok(self.log_likelihood(ombh2, delta_neff))
    }

    /// Log-likelihood (`-chi2 / 2`, unnormalized) at `(ombh2, delta_neff)`.
    ///
    /// Returns 0 when neither observable is included. Outside the grid the
    /// result depends on the bounds policy: extrapolated, or `-inf`.
    pub fn log_likelihood(&self, ombh2: f64, delta_neff: f64) -> f64 {
        if !self.contains(ombh2, delta_neff) {
            debug!(ombh2, delta_neff, policy = ?self.bounds_policy, "query outside BBN grid");
            if self.bounds_policy == BoundsPolicy::Reject {
                return f64::NEG_INFINITY;
            }
        }
        let predicted = self.predict(ombh2, delta_neff);
        -0.5 * self.chi2_terms(&predicted).total()
    }

    /// Interpolated abundances and their theory uncertainties.
    pub fn predict(&self, ombh2: f64, delta_neff: f64) -> Abundances {
        Abundances {
            yp: self.yp.eval(ombh2, delta_neff),
            yp_sigma: self.yp_sigma.eval(ombh2, delta_neff),
            dh: self.dh.eval(ombh2, delta_neff),
            dh_sigma: self.dh_sigma.eval(ombh2, delta_neff),
        }
    }

    /// Per-observable chi² for a prediction.
    pub fn chi2_terms(&self, predicted: &Abundances) -> Chi2Terms {
        let obs = &self.observations;
        let helium = if obs.include_he {
            chi2_term(predicted.yp, obs.yp_mean, predicted.yp_sigma, obs.yp_err)
        } else {
            0.0
        };
        let deuterium = if obs.include_dh {
            chi2_term(predicted.dh, obs.dh_mean, predicted.dh_sigma, obs.dh_err)
        } else {
            0.0
        };
        Chi2Terms { helium, deuterium }
    }

    /// Whether `(ombh2, delta_neff)` lies inside the tabulated grid (inclusive).
    pub fn contains(&self, ombh2: f64, delta_neff: f64) -> bool {
        let [x0, x1] = self.ombh2_bounds;
        let [y0, y1] = self.dneff_bounds;
        (x0..=x1).contains(&ombh2) && (y0..=y1).contains(&delta_neff)
    }

    pub fn ombh2_bounds(&self) -> [f64; 2] {
        self.ombh2_bounds
    }

    pub fn dneff_bounds(&self) -> [f64; 2] {
        self.dneff_bounds
    }

    pub fn bounds_policy(&self) -> BoundsPolicy {
        self.bounds_policy
    }

    pub fn observations(&self) -> &Observations {
        &self.observations
    }

    pub fn table_location(&self) -> &TableLocation {
        &self.location
    }

    pub fn summary(&self) -> GridSummary {
        GridSummary {
            table_file: self.location.file.clone(),
            ombh2_size: self.yp.x_knots().len(),
            deltaneff_size: self.yp.y_knots().len(),
            ombh2_bounds: self.ombh2_bounds,
            dneff_bounds: self.dneff_bounds,
            bounds_policy: self.bounds_policy,
        }
    }
}

/// One Gaussian chi² term. Zero total variance gives 0 for an exact match and +inf otherwise.
fn chi2_term(predicted: f64, mean: f64, sigma_pred: f64, sigma_obs: f64) -> f64 {
    let residual = predicted - mean;
    let variance = sigma_pred * sigma_pred + sigma_obs * sigma_obs;
    if variance > 0.0 {
        residual * residual / variance
    } else if residual == 0.0 {
        0.0
    } else {
        f64::INFINITY
    }
}
