//! Bicubic (tensor-product natural cubic) spline on a rectilinear grid.
//!
//! Values are stored as a matrix with one row per `y` knot and one column per
//! `x` knot. Construction precomputes three second-derivative tables:
//!
//! - `zxx`: along `x`, per row
//! - `zyy`: along `y`, per column
//! - `zxxyy`: along `y` of `zxx` (the mixed term)
//!
//! Evaluation then only touches the four surrounding nodes and never allocates.

use nalgebra::DMatrix;

use super::spline::{SegmentWeights, natural_second_derivatives};

#[derive(Debug, Clone)]
pub struct BicubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    z: DMatrix<f64>,
    zxx: DMatrix<f64>,
    zyy: DMatrix<f64>,
    zxxyy: DMatrix<f64>,
}

impl BicubicSpline {
    /// Build a spline through `z[(j, i)] = f(x[i], y[j])`.
    ///
    /// Returns `None` if either axis has fewer than two knots, is not strictly
    /// ascending, or does not match the shape of `z`.
    pub fn new(x: &[f64], y: &[f64], z: DMatrix<f64>) -> Option<Self> {
        if z.nrows() != y.len() || z.ncols() != x.len() {
            return None;
        }

        let zxx = natural_second_derivatives(x, &z.transpose())?.transpose();
        let zyy = natural_second_derivatives(y, &z)?;
        let zxxyy = natural_second_derivatives(y, &zxx)?;

        Some(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            z,
            zxx,
            zyy,
            zxxyy,
        })
    }

    /// Evaluate the surface at `(x, y)`.
    ///
    /// Outside the grid the boundary cubic pieces are continued.
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        let wx = SegmentWeights::locate(&self.x, x);
        let wy = SegmentWeights::locate(&self.y, y);
        let (i, j) = (wx.index, wy.index);

        let along_x = |f: &DMatrix<f64>, m: &DMatrix<f64>, row: usize| {
            wx.apply(f[(row, i)], f[(row, i + 1)], m[(row, i)], m[(row, i + 1)])
        };

        let s0 = along_x(&self.z, &self.zxx, j);
        let s1 = along_x(&self.z, &self.zxx, j + 1);
        let m0 = along_x(&self.zyy, &self.zxxyy, j);
        let m1 = along_x(&self.zyy, &self.zxxyy, j + 1);

        wy.apply(s0, s1, m0, m1)
    }

    pub fn x_knots(&self) -> &[f64] {
        &self.x
    }

    pub fn y_knots(&self) -> &[f64] {
        &self.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn grid(x: &[f64], y: &[f64], f: impl Fn(f64, f64) -> f64) -> DMatrix<f64> {
        DMatrix::from_fn(y.len(), x.len(), |j, i| f(x[i], y[j]))
    }

    #[test]
    fn reproduces_random_nodes() {
        let mut rng = StdRng::seed_from_u64(7);
        let x: Vec<f64> = (0..9).map(|i| 0.005 + 0.002 * i as f64).collect();
        let y: Vec<f64> = (0..6).map(|j| -1.0 + 0.7 * j as f64).collect();
        let z = DMatrix::from_fn(y.len(), x.len(), |_, _| rng.gen_range(0.2..0.3));

        let s = BicubicSpline::new(&x, &y, z.clone()).unwrap();
        for (j, &yj) in y.iter().enumerate() {
            for (i, &xi) in x.iter().enumerate() {
                let v = s.eval(xi, yj);
                assert!((v - z[(j, i)]).abs() < 1e-12, "node ({i},{j}): {v} vs {}", z[(j, i)]);
            }
        }
    }

    #[test]
    fn reproduces_bilinear_surface_everywhere() {
        let x = [0.019, 0.020, 0.0215, 0.023, 0.026];
        let y = [0.0, 0.5, 1.0, 2.0];
        let f = |x: f64, y: f64| 1.0 + 30.0 * x - 0.2 * y + 4.0 * x * y;
        let s = BicubicSpline::new(&x, &y, grid(&x, &y, f)).unwrap();

        for &(qx, qy) in &[(0.0193, 0.1), (0.0222, 1.7), (0.025, 0.75)] {
            assert!((s.eval(qx, qy) - f(qx, qy)).abs() < 1e-12);
        }
        // The boundary pieces are linear here, so extrapolation stays exact too.
        assert!((s.eval(0.030, 3.0) - f(0.030, 3.0)).abs() < 1e-12);
    }

    #[test]
    fn flat_surface_is_exact() {
        let x = [0.020, 0.023];
        let y = [0.0, 1.0];
        let s = BicubicSpline::new(&x, &y, DMatrix::from_element(2, 2, 0.245)).unwrap();
        assert_eq!(s.eval(0.0215, 0.5), 0.245);
        assert_eq!(s.eval(0.1, -4.0), 0.245);
    }

    #[test]
    fn smooth_surface_is_close_between_nodes() {
        let x: Vec<f64> = (0..12).map(|i| i as f64 * 0.25).collect();
        let y: Vec<f64> = (0..10).map(|j| j as f64 * 0.3).collect();
        let f = |x: f64, y: f64| x.sin() * (0.5 * y).cos();
        let s = BicubicSpline::new(&x, &y, grid(&x, &y, f)).unwrap();
        let v = s.eval(1.3, 1.35);
        assert!((v - f(1.3, 1.35)).abs() < 1e-3, "got {v}");
    }

    #[test]
    fn rejects_shape_mismatch() {
        let x = [0.0, 1.0, 2.0];
        let y = [0.0, 1.0];
        assert!(BicubicSpline::new(&x, &y, DMatrix::zeros(3, 2)).is_none());
        assert!(BicubicSpline::new(&x, &y, DMatrix::zeros(2, 3)).is_some());
    }
}
