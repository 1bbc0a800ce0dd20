//! Natural cubic splines on a strictly ascending set of knots.
//!
//! On each interval `[x_i, x_{i+1}]` with `h = x_{i+1} - x_i` and `b = (x - x_i) / h`:
//!
//! ```text
//! s(x) = f_i + b (f_{i+1} - f_i) + c m_i + d m_{i+1}
//! c    = (a^3 - a) h^2 / 6,   a = 1 - b
//! d    = (b^3 - b) h^2 / 6
//! ```
//!
//! where `m_i` are the second derivatives at the knots. The "natural" end
//! conditions fix `m_0 = m_{n-1} = 0`, so two knots give a straight line.
//!
//! The form above keeps `s(x_i) = f_i` exact in floating point and returns a
//! constant exactly when the data is constant.

use nalgebra::DMatrix;

/// Returns true when every element is finite and strictly greater than its predecessor.
pub fn is_strictly_ascending(knots: &[f64]) -> bool {
    knots.iter().all(|v| v.is_finite()) && knots.windows(2).all(|w| w[0] < w[1])
}

/// Solve for knot second derivatives of several series at once.
///
/// `values` has one row per knot and one column per independent series. The
/// result has the same shape.
///
/// Returns `None` if the knots are not strictly ascending, fewer than two, do
/// not match `values`, or the tridiagonal system cannot be solved.
pub fn natural_second_derivatives(knots: &[f64], values: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let n = knots.len();
    if n < 2 || values.nrows() != n || !is_strictly_ascending(knots) {
        return None;
    }

    let k = values.ncols();
    let mut system = DMatrix::<f64>::zeros(n, n);
    let mut rhs = DMatrix::<f64>::zeros(n, k);

    system[(0, 0)] = 1.0;
    system[(n - 1, n - 1)] = 1.0;

    for i in 1..n - 1 {
        let h_lo = knots[i] - knots[i - 1];
        let h_hi = knots[i + 1] - knots[i];
        system[(i, i - 1)] = h_lo / 6.0;
        system[(i, i)] = (h_lo + h_hi) / 3.0;
        system[(i, i + 1)] = h_hi / 6.0;
        for col in 0..k {
            let slope_hi = (values[(i + 1, col)] - values[(i, col)]) / h_hi;
            let slope_lo = (values[(i, col)] - values[(i - 1, col)]) / h_lo;
            rhs[(i, col)] = slope_hi - slope_lo;
        }
    }

    let m = system.lu().solve(&rhs)?;
    if m.iter().all(|v| v.is_finite()) {
        Some(m)
    } else {
        None
    }
}

/// Interval index and basis weights for evaluating a spline at one abscissa.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentWeights {
    /// Left knot of the interval used; clamped to the first/last interval outside the knots.
    pub index: usize,
    b: f64,
    c: f64,
    d: f64,
}

impl SegmentWeights {
    /// Locate `x` among `knots` (at least two, ascending).
    ///
    /// Queries outside the knot range use the boundary interval, which continues
    /// its cubic piece.
    pub fn locate(knots: &[f64], x: f64) -> Self {
        debug_assert!(knots.len() >= 2);
        let last = knots.len() - 2;
        let index = knots.partition_point(|&k| k <= x).saturating_sub(1).min(last);

        let h = knots[index + 1] - knots[index];
        let b = (x - knots[index]) / h;
        let a = 1.0 - b;
        let h2 = h * h / 6.0;

        Self {
            index,
            b,
            c: (a * a * a - a) * h2,
            d: (b * b * b - b) * h2,
        }
    }

    /// Combine knot values `f0, f1` and knot second derivatives `m0, m1` of the located interval.
    #[inline]
    pub fn apply(&self, f0: f64, f1: f64, m0: f64, m1: f64) -> f64 {
        f0 + self.b * (f1 - f0) + self.c * m0 + self.d * m1
    }
}
