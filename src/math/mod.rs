//! Mathematical utilities: 1D natural cubic splines and their bicubic tensor product.

pub mod bicubic;
pub mod spline;

pub use bicubic::*;
pub use spline::*;
