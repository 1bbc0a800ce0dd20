//! The BBN abundance likelihood and its parameter-source seam.

pub mod evaluator;
pub mod source;

pub use evaluator::*;
pub use source::*;
