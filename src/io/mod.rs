//! Input/output helpers.
//!
//! - abundance table path resolution, parsing and reshaping (`table`)
//! - likelihood scan exports (`export`)

pub mod export;
pub mod table;

pub use export::*;
pub use table::*;
