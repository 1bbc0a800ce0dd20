//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the likelihood configuration (`BbnConfig`, `BoundsPolicy`)
//! - observational constants (`Observations`)
//! - evaluation outputs (`Abundances`, `Chi2Terms`, `ScanPoint`, `GridSummary`)

pub mod types;

pub use types::*;
