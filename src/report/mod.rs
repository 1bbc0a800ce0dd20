//! Reporting utilities: formatted terminal output for evaluations, scans and tables.

pub mod format;

pub use format::*;
