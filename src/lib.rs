//! `bbn-likelihood` library crate.
//!
//! Compares measured primordial helium-4 and deuterium abundances with BBN
//! predictions tabulated over `(omega_b h^2, delta N_eff)` and returns a
//! log-likelihood.
//!
//! The binary (`bbn`) is a thin wrapper around this library so that:
//!
//! - the likelihood can be embedded in any sampler without spawning processes
//! - core logic is testable on its own
//!
//! ```no_run
//! use bbn_likelihood::domain::BbnConfig;
//! use bbn_likelihood::likelihood::BbnLikelihood;
//!
//! let mut config = BbnConfig::new("BBN_table.dat", 48, 28);
//! config.path = Some("/data/bbn".into());
//! let like = BbnLikelihood::initialize(&config)?;
//! let logp = like.log_likelihood(0.0224, 0.0);
//! # let _ = logp;
//! # Ok::<(), bbn_likelihood::error::AppError>(())
//! ```

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod likelihood;
pub mod math;
pub mod report;
