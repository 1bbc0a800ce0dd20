//! Command-line parsing for the BBN likelihood tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! table loading and likelihood code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::BoundsPolicy;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "bbn", version, about = "BBN light-element abundance likelihood")]
pub struct Cli {
    /// Diagnostic log level (written to stderr).
    #[arg(long, global = true, default_value_t = tracing::Level::WARN)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate the log-likelihood at one (omega_b, dneff) point.
    Eval(EvalArgs),
    /// Evaluate the log-likelihood on a regular grid spanning the table.
    Scan(ScanArgs),
    /// Show the resolved table and its grid bounds.
    Info(InfoArgs),
}

/// Likelihood configuration: an optional JSON file plus per-field overrides.
///
/// Without `--config`, `--table-file`, `--ombh2-size` and `--deltaneff-size`
/// are required.
#[derive(Debug, Args, Clone, Default)]
pub struct TableArgs {
    /// JSON config file (fields: table_file, path, ombh2_size, deltaneff_size, ...).
    #[arg(short = 'c', long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// BBN table file, absolute or relative to `--path`.
    #[arg(long)]
    pub table_file: Option<PathBuf>,

    /// Base directory for a relative table file (falls back to $BBN_PATH).
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Number of omega_b values in the table grid.
    #[arg(long)]
    pub ombh2_size: Option<usize>,

    /// Number of dneff values in the table grid.
    #[arg(long)]
    pub deltaneff_size: Option<usize>,

    /// Drop the helium-4 term.
    #[arg(long)]
    pub no_he: bool,

    /// Drop the deuterium term.
    #[arg(long)]
    pub no_dh: bool,

    /// Measured Yp.
    #[arg(long)]
    pub yp_mean: Option<f64>,

    /// Uncertainty on the measured Yp.
    #[arg(long)]
    pub yp_err: Option<f64>,

    /// Measured D/H in units of 1e-5.
    #[arg(long)]
    pub dh_mean: Option<f64>,

    /// Uncertainty on the measured D/H (1e-5).
    #[arg(long)]
    pub dh_err: Option<f64>,

    /// How to treat points outside the table grid.
    #[arg(long, value_enum)]
    pub bounds_policy: Option<BoundsPolicy>,
}

#[derive(Debug, Args)]
pub struct EvalArgs {
    #[command(flatten)]
    pub table: TableArgs,

    /// Physical baryon density, omega_b h^2.
    #[arg(long = "omega-b", allow_hyphen_values = true)]
    pub omega_b: f64,

    /// Extra effective neutrino species, delta N_eff.
    #[arg(long, allow_hyphen_values = true)]
    pub dneff: f64,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub table: TableArgs,

    /// Number of omega_b values in the scan.
    #[arg(long, default_value_t = 41)]
    pub omega_b_steps: usize,

    /// Number of dneff values in the scan.
    #[arg(long, default_value_t = 41)]
    pub dneff_steps: usize,

    /// Write every scanned point to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub table: TableArgs,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_eval_with_negative_dneff() {
        let cli = Cli::parse_from([
            "bbn", "eval", "--table-file", "/t.dat", "--ombh2-size", "4", "--deltaneff-size", "3",
            "--omega-b", "0.0224", "--dneff", "-0.5", "--no-dh",
        ]);
        let Command::Eval(args) = cli.command else {
            panic!("expected eval");
        };
        assert_eq!(args.dneff, -0.5);
        assert!(args.table.no_dh);
        assert_eq!(args.table.ombh2_size, Some(4));
        assert_eq!(cli.log_level, tracing::Level::WARN);
    }

    #[test]
    fn parses_scan_defaults_and_log_level() {
        let cli = Cli::parse_from(["bbn", "--log-level", "debug", "scan", "-c", "bbn.json"]);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.omega_b_steps, 41);
        assert_eq!(args.table.config, Some(PathBuf::from("bbn.json")));
        assert_eq!(cli.log_level, tracing::Level::DEBUG);
    }
}
