//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - assembles a `BbnConfig` from the JSON file and flag overrides
//! - builds the likelihood
//! - prints evaluations, scans or table info
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, EvalArgs, InfoArgs, ScanArgs, TableArgs};
use crate::domain::BbnConfig;
use crate::error::AppError;
use crate::likelihood::BbnLikelihood;

pub mod pipeline;

/// Entry point for the `bbn` binary.
pub fn run() -> Result<(), AppError> {
    // `BBN_PATH` may come from a `.env` file; the library only reads the process environment.
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Eval(args) => handle_eval(args),
        Command::Scan(args) => handle_scan(args),
        Command::Info(args) => handle_info(args),
    }
}

fn handle_eval(args: EvalArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.table)?;
    let likelihood = BbnLikelihood::initialize(&config)?;
    let out = pipeline::run_eval(&likelihood, args.omega_b, args.dneff);

    if args.json {
        println!("{}", to_json(&out)?);
    } else {
        println!("{}", crate::report::format_eval(&out, likelihood.observations()));
    }
    Ok(())
}

fn handle_scan(args: ScanArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.table)?;
    let likelihood = BbnLikelihood::initialize(&config)?;
    let scan = pipeline::run_scan(&likelihood, args.omega_b_steps, args.dneff_steps)?;

    println!("{}", crate::report::format_scan(&scan, &likelihood.summary()));

    if let Some(path) = &args.export {
        crate::io::export::write_scan_csv(path, &scan.points)?;
    }
    Ok(())
}

fn handle_info(args: InfoArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.table)?;
    let likelihood = BbnLikelihood::initialize(&config)?;
    let summary = likelihood.summary();

    if args.json {
        println!("{}", to_json(&summary)?);
    } else {
        println!("{}", crate::report::format_info(&summary));
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::io(format!("Failed to serialize JSON: {e}")))
}

/// Build a config from `--config` (if any) and apply flag overrides on top.
pub fn config_from_args(args: &TableArgs) -> Result<BbnConfig, AppError> {
    let mut config = match &args.config {
        Some(path) => BbnConfig::from_json_file(path)?,
        None => {
            let (Some(table_file), Some(ombh2_size), Some(deltaneff_size)) =
                (&args.table_file, args.ombh2_size, args.deltaneff_size)
            else {
                return Err(AppError::configuration(
                    "Without --config, --table-file, --ombh2-size and --deltaneff-size are required.",
                ));
            };
            BbnConfig::new(table_file.clone(), ombh2_size, deltaneff_size)
        }
    };

    if let Some(v) = &args.table_file {
        config.table_file = v.clone();
    }
    if let Some(v) = &args.path {
        config.path = Some(v.clone());
    }
    if let Some(v) = args.ombh2_size {
        config.ombh2_size = v;
    }
    if let Some(v) = args.deltaneff_size {
        config.deltaneff_size = v;
    }
    if args.no_he {
        config.include_he = false;
    }
    if args.no_dh {
        config.include_dh = false;
    }
    if let Some(v) = args.yp_mean {
        config.yp_mean = v;
    }
    if let Some(v) = args.yp_err {
        config.yp_err = v;
    }
    if let Some(v) = args.dh_mean {
        config.dh_mean = v;
    }
    if let Some(v) = args.dh_err {
        config.dh_err = v;
    }
    if let Some(v) = args.bounds_policy {
        config.bounds_policy = v;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::BoundsPolicy;
    use crate::error::ErrorKind;

    #[test]
    fn flags_alone_require_table_and_sizes() {
        let args = TableArgs {
            table_file: Some(PathBuf::from("t.dat")),
            ..TableArgs::default()
        };
        assert_eq!(config_from_args(&args).unwrap_err().kind(), ErrorKind::Configuration);
    }

    #[test]
    fn flags_override_json() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("bbn.json");
        std::fs::write(
            &json,
            r#"{"table_file": "table.dat", "path": "/data/bbn", "ombh2_size": 48, "deltaneff_size": 28, "yp_mean": 0.245}"#,
        )
        .unwrap();

        let args = TableArgs {
            config: Some(json),
            deltaneff_size: Some(30),
            no_he: true,
            bounds_policy: Some(BoundsPolicy::Reject),
            ..TableArgs::default()
        };
        let config = config_from_args(&args).unwrap();
        assert_eq!(config.table_file, PathBuf::from("table.dat"));
        assert_eq!(config.path, Some(PathBuf::from("/data/bbn")));
        assert_eq!(config.ombh2_size, 48);
        assert_eq!(config.deltaneff_size, 30);
        assert!(!config.include_he);
        assert!(config.include_dh);
        assert_eq!(config.yp_mean, 0.245);
        assert_eq!(config.bounds_policy, BoundsPolicy::Reject);
    }

    #[test]
    fn invalid_json_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("bad.json");
        std::fs::write(&json, r#"{"table_file": "t.dat"}"#).unwrap();
        let args = TableArgs {
            config: Some(json),
            ..TableArgs::default()
        };
        assert_eq!(config_from_args(&args).unwrap_err().kind(), ErrorKind::Configuration);
    }
}
