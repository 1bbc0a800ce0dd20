//! BBN abundance table loading and grid reshaping.
//!
//! The table is plain text, whitespace-delimited, one record per line:
//!
//! ```text
//! ombh2  <unused>  deltaneff  <unused>  Yp  sigma(Yp)  D/H  sigma(D/H)
//! ```
//!
//! Rows are ordered with `ombh2` varying fastest, so the whole file is a
//! row-major `(deltaneff_size, ombh2_size)` grid. Blank lines and `#` comments
//! are ignored.
//!
//! This module only turns the file into validated grids; building the
//! interpolants is the likelihood's job.

use std::path::{Component, Path, PathBuf};

use nalgebra::DMatrix;
use tracing::{info, warn};

use crate::domain::DH_SCALE;
use crate::error::AppError;
use crate::math::is_strictly_ascending;

/// Minimum number of numeric columns per data row.
pub const TABLE_COLUMNS: usize = 8;

/// Environment variable used as the base directory when no `path` is configured.
pub const BASE_DIR_ENV: &str = "BBN_PATH";

/// The columns of one table record that the likelihood uses, as stored in the file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRow {
    pub ombh2: f64,
    pub deltaneff: f64,
    pub yp: f64,
    pub yp_sigma: f64,
    pub dh: f64,
    pub dh_sigma: f64,
}

/// Where the table lives once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLocation {
    pub file: PathBuf,
    /// Directory holding the table (the asset directory).
    pub dir: PathBuf,
}

/// The table reshaped into `(deltaneff, ombh2)` grids.
///
/// Every matrix has `deltaneff.len()` rows and `ombh2.len()` columns. D/H
/// columns are already scaled by [`DH_SCALE`].
#[derive(Debug, Clone)]
pub struct TableGrid {
    pub ombh2: Vec<f64>,
    pub deltaneff: Vec<f64>,
    pub yp: DMatrix<f64>,
    pub yp_sigma: DMatrix<f64>,
    pub dh: DMatrix<f64>,
    pub dh_sigma: DMatrix<f64>,
}

/// Resolve the configured table file.
///
/// An absolute `table_file` is used as-is and `base` is ignored. A relative one
/// is joined onto `base` and normalized lexically (no filesystem access).
pub fn resolve_table_path(table_file: &Path, base: Option<&Path>) -> Result<TableLocation, AppError> {
    if table_file.is_absolute() {
        let dir = table_file.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("/"));
        return Ok(TableLocation {
            file: table_file.to_path_buf(),
            dir,
        });
    }

    let Some(base) = base.filter(|b| !b.as_os_str().is_empty()) else {
        return Err(AppError::configuration(format!(
            "No path given for '{}'. Set the `path` option or the {BASE_DIR_ENV} environment variable.",
            table_file.display()
        )));
    };

    Ok(TableLocation {
        file: normalize_path(&base.join(table_file)),
        dir: base.to_path_buf(),
    })
}

/// Base directory from the environment.
///
/// Only reads the process environment; the binary loads `.env` at startup.
pub fn base_dir_from_env() -> Option<PathBuf> {
    std::env::var_os(BASE_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Collapse `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`.
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Read and parse a table file.
pub fn read_table(path: &Path) -> Result<Vec<TableRow>, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read BBN table '{}': {e}", path.display())))?;
    parse_table(&text, path)
}

/// Parse table text. `source` is only used in error messages.
pub fn parse_table(text: &str, source: &Path) -> Result<Vec<TableRow>, AppError> {
    let mut rows = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = [0.0_f64; TABLE_COLUMNS];
        let mut count = 0usize;
        for token in line.split_whitespace() {
            let v = token.parse::<f64>().map_err(|_| {
                AppError::malformed_table(format!(
                    "The data file {} has a non-numeric value '{token}' on line {}.",
                    source.display(),
                    idx + 1
                ))
            })?;
            if count < TABLE_COLUMNS {
                fields[count] = v;
            }
            count += 1;
        }
        if count < TABLE_COLUMNS {
            return Err(AppError::malformed_table(format!(
                "The data file {} has {count} columns on line {} (expected at least {TABLE_COLUMNS}).",
                source.display(),
                idx + 1
            )));
        }

        rows.push(TableRow {
            ombh2: fields[0],
            deltaneff: fields[2],
            yp: fields[4],
            yp_sigma: fields[5],
            dh: fields[6],
            dh_sigma: fields[7],
        });
    }
    Ok(rows)
}

/// Reshape parsed rows into grids, validating the declared dimensions.
pub fn build_grid(
    rows: &[TableRow],
    ombh2_size: usize,
    deltaneff_size: usize,
    source: &Path,
) -> Result<TableGrid, AppError> {
    if ombh2_size < 2 || deltaneff_size < 2 {
        return Err(AppError::malformed_table(format!(
            "The data file {} cannot form a {ombh2_size} x {deltaneff_size} grid (both sizes must be >= 2).",
            source.display()
        )));
    }
    let expected = ombh2_size.checked_mul(deltaneff_size).ok_or_else(|| {
        AppError::malformed_table(format!(
            "The data file {} cannot match a {ombh2_size} x {deltaneff_size} grid (size overflows).",
            source.display()
        ))
    })?;
    if rows.len() != expected {
        return Err(AppError::malformed_table(format!(
            "The data file {} does not have the expected format: {} rows, expected {ombh2_size} x {deltaneff_size} = {expected}.",
            source.display(),
            rows.len(),
        )));
    }

    let ombh2: Vec<f64> = rows[..ombh2_size].iter().map(|r| r.ombh2).collect();
    let deltaneff: Vec<f64> = rows.iter().step_by(ombh2_size).map(|r| r.deltaneff).collect();

    if !is_strictly_ascending(&ombh2) {
        return Err(AppError::malformed_table(format!(
            "The data file {} has an ombh2 grid that is not strictly ascending.",
            source.display()
        )));
    }
    if !is_strictly_ascending(&deltaneff) {
        return Err(AppError::malformed_table(format!(
            "The data file {} has a deltaneff grid that is not strictly ascending.",
            source.display()
        )));
    }

    let inconsistent = rows
        .chunks(ombh2_size)
        .any(|block| block.iter().zip(&ombh2).any(|(r, &x)| r.ombh2 != x));
    if inconsistent {
        warn!(
            table = %source.display(),
            "ombh2 column differs between deltaneff blocks; using the first block as the grid"
        );
    }

    let shaped = |f: fn(&TableRow) -> f64, scale: f64| {
        DMatrix::from_fn(deltaneff_size, ombh2_size, |j, i| scale * f(&rows[j * ombh2_size + i]))
    };

    Ok(TableGrid {
        yp: shaped(|r| r.yp, 1.0),
        yp_sigma: shaped(|r| r.yp_sigma, 1.0),
        dh: shaped(|r| r.dh, DH_SCALE),
        dh_sigma: shaped(|r| r.dh_sigma, DH_SCALE),
        ombh2,
        deltaneff,
    })
}

/// Resolve, read and reshape a table in one step.
pub fn load_table_grid(
    location: &TableLocation,
    ombh2_size: usize,
    deltaneff_size: usize,
) -> Result<TableGrid, AppError> {
    info!(
        table = %location.file.display(),
        ombh2_size,
        deltaneff_size,
        "Reading BBN table"
    );
    let rows = read_table(&location.file)?;
    build_grid(&rows, ombh2_size, deltaneff_size, &location.file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn row_text(ombh2: f64, dneff: f64, yp: f64, dh: f64) -> String {
        format!("{ombh2} 0.0 {dneff} 0.0 {yp} 0.003 {dh} 5.0e-7\n")
    }

    fn sample_text() -> String {
        let mut s = String::from("# ombh2 - dneff - Yp sYp DH sDH\n\n");
        for &dneff in &[0.0, 1.0] {
            for &ombh2 in &[0.020, 0.022, 0.024] {
                s.push_str(&row_text(ombh2, dneff, 0.24 + dneff * 0.01, 2.5e-5));
            }
        }
        s
    }

    #[test]
    fn relative_path_joins_base() {
        let loc = resolve_table_path(Path::new("table.dat"), Some(Path::new("/data/bbn"))).unwrap();
        assert_eq!(loc.file, PathBuf::from("/data/bbn/table.dat"));
        assert_eq!(loc.dir, PathBuf::from("/data/bbn"));
    }

    #[test]
    fn absolute_path_ignores_base() {
        let loc = resolve_table_path(Path::new("/tables/bbn.dat"), Some(Path::new("/data/bbn"))).unwrap();
        assert_eq!(loc.file, PathBuf::from("/tables/bbn.dat"));
        assert_eq!(loc.dir, PathBuf::from("/tables"));
    }

    #[test]
    fn relative_path_without_base_is_configuration_error() {
        let err = resolve_table_path(Path::new("table.dat"), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("table.dat"));
    }

    #[test]
    fn relative_path_is_normalized() {
        let loc = resolve_table_path(Path::new("../shared/./table.dat"), Some(Path::new("/data/bbn"))).unwrap();
        assert_eq!(loc.file, PathBuf::from("/data/shared/table.dat"));
        assert_eq!(normalize_path(Path::new("a/../..")), PathBuf::from(".."));
        assert_eq!(normalize_path(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn parse_skips_comments_and_picks_columns() {
        let rows = parse_table(&sample_text(), Path::new("mem")).unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[4].ombh2, 0.022);
        assert_eq!(rows[4].deltaneff, 1.0);
        assert_eq!(rows[4].yp_sigma, 0.003);
    }

    #[test]
    fn parse_rejects_short_and_non_numeric_rows() {
        let err = parse_table("0.02 0 1 0 0.24 0.003 2.5e-5\n", Path::new("t.dat")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedTable);
        assert!(err.to_string().contains("line 1"));

        let err = parse_table("0.02 0 x 0 0.24 0.003 2.5e-5 1e-7\n", Path::new("t.dat")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedTable);
    }

    #[test]
    fn grid_reshapes_and_scales() {
        let rows = parse_table(&sample_text(), Path::new("mem")).unwrap();
        let grid = build_grid(&rows, 3, 2, Path::new("mem")).unwrap();
        assert_eq!(grid.ombh2, vec![0.020, 0.022, 0.024]);
        assert_eq!(grid.deltaneff, vec![0.0, 1.0]);
        assert_eq!(grid.yp.shape(), (2, 3));
        assert_eq!(grid.yp[(1, 2)], rows[5].yp);
        assert_eq!(grid.dh[(0, 1)], 2.5e-5 * DH_SCALE);
        assert_eq!(grid.dh_sigma[(1, 0)], 5.0e-7 * DH_SCALE);
    }

    #[test]
    fn base_dir_reads_process_environment_only() {
        let expected = std::env::var_os(BASE_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        assert_eq!(base_dir_from_env(), expected);
    }

    #[test]
    fn inconsistent_ombh2_blocks_use_first_block() {
        let mut text = String::new();
        text.push_str(&row_text(0.020, 0.0, 0.24, 2.5e-5));
        text.push_str(&row_text(0.022, 0.0, 0.24, 2.5e-5));
        text.push_str(&row_text(0.021, 1.0, 0.25, 2.5e-5));
        text.push_str(&row_text(0.023, 1.0, 0.25, 2.5e-5));
        let rows = parse_table(&text, Path::new("mem")).unwrap();

        let grid = build_grid(&rows, 2, 2, Path::new("mem")).unwrap();
        assert_eq!(grid.ombh2, vec![0.020, 0.022]);
        assert_eq!(grid.deltaneff, vec![0.0, 1.0]);
        assert_eq!(grid.yp[(1, 0)], 0.25);
    }

    #[test]
    fn degenerate_or_overflowing_sizes_are_malformed() {
        let err = build_grid(&[], 1 << 40, 1 << 40, Path::new("big.dat")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedTable);
        assert!(err.to_string().contains("big.dat"));

        let err = build_grid(&[], 0, 5, Path::new("mem")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedTable);

        let err = build_grid(&[], 2, 0, Path::new("mem")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedTable);

        let rows = parse_table(&sample_text(), Path::new("mem")).unwrap();
        let err = build_grid(&rows[..3], 3, 1, Path::new("mem")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedTable);
    }

    #[test]
    fn row_count_mismatch_names_file() {
        let rows = parse_table(&sample_text(), Path::new("mem")).unwrap();
        let err = build_grid(&rows, 4, 2, Path::new("/data/bbn/t.dat")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedTable);
        assert!(err.to_string().contains("/data/bbn/t.dat"));
    }

    #[test]
    fn descending_grid_is_rejected() {
        let mut text = String::new();
        for &dneff in &[1.0, 0.0] {
            for &ombh2 in &[0.020, 0.022] {
                text.push_str(&row_text(ombh2, dneff, 0.24, 2.5e-5));
            }
        }
        let rows = parse_table(&text, Path::new("mem")).unwrap();
        let err = build_grid(&rows, 2, 2, Path::new("mem")).unwrap_err();
        assert!(err.to_string().contains("deltaneff"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_table(&dir.path().join("nope.dat")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
