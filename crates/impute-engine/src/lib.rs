//! Column-Mean Imputation Engine
//!
//! Replaces missing numeric values in a tabular dataset with per-column
//! means and reports exactly what was changed.
//!
//! # Overview
//!
//! - **Table Model**: a columnar table with an explicit `Numeric | Text` tag
//!   per column and an explicit missing marker per cell
//! - **Imputation**: column means over the original non-missing values,
//!   applied to a copy of the table
//! - **Reporting**: counts, means and the missing data rate, plus a bounded
//!   preview with per-cell flags for highlighting imputed values
//!
//! The engine is a pure, synchronous computation. It knows nothing about
//! files, storage or transport; callers hand it bytes or a [`Table`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use impute_engine::{MeanImputer, load, write_csv};
//!
//! let original = load(b"name,age\nAnn,25\nBob,\nCid,35\n")?;
//! let imputation = MeanImputer::impute(&original)?;
//!
//! assert_eq!(imputation.report.column_means["age"], 30.0);
//! assert_eq!(imputation.report.total_imputations, 1);
//!
//! let preview = MeanImputer::preview(&original, &imputation.processed, 50)?;
//! assert_eq!(preview.imputation_flags["age"], vec![false, true, false]);
//!
//! let csv_bytes = write_csv(&imputation.processed)?;
//! ```

pub mod error;
pub mod imputer;
pub mod report;
pub mod table;
pub mod utils;

// Re-exports for convenient access
pub use error::{ImputeError, Result as ImputeResult};
pub use imputer::{Imputation, MeanImputer, column_mean};
pub use report::{ImputationReport, Preview, PreviewRow, PreviewValue, missing_data_rate};
pub use table::{
    Cell, Column, ColumnData, ColumnKind, CsvLoadOptions, NumericColumn, Table, load, load_with,
    write_csv,
};
