//! Imputation module for handling missing values.
//!
//! This module provides column-mean imputation for numeric columns:
//! - [`MeanImputer::impute`] fills missing numeric cells and reports what changed
//! - [`MeanImputer::preview`] builds a bounded, flagged view for display

mod mean;
mod preview;

pub use mean::{Imputation, MeanImputer, column_mean};
