//! Imputation report and preview types.

use crate::table::Cell;
use crate::utils::{as_exact_integer, round_to};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of one imputation run.
///
/// Produced once per [`MeanImputer::impute`](crate::MeanImputer::impute)
/// call and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationReport {
    pub total_rows: usize,
    pub total_columns: usize,
    pub numeric_column_count: usize,
    /// Numeric column names in table order.
    pub numeric_columns: Vec<String>,
    /// Mean of the non-missing original values (0.0 when there are none).
    pub column_means: BTreeMap<String, f64>,
    /// Missing cells found in each numeric column.
    pub imputed_counts: BTreeMap<String, usize>,
    pub total_imputations: usize,
    /// Percentage of numeric cells that were missing, rounded to 2 decimals.
    pub missing_data_rate: f64,
}

impl ImputationReport {
    /// Build a report, deriving the totals and the missing data rate.
    pub fn new(
        total_rows: usize,
        total_columns: usize,
        numeric_columns: Vec<String>,
        column_means: BTreeMap<String, f64>,
        imputed_counts: BTreeMap<String, usize>,
    ) -> Self {
        let numeric_column_count = numeric_columns.len();
        let total_imputations = imputed_counts.values().sum();
        let missing_data_rate =
            missing_data_rate(total_imputations, total_rows, numeric_column_count);

        Self {
            total_rows,
            total_columns,
            numeric_column_count,
            numeric_columns,
            column_means,
            imputed_counts,
            total_imputations,
            missing_data_rate,
        }
    }
}

/// `imputations / (rows * numeric columns) * 100`, 0.0 for an empty denominator.
pub fn missing_data_rate(imputations: usize, rows: usize, numeric_columns: usize) -> f64 {
    let numeric_cells = rows * numeric_columns;
    if numeric_cells == 0 {
        return 0.0;
    }
    round_to(imputations as f64 / numeric_cells as f64 * 100.0, 2)
}

/// A preview cell as it is shown to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreviewValue {
    Null,
    Integer(i64),
    #[serde(serialize_with = "serialize_float")]
    Float(f64),
    Text(String),
}

/// JSON has no non-finite numbers; write them as strings so `null` keeps
/// meaning "missing".
fn serialize_float<S: serde::Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.collect_str(value)
    }
}

impl From<Cell<'_>> for PreviewValue {
    fn from(cell: Cell<'_>) -> Self {
        match cell {
            Cell::Missing => PreviewValue::Null,
            Cell::Integer(integer) => PreviewValue::Integer(integer),
            Cell::Number(value) if !value.is_finite() => PreviewValue::Text(value.to_string()),
            Cell::Number(value) => match as_exact_integer(value) {
                Some(integer) => PreviewValue::Integer(integer),
                None => PreviewValue::Float(value),
            },
            Cell::Text(text) => PreviewValue::Text(text.to_string()),
        }
    }
}

/// One preview row: column name to value, in table column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreviewRow {
    cells: Vec<(String, PreviewValue)>,
}

impl PreviewRow {
    pub fn new(cells: Vec<(String, PreviewValue)>) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: &str) -> Option<&PreviewValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn cells(&self) -> &[(String, PreviewValue)] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Rows serialize as JSON objects whose keys keep table column order.
impl Serialize for PreviewRow {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Bounded view of the processed table with per-cell change flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    /// First rows of the processed table.
    pub rows: Vec<PreviewRow>,
    /// Per numeric column, whether each previewed row was missing originally.
    pub imputation_flags: BTreeMap<String, Vec<bool>>,
}
