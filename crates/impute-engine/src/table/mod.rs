//! Columnar in-memory table model.
//!
//! A [`Table`] is an ordered, rectangular set of uniquely named columns.
//! Each [`Column`] carries an explicit type tag through [`ColumnData`]
//! (`Numeric` or `Text`) that is decided once when the table is built and
//! never re-inferred. Missing cells are `None`, so "missing" and "zero" are
//! never confused.
//!
//! # Example
//!
//! ```rust,ignore
//! use impute_engine::table::{Column, Table};
//!
//! let table = Table::new(vec![
//!     Column::text("name", [Some("Ann"), Some("Bob")]),
//!     Column::numeric("age", [Some(25.0), None]),
//! ])?;
//!
//! assert_eq!(table.numeric_columns(), vec!["age".to_string()]);
//! ```

mod csv;

pub use csv::{CsvLoadOptions, DEFAULT_NULL_TOKENS, load, load_with, write_csv};

use crate::error::{ImputeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Floating-point compatible values
    Numeric,
    /// Anything else, kept as text
    Text,
}

/// Values of a numeric column.
///
/// `values` is the floating-point view used for arithmetic. Columns loaded
/// from integer storage also keep their exact `i64` values, so integers
/// beyond 2^53 are written back unchanged.
///
/// Non-finite values (NaN, infinities, literals that overflow `f64`) are
/// stored as missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumericColumn {
    values: Vec<Option<f64>>,
    exact: Option<Vec<Option<i64>>>,
}

impl NumericColumn {
    /// Create a float column. Non-finite values are stored as missing.
    pub fn new(values: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|value| value.filter(|v| v.is_finite()))
                .collect(),
            exact: None,
        }
    }

    /// Create a column backed by exact integer storage.
    pub fn integers(values: impl IntoIterator<Item = Option<i64>>) -> Self {
        let exact: Vec<Option<i64>> = values.into_iter().collect();
        Self {
            values: exact.iter().map(|value| value.map(|v| v as f64)).collect(),
            exact: Some(exact),
        }
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Exact integer values, when the column has integer storage.
    pub fn exact_integers(&self) -> Option<&[Option<i64>]> {
        self.exact.as_deref()
    }

    pub fn is_integer(&self) -> bool {
        self.exact.is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_none()).count()
    }

    /// Number of present cells.
    pub fn present_count(&self) -> usize {
        self.values.len() - self.missing_count()
    }
}

/// Cell storage of a column; the variant is the column's type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(NumericColumn),
    Text(Vec<Option<String>>),
}

/// Borrowed view of a single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Integer(i64),
    Number(f64),
    Text(&'a str),
    Missing,
}

impl Cell<'_> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

/// A named column of a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Create a column from already tagged data.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Create a float-valued numeric column.
    pub fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self::new(name, ColumnData::Numeric(NumericColumn::new(values)))
    }

    /// Create an integer-valued numeric column.
    pub fn integer(name: impl Into<String>, values: impl IntoIterator<Item = Option<i64>>) -> Self {
        Self::new(name, ColumnData::Numeric(NumericColumn::integers(values)))
    }

    /// Create a text column.
    pub fn text<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<S>>,
    ) -> Self {
        Self::new(
            name,
            ColumnData::Text(values.into_iter().map(|value| value.map(Into::into)).collect()),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn kind(&self) -> ColumnKind {
        match self.data {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Text(_) => ColumnKind::Text,
        }
    }

    /// Numeric values, if the column is tagged numeric.
    pub fn as_numeric(&self) -> Option<&NumericColumn> {
        match &self.data {
            ColumnData::Numeric(values) => Some(values),
            ColumnData::Text(_) => None,
        }
    }

    /// A column is eligible for imputation when it is tagged numeric and
    /// holds at least one present value.
    pub fn is_numeric(&self) -> bool {
        self.as_numeric()
            .is_some_and(|values| values.present_count() > 0)
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell at `row`, or `None` when out of bounds.
    pub fn cell(&self, row: usize) -> Option<Cell<'_>> {
        match &self.data {
            ColumnData::Numeric(values) => match values.exact_integers() {
                Some(exact) => exact.get(row).map(|value| match value {
                    Some(integer) => Cell::Integer(*integer),
                    None => Cell::Missing,
                }),
                None => values.values().get(row).map(|value| match value {
                    Some(number) => Cell::Number(*number),
                    None => Cell::Missing,
                }),
            },
            ColumnData::Text(values) => values.get(row).map(|value| match value {
                Some(text) => Cell::Text(text.as_str()),
                None => Cell::Missing,
            }),
        }
    }

    /// Whether the cell at `row` is missing. Out-of-bounds rows are not.
    pub fn is_missing(&self, row: usize) -> bool {
        self.cell(row).is_some_and(|cell| cell.is_missing())
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(values) => values.missing_count(),
            ColumnData::Text(values) => values.iter().filter(|value| value.is_none()).count(),
        }
    }
}

/// Ordered, rectangular collection of uniquely named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table, checking that names are unique and all columns have
    /// the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(ImputeError::InvalidTable(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
        }

        let row_count = columns.first().map_or(0, Column::len);
        if let Some(ragged) = columns.iter().find(|column| column.len() != row_count) {
            return Err(ImputeError::InvalidTable(format!(
                "column '{}' has {} rows, expected {}",
                ragged.name(),
                ragged.len(),
                row_count
            )));
        }

        Ok(Self { columns, row_count })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name() == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| column.name().to_string())
            .collect()
    }

    /// Names of columns eligible for imputation, in declared order.
    ///
    /// A column qualifies when it is tagged numeric and has at least one
    /// present value; entirely missing columns are excluded.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| column.is_numeric())
            .map(|column| column.name().to_string())
            .collect()
    }

    /// Total number of missing cells across all columns.
    pub fn missing_count(&self) -> usize {
        self.columns.iter().map(Column::missing_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::new(vec![
            Column::text("name", [Some("Ann"), Some("Bob"), None]),
            Column::numeric("age", [Some(25.0), None, Some(35.0)]),
            Column::integer("rooms", [Some(2), Some(3), Some(1)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_table_shape() {
        let table = sample_table();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.column_names(), vec!["name", "age", "rooms"]);
        assert_eq!(table.missing_count(), 2);
    }

    #[test]
    fn test_duplicate_column_names_rejected() {
        let result = Table::new(vec![
            Column::numeric("a", [Some(1.0)]),
            Column::text("a", [Some("x")]),
        ]);
        assert!(matches!(result, Err(ImputeError::InvalidTable(_))));
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let result = Table::new(vec![
            Column::numeric("a", [Some(1.0), Some(2.0)]),
            Column::numeric("b", [Some(1.0)]),
        ]);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("column 'b' has 1 rows"));
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new(Vec::new()).unwrap();
        assert_eq!(table.row_count(), 0);
        assert!(table.numeric_columns().is_empty());
    }

    #[test]
    fn test_numeric_columns_keep_declared_order() {
        let table = sample_table();
        assert_eq!(table.numeric_columns(), vec!["age", "rooms"]);
    }

    #[test]
    fn test_all_missing_numeric_column_is_not_numeric() {
        let table = Table::new(vec![
            Column::numeric("empty", [None, None]),
            Column::numeric("full", [Some(1.0), Some(2.0)]),
        ])
        .unwrap();
        assert_eq!(table.numeric_columns(), vec!["full"]);
    }

    #[test]
    fn test_nan_is_stored_as_missing() {
        let column = Column::numeric("x", [Some(f64::NAN), Some(1.0)]);
        assert!(column.is_missing(0));
        assert!(!column.is_missing(1));
        assert_eq!(column.missing_count(), 1);
    }

    #[test]
    fn test_non_finite_values_are_stored_as_missing() {
        let column = Column::numeric(
            "x",
            [Some(f64::INFINITY), Some(f64::NEG_INFINITY), Some(2.0)],
        );
        assert_eq!(column.missing_count(), 2);
        assert_eq!(column.cell(2), Some(Cell::Number(2.0)));
    }

    #[test]
    fn test_integer_column_keeps_exact_values() {
        let big = 9_007_199_254_740_993_i64;
        let column = Column::integer("id", [Some(big), None]);
        let numeric = column.as_numeric().unwrap();

        assert_eq!(numeric.exact_integers(), Some(&[Some(big), None][..]));
        assert_eq!(column.cell(0), Some(Cell::Integer(big)));
        assert_eq!(numeric.missing_count(), 1);
    }

    #[test]
    fn test_cell_access() {
        let table = sample_table();
        let name = table.column("name").unwrap();
        assert_eq!(name.cell(0), Some(Cell::Text("Ann")));
        assert_eq!(name.cell(2), Some(Cell::Missing));
        assert_eq!(name.cell(3), None);
        assert!(!name.is_missing(3));

        let rooms = table.column("rooms").unwrap();
        assert_eq!(rooms.kind(), ColumnKind::Numeric);
        assert_eq!(rooms.cell(1), Some(Cell::Integer(3)));
        assert!(rooms.as_numeric().unwrap().is_integer());
    }
}
