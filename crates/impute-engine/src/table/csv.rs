//! CSV loading and writing through Polars.
//!
//! Polars does the parsing and dtype inference; the result is converted into
//! the tagged [`Table`] model once, at load time.

use super::{Column, ColumnData, NumericColumn, Table};
use crate::error::{ImputeError, Result};
use crate::utils::{is_integer_dtype, is_numeric_dtype, parse_integer_token, parse_numeric_token};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::debug;

/// Suffix Polars appends to repeated header names.
const DUPLICATE_HEADER_MARKER: &str = "_duplicated_";

/// Tokens read as missing in addition to empty fields.
pub const DEFAULT_NULL_TOKENS: [&str; 13] = [
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
    "#NA",
];

/// Options controlling how raw CSV bytes become a [`Table`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvLoadOptions {
    /// Field values treated as missing.
    pub null_tokens: Vec<String>,

    /// Rows scanned for dtype inference. `None` scans the whole input.
    pub infer_schema_length: Option<usize>,
}

impl Default for CsvLoadOptions {
    fn default() -> Self {
        Self {
            null_tokens: DEFAULT_NULL_TOKENS.iter().map(|t| t.to_string()).collect(),
            infer_schema_length: None,
        }
    }
}

/// Parse raw CSV bytes with default options.
pub fn load(bytes: &[u8]) -> Result<Table> {
    load_with(bytes, &CsvLoadOptions::default())
}

/// Parse raw CSV bytes into a [`Table`].
///
/// The first row is the header. Any parse failure, including empty input
/// and structural problems, is reported as [`ImputeError::UnparseableInput`].
pub fn load_with(bytes: &[u8], options: &CsvLoadOptions) -> Result<Table> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ImputeError::UnparseableInput("input is empty".to_string()));
    }

    let null_values = NullValues::AllColumns(
        options
            .null_tokens
            .iter()
            .map(|token| token.as_str().into())
            .collect(),
    );

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(options.infer_schema_length)
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(null_values)),
        )
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
        .map_err(|e| ImputeError::UnparseableInput(e.to_string()))?;

    debug!("Parsed CSV input: {:?}", df.shape());

    if let Some(name) = find_duplicate_header(&df) {
        return Err(ImputeError::UnparseableInput(format!(
            "duplicate column name '{name}'"
        )));
    }

    let columns = df
        .get_columns()
        .iter()
        .map(column_from_polars)
        .collect::<Result<Vec<_>>>()?;

    Table::new(columns).map_err(|e| match e {
        ImputeError::InvalidTable(reason) => ImputeError::UnparseableInput(reason),
        other => other,
    })
}

/// Serialize a [`Table`] back to CSV bytes.
///
/// Missing cells become empty fields. Numeric columns with exact integer
/// storage are written from the exact values.
pub fn write_csv(table: &Table) -> Result<Vec<u8>> {
    let mut df = to_dataframe(table)?;
    let mut buffer = Vec::new();

    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut df)?;

    Ok(buffer)
}

/// Polars renames a repeated header `a` to `a_duplicated_0`; report the
/// original name when such a rename shadows an earlier column.
fn find_duplicate_header(df: &DataFrame) -> Option<String> {
    let names: Vec<&str> = df
        .get_column_names()
        .into_iter()
        .map(|n| n.as_str())
        .collect();

    names.iter().find_map(|name| {
        let (base, suffix) = name.rsplit_once(DUPLICATE_HEADER_MARKER)?;
        let renamed = !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit());
        (renamed && names.contains(&base)).then(|| base.to_string())
    })
}

/// Convert one Polars column into a tagged [`Column`].
fn column_from_polars(column: &polars::prelude::Column) -> Result<Column> {
    let name = column.name().to_string();
    let series = column.as_materialized_series();
    let dtype = series.dtype().clone();

    if is_integer_dtype(&dtype) {
        // UInt64 values above i64::MAX fail the strict cast and load as floats
        if let Ok(ints) = series.strict_cast(&DataType::Int64) {
            let numeric = NumericColumn::integers(ints.i64()?.into_iter());
            return Ok(Column::new(name, ColumnData::Numeric(numeric)));
        }
    } else if is_numeric_dtype(&dtype) {
        let floats = series.cast(&DataType::Float64)?;
        let numeric = NumericColumn::new(floats.f64()?.into_iter());
        return Ok(Column::new(name, ColumnData::Numeric(numeric)));
    }

    let strings = series.cast(&DataType::String)?;
    let values: Vec<Option<String>> = strings
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect();

    match numeric_from_text(&values) {
        Some(numeric) => {
            debug!("Column '{}' holds numeric text, tagging as numeric", name);
            Ok(Column::new(name, ColumnData::Numeric(numeric)))
        }
        None => Ok(Column::new(name, ColumnData::Text(values))),
    }
}

/// Reinterpret a text column as numeric when every present token is a number.
///
/// Columns whose tokens are all `i64` literals keep exact integer storage.
fn numeric_from_text(values: &[Option<String>]) -> Option<NumericColumn> {
    let present: Vec<&str> = values.iter().flatten().map(String::as_str).collect();
    if present.is_empty() {
        return None;
    }

    if present.iter().all(|token| parse_integer_token(token).is_some()) {
        let integers = values
            .iter()
            .map(|value| value.as_deref().and_then(parse_integer_token));
        return Some(NumericColumn::integers(integers));
    }

    let mut parsed = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Some(token) => parsed.push(Some(parse_numeric_token(token)?)),
            None => parsed.push(None),
        }
    }
    Some(NumericColumn::new(parsed))
}

fn to_dataframe(table: &Table) -> Result<DataFrame> {
    let columns: Vec<polars::prelude::Column> = table
        .columns()
        .iter()
        .map(|column| {
            let name: PlSmallStr = column.name().into();
            let series = match column.data() {
                ColumnData::Numeric(numeric) => match numeric.exact_integers() {
                    Some(exact) => Series::new(name, exact.to_vec()),
                    None => Series::new(name, numeric.values().to_vec()),
                },
                ColumnData::Text(values) => Series::new(name, values.clone()),
            };
            series.into()
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}
