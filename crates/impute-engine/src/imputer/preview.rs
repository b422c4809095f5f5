//! Bounded preview of an imputation run with per-cell change flags.

use super::MeanImputer;
use crate::error::{ImputeError, Result};
use crate::table::Table;
use crate::report::{Preview, PreviewRow, PreviewValue};
use std::collections::BTreeMap;

impl MeanImputer {
    /// Build a preview of the first `limit` rows of `processed`.
    ///
    /// Flags are derived from `original` only: `true` marks a cell that was
    /// missing before imputation, whatever value it holds now.
    ///
    /// # Errors
    ///
    /// Returns [`ImputeError::InvalidTable`] when the two tables do not have
    /// the same columns and row count.
    pub fn preview(original: &Table, processed: &Table, limit: usize) -> Result<Preview> {
        ensure_same_shape(original, processed)?;

        let shown = limit.min(processed.row_count());

        let rows = (0..shown)
            .map(|row| {
                PreviewRow::new(
                    processed
                        .columns()
                        .iter()
                        .map(|column| {
                            let value = column
                                .cell(row)
                                .map(PreviewValue::from)
                                .unwrap_or(PreviewValue::Null);
                            (column.name().to_string(), value)
                        })
                        .collect(),
                )
            })
            .collect();

        let mut imputation_flags = BTreeMap::new();
        for name in original.numeric_columns() {
            let column = original
                .column(&name)
                .ok_or_else(|| ImputeError::ColumnNotFound(name.clone()))?;
            let flags = (0..shown).map(|row| column.is_missing(row)).collect();
            imputation_flags.insert(name, flags);
        }

        Ok(Preview {
            rows,
            imputation_flags,
        })
    }
}

fn ensure_same_shape(original: &Table, processed: &Table) -> Result<()> {
    if original.row_count() != processed.row_count() {
        return Err(ImputeError::InvalidTable(format!(
            "processed table has {} rows, original has {}",
            processed.row_count(),
            original.row_count()
        )));
    }
    if original.column_names() != processed.column_names() {
        return Err(ImputeError::InvalidTable(
            "processed table columns differ from original".to_string(),
        ));
    }
    Ok(())
}
