// src/aggregate/reshape.rs

use polars::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

use super::{CategoryCount, CategoryTotals};
use crate::error::Result;

/// One row per entity, one value column per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WideTable {
    pub id_column: String,
    pub value_columns: Vec<String>,
    pub rows: Vec<WideRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WideRow {
    pub id: String,
    /// Parallel to `WideTable::value_columns`.
    pub values: Vec<u64>,
}

/// One row per (entity, category) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongTable {
    pub id_column: String,
    pub var_column: String,
    pub value_column: String,
    pub rows: Vec<LongRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongRow {
    pub id: String,
    pub variable: String,
    pub value: u64,
}

impl WideTable {
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.id.as_str())
    }

    /// Value at (`id`, `column`); the first row wins if ids repeat.
    pub fn get(&self, id: &str, column: &str) -> Option<u64> {
        let col = self.value_columns.iter().position(|c| c == column)?;
        self.rows
            .iter()
            .find(|r| r.id == id)
            .and_then(|r| r.values.get(col).copied())
    }

    /// Per-column sums across all rows, in column order.
    pub fn column_totals(&self) -> CategoryTotals {
        self.value_columns
            .iter()
            .enumerate()
            .map(|(i, name)| CategoryCount {
                category: name.clone(),
                count: self.rows.iter().map(|r| r.values[i]).sum(),
            })
            .collect()
    }
}

impl LongTable {
    /// Sum of values per variable, variables in first-seen order.
    pub fn totals_by_variable(&self) -> Result<CategoryTotals> {
        let sums = long_frame(self)?
            .lazy()
            .group_by_stable([col(VAR)])
            .agg([col(VALUE).sum().cast(DataType::UInt64)])
            .collect()?;
        let names = str_column(&sums, VAR)?;
        let counts = u64_column(&sums, VALUE)?;
        Ok(names
            .into_iter()
            .zip(counts.into_iter())
            .map(|(name, count)| CategoryCount {
                category: name.unwrap_or_default().to_string(),
                count: count.unwrap_or_default(),
            })
            .collect())
    }
}

// Fixed frame column names, so user-facing names never collide.
const ROW: &str = "__row";
const ID: &str = "__id";
const VAR: &str = "__variable";
const VALUE: &str = "__value";

/// Unpivot `wide` into (id, variable, value) rows.
///
/// Output is grouped by input row, then by value column in column order.
pub fn melt(wide: &WideTable, var_name: &str, value_name: &str) -> Result<LongTable> {
    let mut long = LongTable {
        id_column: wide.id_column.clone(),
        var_column: var_name.to_string(),
        value_column: value_name.to_string(),
        rows: Vec::new(),
    };
    if wide.rows.is_empty() || wide.value_columns.is_empty() {
        return Ok(long);
    }

    // unpivot emits one block per column; restore row-major order by the
    // input row index, keeping column order within a row.
    let on: Vec<&str> = wide.value_columns.iter().map(String::as_str).collect();
    let unpivoted = wide_frame(wide)?
        .with_row_index(ROW.into(), None)?
        .unpivot(on, [ROW, ID])?
        .lazy()
        .sort([ROW], SortMultipleOptions::default().with_maintain_order(true))
        .select([
            col(ID),
            col("variable").alias(VAR),
            col("value").alias(VALUE),
        ])
        .collect()?;

    long.rows = long_rows(&unpivoted)?;
    Ok(long)
}

/// Pivot `long` back to one row per id.
///
/// Ids and columns appear in first-seen order. Repeated (id, variable) pairs
/// are summed; pairs that never occur are zero.
pub fn pivot(long: &LongTable) -> Result<WideTable> {
    let mut seen = HashSet::new();
    let columns: Vec<String> = long
        .rows
        .iter()
        .filter(|r| seen.insert(r.variable.as_str()))
        .map(|r| r.variable.clone())
        .collect();
    if columns.is_empty() {
        return Ok(WideTable {
            id_column: long.id_column.clone(),
            value_columns: columns,
            rows: Vec::new(),
        });
    }
    pivot_columns(long_frame(long)?.lazy(), &long.id_column, &columns)
}

/// Pivot a frame holding `__id`, `__variable` and `__value` into one row per
/// id (first-seen order) and one column per entry of `columns`, in that
/// order. Each cell sums its matching values and is zero when none match.
pub(crate) fn pivot_columns(
    long: LazyFrame,
    id_column: &str,
    columns: &[String],
) -> Result<WideTable> {
    let cells: Vec<Expr> = columns
        .iter()
        .map(|c| {
            col(VALUE)
                .filter(col(VAR).eq(lit(c.as_str())))
                .sum()
                .cast(DataType::UInt64)
                .fill_null(lit(0u64))
                .alias(c.as_str())
        })
        .collect();
    let wide = long.group_by_stable([col(ID)]).agg(cells).collect()?;
    wide_rows(&wide, id_column, columns)
}

/// Frame columns for a long table, for callers that build one from a dataset.
pub(crate) fn long_frame_columns(id: Expr, variable: Expr, value: Expr) -> [Expr; 3] {
    [id.alias(ID), variable.alias(VAR), value.alias(VALUE)]
}

fn wide_frame(wide: &WideTable) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(wide.value_columns.len() + 1);
    let ids: Vec<&str> = wide.ids().collect();
    columns.push(Column::new(ID.into(), ids));
    for (i, name) in wide.value_columns.iter().enumerate() {
        let values: Vec<u64> = wide.rows.iter().map(|r| r.values[i]).collect();
        columns.push(Column::new(name.as_str().into(), values));
    }
    Ok(DataFrame::new(columns)?)
}

fn long_frame(long: &LongTable) -> Result<DataFrame> {
    let ids: Vec<&str> = long.rows.iter().map(|r| r.id.as_str()).collect();
    let vars: Vec<&str> = long.rows.iter().map(|r| r.variable.as_str()).collect();
    let values: Vec<u64> = long.rows.iter().map(|r| r.value).collect();
    Ok(DataFrame::new(vec![
        Column::new(ID.into(), ids),
        Column::new(VAR.into(), vars),
        Column::new(VALUE.into(), values),
    ])?)
}

fn wide_rows(frame: &DataFrame, id_column: &str, columns: &[String]) -> Result<WideTable> {
    let ids = str_column(frame, ID)?;
    let values = columns
        .iter()
        .map(|c| u64_column(frame, c))
        .collect::<Result<Vec<_>>>()?;
    let rows = ids
        .into_iter()
        .enumerate()
        .map(|(row, id)| WideRow {
            id: id.unwrap_or_default().to_string(),
            values: values
                .iter()
                .map(|v| v.get(row).unwrap_or_default())
                .collect(),
        })
        .collect();
    Ok(WideTable {
        id_column: id_column.to_string(),
        value_columns: columns.to_vec(),
        rows,
    })
}

fn long_rows(frame: &DataFrame) -> Result<Vec<LongRow>> {
    let ids = str_column(frame, ID)?;
    let vars = str_column(frame, VAR)?;
    let values = u64_column(frame, VALUE)?;
    Ok(ids
        .into_iter()
        .zip(vars.into_iter())
        .zip(values.into_iter())
        .map(|((id, variable), value)| LongRow {
            id: id.unwrap_or_default().to_string(),
            variable: variable.unwrap_or_default().to_string(),
            value: value.unwrap_or_default(),
        })
        .collect())
}

pub(crate) fn str_column<'a>(frame: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    Ok(frame.column(name)?.as_materialized_series().str()?)
}

pub(crate) fn u64_column<'a>(frame: &'a DataFrame, name: &str) -> Result<&'a UInt64Chunked> {
    Ok(frame.column(name)?.as_materialized_series().u64()?)
}
