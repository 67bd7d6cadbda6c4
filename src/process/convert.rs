use arrow::{
    array::{ArrayRef, Int32Builder, StringBuilder, UInt64Builder},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::process::{raw_table::RawTable, utils};
use crate::schema::{build_arrow_schema, TableSchema};

/// Convert the string cells of `raw` into the typed columns of `schema`.
///
/// Columns the schema does not name are dropped. Fails if the header lacks a
/// schema column, a key cell is empty, or a number does not parse.
pub fn convert_to_batch(raw: &RawTable, schema: &TableSchema) -> Result<RecordBatch> {
    let positions = schema.header_positions(&raw.headers).map_err(|missing| {
        PipelineError::load(
            &raw.source,
            format!("header is missing column(s): {}", missing.join(", ")),
        )
    })?;

    let extra = schema.extra_columns(&raw.headers);
    if !extra.is_empty() {
        debug!(
            source = %raw.source.display(),
            ignored = extra.len(),
            "ignoring columns outside the `{}` schema",
            schema.name
        );
    }

    let n = raw.rows.len();
    let mut regions = StringBuilder::with_capacity(n, n * 16);
    let mut groups = StringBuilder::with_capacity(n, n * 16);
    let mut years = Int32Builder::with_capacity(n);
    let mut counts: Vec<UInt64Builder> = schema
        .count_columns
        .iter()
        .map(|_| UInt64Builder::with_capacity(n))
        .collect();

    for (idx, row) in raw.rows.iter().enumerate() {
        let line = raw.line(idx);
        let cell = |pos: usize| row.get(positions[pos]).map(String::as_str).unwrap_or("");

        for (pos, builder) in [(0, &mut regions), (1, &mut groups)] {
            let key = utils::clean_str(cell(pos));
            if key.is_empty() {
                return Err(PipelineError::load(
                    &raw.source,
                    format!("line {}: empty `{}`", line, column_name(schema, pos)),
                ));
            }
            builder.append_value(key);
        }

        let year = utils::parse_year(cell(2)).ok_or_else(|| {
            PipelineError::load(
                &raw.source,
                format!(
                    "line {}: `{}` is not a year: {:?}",
                    line,
                    schema.year_column,
                    cell(2)
                ),
            )
        })?;
        years.append_value(year);

        for (i, builder) in counts.iter_mut().enumerate() {
            let pos = 3 + i;
            let value = utils::parse_count(cell(pos)).ok_or_else(|| {
                PipelineError::load(
                    &raw.source,
                    format!(
                        "line {}: `{}` is not a non-negative count: {:?}",
                        line,
                        column_name(schema, pos),
                        cell(pos)
                    ),
                )
            })?;
            builder.append_value(value);
        }
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(positions.len());
    columns.push(Arc::new(regions.finish()));
    columns.push(Arc::new(groups.finish()));
    columns.push(Arc::new(years.finish()));
    columns.extend(counts.iter_mut().map(|b| Arc::new(b.finish()) as ArrayRef));

    RecordBatch::try_new(build_arrow_schema(schema), columns).map_err(Into::into)
}

fn column_name(schema: &TableSchema, pos: usize) -> &str {
    schema.columns().nth(pos).unwrap_or("?")
}
