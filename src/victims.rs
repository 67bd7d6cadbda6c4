// src/victims.rs
//! Derived views over the rape-victim table for one selected state.

use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::aggregate::reshape::{long_frame_columns, pivot_columns, u64_column};
use crate::aggregate::{category_totals, group_sums, melt, CategoryTotals, LongTable, WideTable};
use crate::dataset::Dataset;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub reported: u64,
}

/// The four woman-safety views, each derived independently from the same
/// filtered input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WomanSafetyReport {
    /// Reported cases per year, ascending.
    pub trend: Vec<YearCount>,
    /// Age-band totals per subgroup.
    pub age_groups: WideTable,
    /// Region × year reported cases in long form, zero-filled.
    pub heatmap: LongTable,
    /// Age-band totals across every row.
    pub demographics: CategoryTotals,
}

/// Sum of `reported` per year, years ascending.
pub fn yearly_trend(data: &Dataset, reported: &str) -> Result<Vec<YearCount>> {
    data.count_values(reported)?;
    let year = data.schema().year_column.as_str();
    let by_year = data
        .to_frame()?
        .lazy()
        .group_by([col(year)])
        .agg([col(reported).sum().cast(DataType::UInt64)])
        .sort([year], SortMultipleOptions::default())
        .collect()?;

    let years = by_year.column(year)?.as_materialized_series().i32()?;
    let sums = u64_column(&by_year, reported)?;
    Ok(years
        .into_iter()
        .zip(sums.into_iter())
        .map(|(year, reported)| YearCount {
            year: year.unwrap_or_default(),
            reported: reported.unwrap_or_default(),
        })
        .collect())
}

/// Age-band totals grouped by subgroup.
pub fn age_group_totals<S: AsRef<str>>(data: &Dataset, bands: &[S]) -> Result<WideTable> {
    group_sums(data, bands)
}

/// Region × year pivot of `reported`, then melted for heatmap rendering.
///
/// Regions keep first-seen order and years ascend. A (region, year) pair with
/// no rows reads as zero.
pub fn region_year_heatmap(data: &Dataset, reported: &str) -> Result<LongTable> {
    data.count_values(reported)?;
    let schema = data.schema();
    let empty = LongTable {
        id_column: schema.region_column.clone(),
        var_column: schema.year_column.clone(),
        value_column: reported.to_string(),
        rows: Vec::new(),
    };
    if data.is_empty() {
        return Ok(empty);
    }

    let years: BTreeSet<i32> = data.year_values().values().iter().copied().collect();
    let year_columns: Vec<String> = years.iter().map(i32::to_string).collect();
    let long = data
        .to_frame()?
        .lazy()
        .select(long_frame_columns(
            col(schema.region_column.as_str()),
            col(schema.year_column.as_str()).cast(DataType::String),
            col(reported),
        ));
    let grid = pivot_columns(long, &schema.region_column, &year_columns)?;

    melt(&grid, &schema.year_column, reported)
}

/// Age-band totals across all rows, as (band, count) pairs in band order.
pub fn demographics<S: AsRef<str>>(data: &Dataset, bands: &[S]) -> Result<CategoryTotals> {
    category_totals(data, bands)
}

/// Compute every woman-safety view for an already state-filtered table.
///
/// The views do not depend on each other and run on the rayon pool.
pub fn woman_safety_views<S>(
    data: &Dataset,
    reported: &str,
    bands: &[S],
) -> Result<WomanSafetyReport>
where
    S: AsRef<str> + Sync,
{
    let ((by_year, heat), (by_subgroup, overall)) = rayon::join(
        || {
            rayon::join(
                || yearly_trend(data, reported),
                || region_year_heatmap(data, reported),
            )
        },
        || {
            rayon::join(
                || age_group_totals(data, bands),
                || demographics(data, bands),
            )
        },
    );

    Ok(WomanSafetyReport {
        trend: by_year?,
        age_groups: by_subgroup?,
        heatmap: heat?,
        demographics: overall?,
    })
}
