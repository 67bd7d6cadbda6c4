// src/dataset.rs

use arrow::{
    array::{Array, AsArray, Int32Array, StringArray, UInt64Array},
    compute::{self, kernels::cmp},
    datatypes::{Int32Type, UInt64Type},
    record_batch::RecordBatch,
};
use polars::prelude::{Column, DataFrame, NamedFrom};
use serde::Serialize;
use std::{collections::HashSet, sync::Arc};

use crate::aggregate::{CategoryCount, CategoryTotals};
use crate::error::{PipelineError, Result};
use crate::schema::{build_arrow_schema, TableSchema};

/// An immutable loaded table together with the schema it was validated
/// against.
///
/// Cloning is cheap: the Arrow columns are reference counted. Every query
/// derives a new `Dataset` (or a plain value) and leaves this one untouched.
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: Arc<TableSchema>,
    batch: RecordBatch,
}

/// One row in display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetRow {
    pub region: String,
    pub group: String,
    pub year: i32,
    pub counts: CategoryTotals,
}

impl Dataset {
    /// Wrap `batch`, checking that its columns are exactly those `schema`
    /// produces.
    pub fn new(schema: TableSchema, batch: RecordBatch) -> Result<Self> {
        let expected = build_arrow_schema(&schema);
        if batch.schema().fields() != expected.fields() {
            return Err(PipelineError::Config(format!(
                "record batch does not match the `{}` schema",
                schema.name
            )));
        }
        Ok(Self {
            schema: Arc::new(schema),
            batch,
        })
    }

    pub fn empty(schema: TableSchema) -> Self {
        let batch = RecordBatch::new_empty(build_arrow_schema(&schema));
        Self {
            schema: Arc::new(schema),
            batch,
        }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    pub(crate) fn region_values(&self) -> &StringArray {
        self.batch.column(0).as_string::<i32>()
    }

    pub(crate) fn group_values(&self) -> &StringArray {
        self.batch.column(1).as_string::<i32>()
    }

    pub(crate) fn year_values(&self) -> &Int32Array {
        self.batch.column(2).as_primitive::<Int32Type>()
    }

    /// The values of a count column, or `SchemaDrift` if this table has none
    /// by that name.
    pub fn count_values(&self, name: &str) -> Result<&UInt64Array> {
        let idx = self.schema.count_index(name)?;
        Ok(self.batch.column(idx).as_primitive::<UInt64Type>())
    }

    /// Distinct regions in first-seen order.
    pub fn regions(&self) -> Vec<String> {
        first_seen(self.region_values())
    }

    /// Distinct groups (districts, subgroups) in first-seen order.
    ///
    /// Call this on a region-filtered dataset to get the options valid for
    /// that region only.
    pub fn groups(&self) -> Vec<String> {
        first_seen(self.group_values())
    }

    /// Rows whose region equals `region` and, when given, whose group equals
    /// `group`. Matching is exact and case-sensitive; no match gives an empty
    /// dataset.
    pub fn filter_region(&self, region: &str, group: Option<&str>) -> Result<Dataset> {
        let mut mask = cmp::eq(self.region_values(), &StringArray::new_scalar(region))?;
        if let Some(group) = group {
            let by_group = cmp::eq(self.group_values(), &StringArray::new_scalar(group))?;
            mask = compute::and(&mask, &by_group)?;
        }
        let batch = compute::filter_record_batch(&self.batch, &mask)?;
        Ok(Dataset {
            schema: Arc::clone(&self.schema),
            batch,
        })
    }

    /// Copy the table into a polars frame for grouping and reshaping.
    ///
    /// Columns keep their schema names and order.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let schema = &self.schema;
        let mut columns = Vec::with_capacity(self.batch.num_columns());
        for (name, values) in [
            (&schema.region_column, self.region_values()),
            (&schema.group_column, self.group_values()),
        ] {
            let cells: Vec<&str> = values.iter().map(Option::unwrap_or_default).collect();
            columns.push(Column::new(name.as_str().into(), cells));
        }
        columns.push(Column::new(
            schema.year_column.as_str().into(),
            self.year_values().values().to_vec(),
        ));
        for name in &schema.count_columns {
            columns.push(Column::new(
                name.as_str().into(),
                self.count_values(name)?.values().to_vec(),
            ));
        }
        Ok(DataFrame::new(columns)?)
    }

    /// Rows in display form, counts in schema order.
    pub fn rows(&self) -> Vec<DatasetRow> {
        let regions = self.region_values();
        let groups = self.group_values();
        let years = self.year_values();
        let counts: Vec<(&String, &UInt64Array)> = self
            .schema
            .count_columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let idx = crate::schema::types::FIRST_COUNT + i;
                (name, self.batch.column(idx).as_primitive::<UInt64Type>())
            })
            .collect();

        (0..self.num_rows())
            .map(|row| DatasetRow {
                region: regions.value(row).to_string(),
                group: groups.value(row).to_string(),
                year: years.value(row),
                counts: counts
                    .iter()
                    .map(|(name, values)| CategoryCount {
                        category: name.to_string(),
                        count: values.value(row),
                    })
                    .collect(),
            })
            .collect()
    }
}

fn first_seen(values: &StringArray) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for v in values.iter().flatten() {
        if seen.insert(v) {
            out.push(v.to_string());
        }
    }
    debug_assert_eq!(values.null_count(), 0);
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::process::convert_to_batch;
    use crate::process::RawTable;

    pub(crate) fn crime_schema() -> TableSchema {
        TableSchema {
            name: "crime".into(),
            region_column: "States/UTs".into(),
            group_column: "District".into(),
            year_column: "Year".into(),
            count_columns: vec!["Murder".into(), "Rape".into()],
        }
    }

    /// Build a crime dataset from `(state, district, year, murder, rape)` rows.
    pub(crate) fn crime_rows(rows: &[(&str, &str, i32, u64, u64)]) -> Dataset {
        let raw = RawTable::new(
            "fixture.csv",
            ["States/UTs", "District", "Year", "Murder", "Rape"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows.iter()
                .map(|(s, d, y, m, r)| {
                    vec![
                        s.to_string(),
                        d.to_string(),
                        y.to_string(),
                        m.to_string(),
                        r.to_string(),
                    ]
                })
                .collect(),
        );
        let schema = crime_schema();
        let batch = convert_to_batch(&raw, &schema).unwrap();
        Dataset::new(schema, batch).unwrap()
    }

    fn sample() -> Dataset {
        crime_rows(&[
            ("Karnataka", "Bengaluru", 2013, 10, 5),
            ("Goa", "North Goa", 2013, 1, 0),
            ("Karnataka", "Mysuru", 2013, 3, 2),
            ("Karnataka", "Bengaluru", 2014, 7, 4),
        ])
    }

    #[test]
    fn to_frame_keeps_schema_columns() {
        let frame = sample().to_frame().unwrap();
        assert_eq!(frame.height(), sample().num_rows());
        let names: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, vec!["States/UTs", "District", "Year", "Murder", "Rape"]);
    }

    #[test]
    fn regions_and_groups_keep_first_seen_order() {
        let data = sample();
        assert_eq!(data.regions(), vec!["Karnataka", "Goa"]);
        let karnataka = data.filter_region("Karnataka", None).unwrap();
        assert_eq!(karnataka.groups(), vec!["Bengaluru", "Mysuru"]);
    }

    #[test]
    fn filter_narrows_by_district_within_state() {
        let data = sample();
        let rows = data.filter_region("Karnataka", Some("Bengaluru")).unwrap();
        assert_eq!(rows.num_rows(), 2);
        assert!(rows.rows().iter().all(|r| r.group == "Bengaluru"));
    }

    #[test]
    fn filter_is_case_sensitive_and_empty_on_miss() {
        let data = sample();
        assert!(data.filter_region("karnataka", None).unwrap().is_empty());
        let other_state = data.filter_region("Goa", Some("Mysuru")).unwrap();
        assert!(other_state.is_empty());
        assert_eq!(other_state.batch().num_columns(), 5);
    }

    #[test]
    fn count_values_reports_drift() {
        let data = sample();
        assert_eq!(data.count_values("Rape").unwrap().len(), 4);
        assert!(matches!(
            data.count_values("Arson"),
            Err(PipelineError::SchemaDrift { .. })
        ));
    }

    #[test]
    fn rows_expose_counts_in_schema_order() {
        let data = sample();
        let first = &data.rows()[0];
        assert_eq!(first.year, 2013);
        assert_eq!(first.counts.get("Murder"), Some(10));
        assert_eq!(first.counts.get("Rape"), Some(5));
    }

    #[test]
    fn new_rejects_a_foreign_batch() {
        let data = sample();
        let mut other = crime_schema();
        other.count_columns.push("Arson".into());
        assert!(Dataset::new(other, data.batch().clone()).is_err());
    }
}
