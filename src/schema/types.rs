// src/schema/types.rs

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{PipelineError, Result};

/// Column layout of one kind of source table.
///
/// Every table has two text keys (a region and a group within it), a year,
/// and an ordered list of non-negative count columns. Names are the exact CSV
/// header strings; in memory the columns sit in that same order:
/// region, group, year, then the counts.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq)]
pub struct TableSchema {
    pub name: String,
    pub region_column: String,
    pub group_column: String,
    pub year_column: String,
    pub count_columns: Vec<String>,
}

/// Offset of the first count column in a loaded batch.
pub(crate) const FIRST_COUNT: usize = 3;

impl TableSchema {
    /// Reject schemas that cannot describe a loadable table.
    pub fn validate(&self) -> Result<()> {
        if self.count_columns.is_empty() {
            return Err(PipelineError::Config(format!(
                "table `{}` declares no count columns",
                self.name
            )));
        }
        let mut seen = HashSet::new();
        for col in self.columns() {
            if col.trim().is_empty() {
                return Err(PipelineError::Config(format!(
                    "table `{}` has an empty column name",
                    self.name
                )));
            }
            if !seen.insert(col) {
                return Err(PipelineError::Config(format!(
                    "table `{}` names column `{}` more than once",
                    self.name, col
                )));
            }
        }
        Ok(())
    }

    /// All column names in in-memory order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        [
            self.region_column.as_str(),
            self.group_column.as_str(),
            self.year_column.as_str(),
        ]
        .into_iter()
        .chain(self.count_columns.iter().map(String::as_str))
    }

    /// Position of a count column inside a loaded batch.
    pub fn count_index(&self, name: &str) -> Result<usize> {
        self.count_columns
            .iter()
            .position(|c| c == name)
            .map(|i| FIRST_COUNT + i)
            .ok_or_else(|| PipelineError::drift(&self.name, name))
    }

    /// Resolve every requested count column up front, failing on the first
    /// name the schema does not carry.
    pub fn resolve_counts<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|n| self.count_index(n.as_ref()))
            .collect()
    }

    /// Map each schema column to its position in a file header.
    ///
    /// Returns the names of the schema columns the header lacks on failure.
    pub fn header_positions(&self, headers: &[String]) -> Result<Vec<usize>, Vec<String>> {
        let mut positions = Vec::with_capacity(FIRST_COUNT + self.count_columns.len());
        let mut missing = Vec::new();
        for col in self.columns() {
            match headers.iter().position(|h| h == col) {
                Some(i) => positions.push(i),
                None => missing.push(col.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(positions)
        } else {
            Err(missing)
        }
    }

    /// Header cells that the schema does not name.
    pub fn extra_columns<'a>(&self, headers: &'a [String]) -> Vec<&'a str> {
        let known: HashSet<&str> = self.columns().collect();
        headers
            .iter()
            .map(String::as_str)
            .filter(|h| !known.contains(h))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> TableSchema {
        TableSchema {
            name: "crime".into(),
            region_column: "States/UTs".into(),
            group_column: "District".into(),
            year_column: "Year".into(),
            count_columns: vec!["Murder".into(), "Rape".into()],
        }
    }

    #[test]
    fn count_index_is_offset_past_keys() {
        let s = schema();
        assert_eq!(s.count_index("Murder").unwrap(), 3);
        assert_eq!(s.count_index("Rape").unwrap(), 4);
    }

    #[test]
    fn unknown_count_is_schema_drift() {
        let err = schema().resolve_counts(&["Murder", "Arson"]).unwrap_err();
        match err {
            PipelineError::SchemaDrift { table, column } => {
                assert_eq!(table, "crime");
                assert_eq!(column, "Arson");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn header_positions_follow_file_order() {
        let headers: Vec<String> = ["Year", "Rape", "District", "Other", "States/UTs", "Murder"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let pos = schema().header_positions(&headers).unwrap();
        assert_eq!(pos, vec![4, 2, 0, 5, 1]);
        assert_eq!(schema().extra_columns(&headers), vec!["Other"]);
    }

    #[test]
    fn header_positions_report_every_missing_column() {
        let headers: Vec<String> = vec!["States/UTs".into(), "murder".into()];
        let missing = schema().header_positions(&headers).unwrap_err();
        assert_eq!(missing, vec!["District", "Year", "Murder", "Rape"]);
    }

    #[test]
    fn validate_rejects_duplicates_and_empty_counts() {
        let mut s = schema();
        s.count_columns.push("Murder".into());
        assert!(matches!(s.validate(), Err(PipelineError::Config(_))));

        let mut s = schema();
        s.count_columns.clear();
        assert!(matches!(s.validate(), Err(PipelineError::Config(_))));

        assert!(schema().validate().is_ok());
    }
}
