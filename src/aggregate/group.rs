// src/aggregate/group.rs

use polars::prelude::*;
use tracing::debug;

use super::reshape::{str_column, u64_column, WideRow, WideTable};
use crate::dataset::Dataset;
use crate::error::Result;

/// Sum `columns` per group key (district, subgroup).
///
/// One output row per distinct group, groups in first-seen order, columns in
/// the order given.
pub fn group_sums<S: AsRef<str>>(data: &Dataset, columns: &[S]) -> Result<WideTable> {
    data.schema().resolve_counts(columns)?;
    let group = data.schema().group_column.as_str();
    let names: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();

    let sums: Vec<Expr> = names
        .iter()
        .map(|c| col(c.as_str()).sum().cast(DataType::UInt64))
        .collect();
    let grouped = data
        .to_frame()?
        .lazy()
        .group_by_stable([col(group)])
        .agg(sums)
        .collect()?;
    debug!(groups = grouped.height(), "grouped `{}` by {}", data.schema().name, group);

    let ids = str_column(&grouped, group)?;
    let values = names
        .iter()
        .map(|c| u64_column(&grouped, c))
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
        id_column: group.to_string(),
        value_columns: names,
        rows,
    })
}

/// Every row of `data` as a wide row keyed by its group, without summing.
pub fn rows_as_wide<S: AsRef<str>>(data: &Dataset, columns: &[S]) -> Result<WideTable> {
    let values = columns
        .iter()
        .map(|c| data.count_values(c.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let rows = data
        .group_values()
        .iter()
        .enumerate()
        .map(|(row, group)| WideRow {
            id: group.unwrap_or_default().to_string(),
            values: values.iter().map(|col| col.value(row)).collect(),
        })
        .collect();

    Ok(WideTable {
        id_column: data.schema().group_column.clone(),
        value_columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{category_totals, melt};
    use crate::dataset::tests::crime_rows;

    #[test]
    fn group_sums_one_row_per_district_first_seen() {
        let data = crime_rows(&[
            ("Karnataka", "Mysuru", 2013, 3, 2),
            ("Karnataka", "Bengaluru", 2013, 10, 5),
            ("Karnataka", "Mysuru", 2014, 4, 1),
        ]);
        let table = group_sums(&data, &["Murder", "Rape"]).unwrap();
        assert_eq!(table.id_column, "District");
        assert_eq!(table.ids().collect::<Vec<_>>(), vec!["Mysuru", "Bengaluru"]);
        assert_eq!(table.get("Mysuru", "Murder"), Some(7));
        assert_eq!(table.get("Mysuru", "Rape"), Some(3));
        assert_eq!(table.get("Bengaluru", "Murder"), Some(10));
    }

    #[test]
    fn group_sums_agree_with_category_totals() {
        let data = crime_rows(&[
            ("Goa", "North Goa", 2013, 1, 2),
            ("Goa", "South Goa", 2013, 4, 8),
            ("Goa", "North Goa", 2014, 16, 32),
        ]);
        let grouped = group_sums(&data, &["Rape", "Murder"]).unwrap();
        let totals = category_totals(&data, &["Rape", "Murder"]).unwrap();
        assert_eq!(grouped.column_totals(), totals);
    }

    #[test]
    fn rows_as_wide_keeps_duplicate_districts() {
        let data = crime_rows(&[
            ("Goa", "North Goa", 2013, 1, 2),
            ("Goa", "North Goa", 2014, 3, 4),
        ]);
        let wide = rows_as_wide(&data, &["Murder", "Rape"]).unwrap();
        assert_eq!(wide.rows.len(), 2);
        let long = melt(&wide, "CrimeType", "CrimeCount").unwrap();
        assert_eq!(long.rows.len(), 4);
        assert_eq!(long.totals_by_variable().unwrap().get("Rape"), Some(6));
    }

    #[test]
    fn unknown_column_is_drift() {
        let data = crime_rows(&[("Goa", "North Goa", 2013, 1, 2)]);
        assert!(matches!(
            group_sums(&data, &["Dacoity"]),
            Err(crate::error::PipelineError::SchemaDrift { .. })
        ));
    }

    #[test]
    fn empty_input_gives_empty_comparison() {
        let data = crime_rows(&[]);
        let table = group_sums(&data, &["Murder"]).unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.value_columns, vec!["Murder"]);
    }
}
