// src/aggregate/mod.rs
pub mod group;
pub mod reshape;

use serde::Serialize;

use crate::dataset::Dataset;
use crate::error::Result;

pub use group::{group_sums, rows_as_wide};
pub use reshape::{melt, pivot, LongRow, LongTable, WideRow, WideTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Ordered category → sum mapping.
///
/// Order is whatever the producer chose (normally the caller's category list);
/// nothing here re-sorts implicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryTotals(Vec<CategoryCount>);

impl CategoryTotals {
    pub fn iter(&self) -> std::slice::Iter<'_, CategoryCount> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, category: &str) -> Option<u64> {
        self.0
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.count)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|c| c.category.as_str())
    }

    /// Sum over every category.
    pub fn grand_total(&self) -> u64 {
        self.0.iter().map(|c| c.count).sum()
    }

    /// Same entries, largest first. Ties keep their current relative order.
    pub fn sorted_desc(&self) -> CategoryTotals {
        let mut sorted = self.0.clone();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        CategoryTotals(sorted)
    }
}

impl FromIterator<CategoryCount> for CategoryTotals {
    fn from_iter<I: IntoIterator<Item = CategoryCount>>(iter: I) -> Self {
        CategoryTotals(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CategoryTotals {
    type Item = &'a CategoryCount;
    type IntoIter = std::slice::Iter<'a, CategoryCount>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Sum each of `categories` over every row of `data`, in the order given.
///
/// All names are resolved before anything is summed, so a category the table
/// does not carry fails with `SchemaDrift` instead of reading as zero.
pub fn category_totals<S: AsRef<str>>(data: &Dataset, categories: &[S]) -> Result<CategoryTotals> {
    data.schema().resolve_counts(categories)?;
    categories
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let values = data.count_values(name)?;
            Ok(CategoryCount {
                category: name.to_string(),
                count: arrow::compute::sum(values).unwrap_or(0),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::crime_rows;
    use crate::error::PipelineError;

    fn totals(pairs: &[(&str, u64)]) -> CategoryTotals {
        pairs
            .iter()
            .map(|(c, n)| CategoryCount {
                category: c.to_string(),
                count: *n,
            })
            .collect()
    }

    #[test]
    fn totals_follow_caller_order() {
        let data = crime_rows(&[
            ("Karnataka", "Bengaluru", 2013, 10, 5),
            ("Karnataka", "Mysuru", 2013, 3, 2),
        ]);
        let t = category_totals(&data, &["Rape", "Murder"]).unwrap();
        assert_eq!(t, totals(&[("Rape", 7), ("Murder", 13)]));
        assert_eq!(t.grand_total(), 20);
    }

    #[test]
    fn empty_table_sums_to_zero() {
        let data = crime_rows(&[]);
        let t = category_totals(&data, &["Murder", "Rape"]).unwrap();
        assert_eq!(t, totals(&[("Murder", 0), ("Rape", 0)]));
    }

    #[test]
    fn unknown_category_is_drift_not_zero() {
        let data = crime_rows(&[("Goa", "North Goa", 2013, 1, 1)]);
        let err = category_totals(&data, &["Murder", "Arson"]).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaDrift { ref column, .. } if column == "Arson"));
    }

    #[test]
    fn sorted_desc_is_stable_and_keeps_the_multiset() {
        let t = totals(&[("Murder", 4), ("Rape", 9), ("Arson", 4), ("Hurt", 12)]);
        let sorted = t.sorted_desc();
        let order: Vec<&str> = sorted.categories().collect();
        assert_eq!(order, vec!["Hurt", "Rape", "Murder", "Arson"]);
        assert_eq!(sorted.grand_total(), t.grand_total());
        assert_eq!(sorted.len(), t.len());
    }
}
