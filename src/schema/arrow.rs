// src/schema/arrow.rs

use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema, SchemaRef};
use std::sync::Arc;

use super::types::TableSchema;

/// Build the Arrow schema a loaded table is stored under.
///
/// - region, group → Utf8
/// - year          → Int32
/// - counts        → UInt64
///
/// Nothing is nullable: empty count cells are read as zero and empty keys are
/// rejected by the loader.
pub fn build_arrow_schema(table: &TableSchema) -> SchemaRef {
    let mut fields = vec![
        ArrowField::new(&table.region_column, DataType::Utf8, false),
        ArrowField::new(&table.group_column, DataType::Utf8, false),
        ArrowField::new(&table.year_column, DataType::Int32, false),
    ];
    fields.extend(
        table
            .count_columns
            .iter()
            .map(|name| ArrowField::new(name, DataType::UInt64, false)),
    );

    Arc::new(ArrowSchema::new(fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_order_matches_table_schema() {
        let table = TableSchema {
            name: "victims".into(),
            region_column: "Area_Name".into(),
            group_column: "Subgroup".into(),
            year_column: "Year".into(),
            count_columns: vec!["Rape_Cases_Reported".into()],
        };
        let schema = build_arrow_schema(&table);
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, table.columns().collect::<Vec<_>>());
        assert_eq!(schema.field(2).data_type(), &DataType::Int32);
        assert_eq!(schema.field(3).data_type(), &DataType::UInt64);
    }
}
