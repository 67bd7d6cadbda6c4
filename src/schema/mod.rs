pub mod arrow;
pub mod types;

pub use arrow::build_arrow_schema;
pub use types::TableSchema;
