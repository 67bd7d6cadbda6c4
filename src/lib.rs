//! District-level crime dataset navigator.
//!
//! Source CSVs are loaded once into immutable Arrow-backed [`Dataset`]s, and
//! every view is a pure filter → aggregate → reshape pass over them.

pub mod aggregate;
pub mod config;
pub mod danger;
pub mod dataset;
pub mod display;
pub mod error;
pub mod process;
pub mod schema;
pub mod victims;
pub mod views;

pub use aggregate::{category_totals, CategoryTotals};
pub use config::DataConfig;
pub use danger::{classify, DangerAssessment, DangerTier};
pub use dataset::Dataset;
pub use error::{PipelineError, Result};
pub use views::{Catalog, Selection, ViewKind, ViewReport};
