//! Flattening, aggregation, and CSV export of upstream insight data.

pub mod aggregate;
pub mod columns;
pub mod emit;
pub mod error;
pub mod join;
pub mod record;
pub mod report;

pub use aggregate::aggregate;
pub use columns::discover_columns;
pub use emit::to_csv;
pub use error::ReportError;
pub use join::{collect_insights, InsightSet};
pub use record::{FlatRecord, Record};
pub use report::Table;
