//! CSV statement aggregation.

pub mod aggregate;
pub mod columns;

pub use aggregate::{aggregate_statement, StatementAggregator, StatementOptions};
pub use columns::{canonicalize_header, ColumnMapping, MappedColumn};

use crate::error::StatementError;

/// Result type for statement operations.
pub type Result<T> = std::result::Result<T, StatementError>;
