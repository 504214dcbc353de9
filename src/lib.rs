//! # rowpane
//!
//! SQL window function evaluation over in-memory row sets, designed for
//! deterministic output, strict setup-time validation, and partition-parallel
//! execution.

// Allow certain clippy warnings for development
#![allow(clippy::len_without_is_empty)]

//!
//! ## Features
//!
//! - **SQL window semantics**: partitions, ORDER BY peer groups, and
//!   ROWS/RANGE frames with the standard default frames
//! - **Strict validation**: every configuration error surfaces before the
//!   first row is computed
//! - **Deterministic results**: output preserves input row order and ties
//!   sort stably, so repeated runs agree
//! - **Partition-parallel evaluation**: bounded worker pool on `tokio` with
//!   cooperative cancellation
//!
//! ## Quick Start
//!
//! ```rust
//! use rowpane::{
//!     Column, ColumnType, FieldValue, FunctionCall, OrderKey, Row, Schema,
//!     WindowEvaluator, WindowRequest, WindowSpec,
//! };
//! use std::collections::HashMap;
//!
//! fn row(region: &str, amount: i64) -> Row {
//!     let mut fields = HashMap::new();
//!     fields.insert("region".to_string(), FieldValue::String(region.to_string()));
//!     fields.insert("amount".to_string(), FieldValue::Integer(amount));
//!     Row::new(fields)
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rows = vec![row("east", 40), row("west", 10), row("east", 20)];
//!     let schema = Schema::new(vec![
//!         Column::new("region", ColumnType::String),
//!         Column::new("amount", ColumnType::Integer),
//!     ]);
//!
//!     // Rank rows and total amounts within each region
//!     let requests = vec![WindowRequest::new(
//!         WindowSpec::new()
//!             .partition_by(vec!["region"])
//!             .order_by(vec![OrderKey::desc("amount")]),
//!         vec![
//!             FunctionCall::no_args("row_number", "rn"),
//!             FunctionCall::on_column("sum", "amount", "running_total"),
//!         ],
//!     )];
//!
//!     let result = WindowEvaluator::evaluate(&rows, &schema, &requests)?;
//!     assert_eq!(result[0].column("rn"), FieldValue::Integer(1));
//!     assert_eq!(result[2].column("running_total"), FieldValue::Integer(60));
//!     Ok(())
//! }
//! ```

// Export the rowpane.window module structure
pub mod rowpane;

// Re-export main API at crate root for easy access
pub use rowpane::window::{
    // Cancellation
    CancellationHandle,
    // Data model
    Column,
    ColumnType,
    FieldValue,
    // Frames
    FrameBound,
    FrameSpec,
    FrameUnit,
    // Function calls
    FunctionArg,
    FunctionCall,
    NullOrdering,
    OrderKey,
    // Evaluators
    ParallelConfig,
    ParallelEvaluator,
    // Validation
    RequestValidator,
    Row,
    Schema,
    SortDirection,
    // Errors
    WindowError,
    WindowEvaluator,
    WindowRequest,
    WindowResult,
    WindowSpec,
};
