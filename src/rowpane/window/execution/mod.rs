//! Window evaluation engine.
//!
//! This module holds the runtime half of the crate: the row and schema
//! model plus the pipeline stages that turn validated window requests into
//! computed columns. It provides support for:
//!
//! - Partitioning rows by PARTITION BY key equality
//! - Ordering partitions and deriving peer-group metadata
//! - Resolving ROWS and RANGE frames to concrete row ranges
//! - Planning and evaluating window function calls
//! - Sequential and partition-parallel drivers
//!
//! ## Public API
//!
//! The main interface for window evaluation:
//!
//! - [`WindowEvaluator`] - Sequential evaluation over a row set
//! - [`ParallelEvaluator`] - Partition-parallel evaluation with cancellation
//! - [`Row`], [`Schema`], [`FieldValue`] - The data model
//!
//! ## Usage
//!
//! ```rust
//! use rowpane::rowpane::window::execution::pipeline::WindowEvaluator;
//! use rowpane::rowpane::window::execution::types::{Column, ColumnType, FieldValue, Row, Schema};
//! use rowpane::rowpane::window::spec::{FunctionCall, OrderKey, WindowRequest, WindowSpec};
//! use std::collections::HashMap;
//!
//! let mut fields = HashMap::new();
//! fields.insert("amount".to_string(), FieldValue::Integer(42));
//! let rows = vec![Row::new(fields)];
//! let schema = Schema::new(vec![Column::new("amount", ColumnType::Integer)]);
//!
//! let requests = vec![WindowRequest::new(
//!     WindowSpec::new().order_by(vec![OrderKey::asc("amount")]),
//!     vec![FunctionCall::no_args("row_number", "rn")],
//! )];
//!
//! let result = WindowEvaluator::evaluate(&rows, &schema, &requests).unwrap();
//! assert_eq!(result[0].column("rn"), FieldValue::Integer(1));
//! ```

pub mod aggregates;
pub mod frame;
pub mod functions;
pub mod order;
pub mod parallel;
pub mod partition;
pub mod pipeline;
pub mod types;

// Re-export key types for convenience
pub use self::aggregates::FrameAggregates;
pub use self::frame::{effective_frame, FrameResolver, ResolvedFrame};
pub use self::functions::{FunctionKind, PlannedFunction, SUPPORTED_FUNCTIONS};
pub use self::order::{order_partition, OrderedPartition};
pub use self::parallel::{CancellationHandle, ParallelConfig, ParallelEvaluator};
pub use self::partition::{partition_rows, Partition};
pub use self::pipeline::WindowEvaluator;
pub use self::types::{Column, ColumnType, FieldValue, Row, Schema};
