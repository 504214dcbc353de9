// Window function evaluation module for rowpane
// Provides SQL window semantics over in-memory row sets

pub mod error;
pub mod execution;
pub mod spec;
pub mod validation;

// Re-export main API
pub use error::{WindowError, WindowResult};
pub use execution::{
    CancellationHandle, Column, ColumnType, FieldValue, ParallelConfig, ParallelEvaluator, Row,
    Schema, WindowEvaluator,
};
pub use spec::{
    FrameBound, FrameSpec, FrameUnit, FunctionArg, FunctionCall, NullOrdering, OrderKey,
    SortDirection, WindowRequest, WindowSpec,
};
pub use validation::RequestValidator;

// Version and feature info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const FEATURES: &[&str] = &[
    "ranking_functions",   // ROW_NUMBER, RANK, DENSE_RANK, PERCENT_RANK, CUME_DIST, NTILE
    "offset_functions",    // LAG, LEAD with defaults
    "value_functions",     // FIRST_VALUE, LAST_VALUE, NTH_VALUE
    "aggregate_functions", // COUNT, SUM, AVG, MIN, MAX, STDDEV, VARIANCE over frames
    "rows_frames",         // ROWS BETWEEN ... AND ... with edge clamping
    "range_frames",        // RANGE peer groups and numeric offset distances
    "null_ordering",       // NULLS FIRST / NULLS LAST with direction-aware defaults
    "parallel_partitions", // bounded partition-parallel evaluation with cancellation
];
