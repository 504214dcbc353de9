//! Window request model.
//!
//! The types here describe *what* to compute: how rows are partitioned and
//! ordered ([`WindowSpec`]), which row range each computation sees
//! ([`FrameSpec`]), and which functions to evaluate into which output
//! columns ([`FunctionCall`]). A [`WindowRequest`] binds one spec to one or
//! more calls; the evaluators consume slices of requests.

use crate::rowpane::window::execution::types::FieldValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction for an order key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Placement of NULL values relative to non-NULL values under an order key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NullOrdering {
    First,
    Last,
}

/// One ORDER BY key: column, direction, and null placement
///
/// When no placement is given, NULL sorts as the smallest value: first under
/// `Asc`, last under `Desc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderKey {
    /// Column to sort by
    pub column: String,
    /// Sort direction
    pub direction: SortDirection,
    /// Explicit NULL placement, if any
    pub nulls: Option<NullOrdering>,
}

impl OrderKey {
    /// Ascending key with default null placement
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
            nulls: None,
        }
    }

    /// Descending key with default null placement
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
            nulls: None,
        }
    }

    /// Place NULL values before all non-NULL values
    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullOrdering::First);
        self
    }

    /// Place NULL values after all non-NULL values
    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullOrdering::Last);
        self
    }

    /// Null placement after applying the direction-dependent default
    pub(crate) fn effective_nulls(&self) -> NullOrdering {
        match (self.nulls, self.direction) {
            (Some(placement), _) => placement,
            (None, SortDirection::Asc) => NullOrdering::First,
            (None, SortDirection::Desc) => NullOrdering::Last,
        }
    }
}

/// Frame unit: physical row offsets or logical value distances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameUnit {
    Rows,
    Range,
}

impl fmt::Display for FrameUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameUnit::Rows => write!(f, "ROWS"),
            FrameUnit::Range => write!(f, "RANGE"),
        }
    }
}

/// Frame boundary for window frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(u64),
    CurrentRow,
    Following(u64),
    UnboundedFollowing,
}

impl fmt::Display for FrameBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameBound::UnboundedPreceding => write!(f, "UNBOUNDED PRECEDING"),
            FrameBound::Preceding(n) => write!(f, "{} PRECEDING", n),
            FrameBound::CurrentRow => write!(f, "CURRENT ROW"),
            FrameBound::Following(n) => write!(f, "{} FOLLOWING", n),
            FrameBound::UnboundedFollowing => write!(f, "UNBOUNDED FOLLOWING"),
        }
    }
}

/// Window frame specification (ROWS/RANGE BETWEEN ... AND ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSpec {
    /// Frame unit (ROWS or RANGE)
    pub units: FrameUnit,
    /// Start bound
    pub start: FrameBound,
    /// End bound
    pub end: FrameBound,
}

impl FrameSpec {
    /// A ROWS frame between the given bounds
    pub fn rows(start: FrameBound, end: FrameBound) -> Self {
        Self {
            units: FrameUnit::Rows,
            start,
            end,
        }
    }

    /// A RANGE frame between the given bounds
    pub fn range(start: FrameBound, end: FrameBound) -> Self {
        Self {
            units: FrameUnit::Range,
            start,
            end,
        }
    }

    /// The whole partition: ROWS BETWEEN UNBOUNDED PRECEDING AND UNBOUNDED FOLLOWING
    pub fn entire_partition() -> Self {
        Self::rows(FrameBound::UnboundedPreceding, FrameBound::UnboundedFollowing)
    }
}

impl fmt::Display for FrameSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BETWEEN {} AND {}", self.units, self.start, self.end)
    }
}

/// Window specification: partitioning, ordering, and optional frame
///
/// When `frame` is `None` the SQL default applies: with a non-empty
/// `order_by`, `RANGE BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW`; with an
/// empty `order_by`, the entire partition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowSpec {
    /// PARTITION BY columns; empty means one partition holding every row
    pub partition_by: Vec<String>,
    /// ORDER BY keys; empty means input order with a single peer group
    pub order_by: Vec<OrderKey>,
    /// Explicit frame, if any
    pub frame: Option<FrameSpec>,
}

impl WindowSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the PARTITION BY columns
    pub fn partition_by(mut self, columns: Vec<&str>) -> Self {
        self.partition_by = columns.into_iter().map(|c| c.to_string()).collect();
        self
    }

    /// Set the ORDER BY keys
    pub fn order_by(mut self, keys: Vec<OrderKey>) -> Self {
        self.order_by = keys;
        self
    }

    /// Set an explicit frame
    pub fn with_frame(mut self, frame: FrameSpec) -> Self {
        self.frame = Some(frame);
        self
    }
}

/// Argument to a window function call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FunctionArg {
    /// A column reference, resolved per row
    Column(String),
    /// A constant value, e.g. an offset or a default
    Literal(FieldValue),
}

impl fmt::Display for FunctionArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionArg::Column(name) => write!(f, "{}", name),
            FunctionArg::Literal(value) => write!(f, "{}", value),
        }
    }
}

/// One window function call bound to an output column
///
/// Function names are matched case-insensitively; `COUNT` with no arguments
/// means `COUNT(*)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name, e.g. "row_number", "LAG", "sum"
    pub function: String,
    /// Call arguments in positional order
    pub args: Vec<FunctionArg>,
    /// Output column receiving the computed value
    pub output: String,
}

impl FunctionCall {
    pub fn new(
        function: impl Into<String>,
        args: Vec<FunctionArg>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            function: function.into(),
            args,
            output: output.into(),
        }
    }

    /// A zero-argument call such as `row_number()` or `count(*)`
    pub fn no_args(function: impl Into<String>, output: impl Into<String>) -> Self {
        Self::new(function, Vec::new(), output)
    }

    /// A single-column call such as `sum(amount)`
    pub fn on_column(
        function: impl Into<String>,
        column: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self::new(
            function,
            vec![FunctionArg::Column(column.into())],
            output,
        )
    }

    /// Render the call as `NAME(arg, arg)` for error context
    pub fn render(&self) -> String {
        let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
        format!("{}({})", self.function.to_uppercase(), args.join(", "))
    }
}

/// One window spec applied to one or more function calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRequest {
    /// Shared partitioning/ordering/framing
    pub spec: WindowSpec,
    /// Calls evaluated against the spec
    pub calls: Vec<FunctionCall>,
}

impl WindowRequest {
    pub fn new(spec: WindowSpec, calls: Vec<FunctionCall>) -> Self {
        Self { spec, calls }
    }
}
