//! Window function planning and per-row evaluation.
//!
//! A [`FunctionCall`] arrives as a name plus positional arguments.
//! [`PlannedFunction::plan`] resolves the name case-insensitively, validates
//! arity and argument types against the schema, and produces a typed
//! [`FunctionKind`] so that evaluation itself is infallible: every
//! configuration error surfaces before the first row is computed.
//!
//! Ranking functions read peer metadata, offset functions read the full
//! ordered partition and ignore the frame, value functions and aggregates
//! read the resolved frame.

use crate::rowpane::window::error::{WindowError, WindowResult};
use crate::rowpane::window::execution::aggregates::FrameAggregates;
use crate::rowpane::window::execution::frame::ResolvedFrame;
use crate::rowpane::window::execution::order::OrderedPartition;
use crate::rowpane::window::execution::types::{ColumnType, FieldValue, Row, Schema};
use crate::rowpane::window::spec::{FunctionArg, FunctionCall};

/// Names the planner accepts, listed in UnsupportedFunction errors
pub const SUPPORTED_FUNCTIONS: &str = "ROW_NUMBER, RANK, DENSE_RANK, PERCENT_RANK, CUME_DIST, \
     NTILE, LAG, LEAD, FIRST_VALUE, LAST_VALUE, NTH_VALUE, COUNT, SUM, AVG, MIN, MAX, STDDEV, \
     STDDEV_SAMP, STDDEV_POP, VARIANCE, VAR_SAMP, VAR_POP";

/// A validated window function call bound to its output column
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedFunction {
    /// Output column receiving the computed value
    pub output: String,
    /// The typed computation
    pub kind: FunctionKind,
}

/// Typed window function kinds after planning
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionKind {
    RowNumber,
    Rank,
    DenseRank,
    PercentRank,
    CumeDist,
    Ntile {
        buckets: i64,
    },
    Lag {
        column: String,
        offset: usize,
        default: FieldValue,
    },
    Lead {
        column: String,
        offset: usize,
        default: FieldValue,
    },
    FirstValue {
        column: String,
    },
    LastValue {
        column: String,
    },
    NthValue {
        column: String,
        n: usize,
    },
    CountAll,
    Count {
        column: String,
    },
    Sum {
        column: String,
    },
    Avg {
        column: String,
    },
    Min {
        column: String,
    },
    Max {
        column: String,
    },
    StddevSamp {
        column: String,
    },
    StddevPop {
        column: String,
    },
    VarSamp {
        column: String,
    },
    VarPop {
        column: String,
    },
}

impl FunctionKind {
    /// Whether evaluation reads the resolved frame.
    ///
    /// Ranking functions are pure in peer metadata and offset functions see
    /// the whole partition, so the driver skips frame resolution when no
    /// call needs it.
    pub fn uses_frame(&self) -> bool {
        matches!(
            self,
            FunctionKind::FirstValue { .. }
                | FunctionKind::LastValue { .. }
                | FunctionKind::NthValue { .. }
                | FunctionKind::CountAll
                | FunctionKind::Count { .. }
                | FunctionKind::Sum { .. }
                | FunctionKind::Avg { .. }
                | FunctionKind::Min { .. }
                | FunctionKind::Max { .. }
                | FunctionKind::StddevSamp { .. }
                | FunctionKind::StddevPop { .. }
                | FunctionKind::VarSamp { .. }
                | FunctionKind::VarPop { .. }
        )
    }

    /// Declared type of the column this function produces.
    ///
    /// Ranking and counting functions yield INTEGER, ratio and spread
    /// functions FLOAT. Value-passing functions and SUM/MIN/MAX inherit the
    /// argument column's declared type.
    pub fn output_type(&self, schema: &Schema) -> ColumnType {
        match self {
            FunctionKind::RowNumber
            | FunctionKind::Rank
            | FunctionKind::DenseRank
            | FunctionKind::Ntile { .. }
            | FunctionKind::CountAll
            | FunctionKind::Count { .. } => ColumnType::Integer,
            FunctionKind::PercentRank
            | FunctionKind::CumeDist
            | FunctionKind::Avg { .. }
            | FunctionKind::StddevSamp { .. }
            | FunctionKind::StddevPop { .. }
            | FunctionKind::VarSamp { .. }
            | FunctionKind::VarPop { .. } => ColumnType::Float,
            FunctionKind::Lag { column, .. }
            | FunctionKind::Lead { column, .. }
            | FunctionKind::FirstValue { column }
            | FunctionKind::LastValue { column }
            | FunctionKind::NthValue { column, .. }
            | FunctionKind::Sum { column }
            | FunctionKind::Min { column }
            | FunctionKind::Max { column } => schema
                .column(column)
                .map(|c| c.data_type)
                .expect("argument column validated at planning"),
        }
    }
}

impl PlannedFunction {
    /// Validate a call against the schema and produce its typed form.
    ///
    /// Unknown names fail with `UnsupportedFunction`, unknown argument
    /// columns with `InvalidKey`, non-numeric aggregate arguments with
    /// `TypeMismatch`, and arity or argument-value problems with
    /// `ExecutionError`.
    pub fn plan(call: &FunctionCall, schema: &Schema) -> WindowResult<Self> {
        let kind = match call.function.to_uppercase().as_str() {
            "ROW_NUMBER" => {
                require_no_args(call)?;
                FunctionKind::RowNumber
            }
            "RANK" => {
                require_no_args(call)?;
                FunctionKind::Rank
            }
            "DENSE_RANK" => {
                require_no_args(call)?;
                FunctionKind::DenseRank
            }
            "PERCENT_RANK" => {
                require_no_args(call)?;
                FunctionKind::PercentRank
            }
            "CUME_DIST" => {
                require_no_args(call)?;
                FunctionKind::CumeDist
            }
            "NTILE" => FunctionKind::Ntile {
                buckets: bucket_count_arg(call)?,
            },
            "LAG" => {
                let (column, offset, default) = offset_args(call, schema)?;
                FunctionKind::Lag {
                    column,
                    offset,
                    default,
                }
            }
            "LEAD" => {
                let (column, offset, default) = offset_args(call, schema)?;
                FunctionKind::Lead {
                    column,
                    offset,
                    default,
                }
            }
            "FIRST_VALUE" => FunctionKind::FirstValue {
                column: single_column_arg(call, schema)?,
            },
            "LAST_VALUE" => FunctionKind::LastValue {
                column: single_column_arg(call, schema)?,
            },
            "NTH_VALUE" => {
                let (column, n) = nth_value_args(call, schema)?;
                FunctionKind::NthValue { column, n }
            }
            "COUNT" => count_args(call, schema)?,
            "SUM" => FunctionKind::Sum {
                column: numeric_column_arg(call, schema)?,
            },
            "AVG" => FunctionKind::Avg {
                column: numeric_column_arg(call, schema)?,
            },
            "MIN" => FunctionKind::Min {
                column: single_column_arg(call, schema)?,
            },
            "MAX" => FunctionKind::Max {
                column: single_column_arg(call, schema)?,
            },
            "STDDEV" | "STDDEV_SAMP" => FunctionKind::StddevSamp {
                column: numeric_column_arg(call, schema)?,
            },
            "STDDEV_POP" => FunctionKind::StddevPop {
                column: numeric_column_arg(call, schema)?,
            },
            "VARIANCE" | "VAR_SAMP" => FunctionKind::VarSamp {
                column: numeric_column_arg(call, schema)?,
            },
            "VAR_POP" => FunctionKind::VarPop {
                column: numeric_column_arg(call, schema)?,
            },
            _ => {
                return Err(WindowError::UnsupportedFunction {
                    function: call.function.clone(),
                    supported: SUPPORTED_FUNCTIONS,
                });
            }
        };

        Ok(PlannedFunction {
            output: call.output.clone(),
            kind,
        })
    }

    /// Evaluate this call at one sorted position of an ordered partition.
    ///
    /// `frame` is the resolved frame for the position when
    /// [`FunctionKind::uses_frame`] holds; callers pass the same frame to
    /// every frame-bound call of the position.
    pub fn evaluate(
        &self,
        rows: &[Row],
        ordered: &OrderedPartition,
        position: usize,
        frame: Option<&ResolvedFrame>,
    ) -> FieldValue {
        let len = ordered.len();

        match &self.kind {
            FunctionKind::RowNumber => FieldValue::Integer(position as i64 + 1),
            FunctionKind::Rank => {
                let (peer_start, _) = ordered.peer_bounds(position);
                FieldValue::Integer(peer_start as i64 + 1)
            }
            FunctionKind::DenseRank => FieldValue::Integer(ordered.group_ids[position] as i64 + 1),
            FunctionKind::PercentRank => {
                if len <= 1 {
                    FieldValue::Float(0.0)
                } else {
                    let (peer_start, _) = ordered.peer_bounds(position);
                    FieldValue::Float(peer_start as f64 / (len - 1) as f64)
                }
            }
            FunctionKind::CumeDist => {
                let (_, peer_end) = ordered.peer_bounds(position);
                FieldValue::Float(peer_end as f64 / len as f64)
            }
            FunctionKind::Ntile { buckets } => FieldValue::Integer(ntile_bucket(
                position as i64,
                len as i64,
                *buckets,
            )),
            FunctionKind::Lag {
                column,
                offset,
                default,
            } => {
                if position >= *offset {
                    rows[ordered.rows[position - offset]].column(column)
                } else {
                    default.clone()
                }
            }
            FunctionKind::Lead {
                column,
                offset,
                default,
            } => {
                if position + offset < len {
                    rows[ordered.rows[position + offset]].column(column)
                } else {
                    default.clone()
                }
            }
            FunctionKind::FirstValue { column } => {
                let frame = expect_frame(frame);
                rows[ordered.rows[frame.low]].column(column)
            }
            FunctionKind::LastValue { column } => {
                let frame = expect_frame(frame);
                rows[ordered.rows[frame.high]].column(column)
            }
            FunctionKind::NthValue { column, n } => {
                let frame = expect_frame(frame);
                let target = frame.low + (n - 1);
                if target <= frame.high {
                    rows[ordered.rows[target]].column(column)
                } else {
                    FieldValue::Null
                }
            }
            FunctionKind::CountAll => FrameAggregates::count_all(expect_frame(frame)),
            FunctionKind::Count { column } => {
                FrameAggregates::count_column(rows, ordered, expect_frame(frame), column)
            }
            FunctionKind::Sum { column } => {
                FrameAggregates::sum(rows, ordered, expect_frame(frame), column)
            }
            FunctionKind::Avg { column } => {
                FrameAggregates::avg(rows, ordered, expect_frame(frame), column)
            }
            FunctionKind::Min { column } => {
                FrameAggregates::min(rows, ordered, expect_frame(frame), column)
            }
            FunctionKind::Max { column } => {
                FrameAggregates::max(rows, ordered, expect_frame(frame), column)
            }
            FunctionKind::StddevSamp { column } => {
                FrameAggregates::stddev_samp(rows, ordered, expect_frame(frame), column)
            }
            FunctionKind::StddevPop { column } => {
                FrameAggregates::stddev_pop(rows, ordered, expect_frame(frame), column)
            }
            FunctionKind::VarSamp { column } => {
                FrameAggregates::var_samp(rows, ordered, expect_frame(frame), column)
            }
            FunctionKind::VarPop { column } => {
                FrameAggregates::var_pop(rows, ordered, expect_frame(frame), column)
            }
        }
    }
}

/// The driver resolves a frame whenever any call uses one; a missing frame
/// here is a driver bug, not a user error.
fn expect_frame<'a>(frame: Option<&'a ResolvedFrame>) -> &'a ResolvedFrame {
    frame.expect("frame-bound function evaluated without a resolved frame")
}

/// NTILE bucket for a 0-based position: rows distribute as evenly as
/// possible, with the first `size % buckets` buckets one row larger.
fn ntile_bucket(position: i64, size: i64, buckets: i64) -> i64 {
    if buckets >= size {
        // More buckets than rows: each row gets its own bucket
        return (position + 1).min(buckets);
    }

    let base = size / buckets;
    let remainder = size % buckets;
    let boundary = remainder * (base + 1);

    if position < boundary {
        position / (base + 1) + 1
    } else {
        remainder + (position - boundary) / base + 1
    }
}

fn require_no_args(call: &FunctionCall) -> WindowResult<()> {
    if !call.args.is_empty() {
        return Err(WindowError::execution_error(
            format!(
                "{} function takes no arguments, but {} were provided",
                call.function.to_uppercase(),
                call.args.len()
            ),
            Some(call.render()),
        ));
    }
    Ok(())
}

/// Resolve an argument that must be a column reference present in the schema
fn column_ref(call: &FunctionCall, index: usize, schema: &Schema) -> WindowResult<String> {
    match &call.args[index] {
        FunctionArg::Column(name) => {
            if !schema.has_column(name) {
                return Err(WindowError::invalid_key(
                    name.clone(),
                    format!("column not found in schema for {}", call.render()),
                ));
            }
            Ok(name.clone())
        }
        FunctionArg::Literal(value) => Err(WindowError::execution_error(
            format!(
                "{} function requires a column reference, got literal {}",
                call.function.to_uppercase(),
                value
            ),
            Some(call.render()),
        )),
    }
}

/// Exactly one argument, a column reference
fn single_column_arg(call: &FunctionCall, schema: &Schema) -> WindowResult<String> {
    if call.args.len() != 1 {
        return Err(WindowError::execution_error(
            format!(
                "{} function requires exactly 1 argument (column), but {} were provided",
                call.function.to_uppercase(),
                call.args.len()
            ),
            Some(call.render()),
        ));
    }
    column_ref(call, 0, schema)
}

/// Exactly one argument, a column whose schema type is numeric
fn numeric_column_arg(call: &FunctionCall, schema: &Schema) -> WindowResult<String> {
    let column = single_column_arg(call, schema)?;
    let definition = schema.column(&column).expect("column checked above");
    if !definition.data_type.is_numeric() {
        return Err(WindowError::type_mismatch(
            "INTEGER or FLOAT",
            definition.data_type.to_string(),
            Some(column),
        ));
    }
    Ok(column)
}

/// LAG/LEAD arguments: column, optional non-negative integer offset
/// (default 1), optional literal default value (default NULL)
fn offset_args(
    call: &FunctionCall,
    schema: &Schema,
) -> WindowResult<(String, usize, FieldValue)> {
    if call.args.is_empty() {
        return Err(WindowError::execution_error(
            format!(
                "{} function requires at least 1 argument (column)",
                call.function.to_uppercase()
            ),
            Some(call.render()),
        ));
    }
    if call.args.len() > 3 {
        return Err(WindowError::execution_error(
            format!(
                "{} function accepts at most 3 arguments (column, offset, default), but {} were provided",
                call.function.to_uppercase(),
                call.args.len()
            ),
            Some(call.render()),
        ));
    }

    let column = column_ref(call, 0, schema)?;

    let offset = if call.args.len() >= 2 {
        match &call.args[1] {
            FunctionArg::Literal(FieldValue::Integer(n)) => {
                if *n < 0 {
                    return Err(WindowError::execution_error(
                        format!(
                            "{} offset must be non-negative, got {}",
                            call.function.to_uppercase(),
                            n
                        ),
                        Some(call.render()),
                    ));
                }
                *n as usize
            }
            FunctionArg::Literal(FieldValue::Null) => {
                return Err(WindowError::execution_error(
                    format!("{} offset cannot be NULL", call.function.to_uppercase()),
                    Some(call.render()),
                ));
            }
            FunctionArg::Literal(other) => {
                return Err(WindowError::execution_error(
                    format!(
                        "{} offset must be an integer, got {}",
                        call.function.to_uppercase(),
                        other.type_name()
                    ),
                    Some(call.render()),
                ));
            }
            FunctionArg::Column(name) => {
                return Err(WindowError::execution_error(
                    format!(
                        "{} offset must be an integer literal, got column '{}'",
                        call.function.to_uppercase(),
                        name
                    ),
                    Some(call.render()),
                ));
            }
        }
    } else {
        1
    };

    let default = if call.args.len() == 3 {
        match &call.args[2] {
            FunctionArg::Literal(value) => value.clone(),
            FunctionArg::Column(name) => {
                return Err(WindowError::execution_error(
                    format!(
                        "{} default must be a literal, got column '{}'",
                        call.function.to_uppercase(),
                        name
                    ),
                    Some(call.render()),
                ));
            }
        }
    } else {
        FieldValue::Null
    };

    Ok((column, offset, default))
}

/// NTILE argument: exactly one positive integer literal
fn bucket_count_arg(call: &FunctionCall) -> WindowResult<i64> {
    if call.args.len() != 1 {
        return Err(WindowError::execution_error(
            format!(
                "NTILE function requires exactly 1 argument (bucket count), but {} were provided",
                call.args.len()
            ),
            Some(call.render()),
        ));
    }
    match &call.args[0] {
        FunctionArg::Literal(FieldValue::Integer(n)) if *n >= 1 => Ok(*n),
        FunctionArg::Literal(FieldValue::Integer(n)) => Err(WindowError::execution_error(
            format!("NTILE bucket count must be positive, got {}", n),
            Some(call.render()),
        )),
        other => Err(WindowError::execution_error(
            format!("NTILE bucket count must be an integer literal, got {}", other),
            Some(call.render()),
        )),
    }
}

/// NTH_VALUE arguments: column plus a positive integer literal
fn nth_value_args(call: &FunctionCall, schema: &Schema) -> WindowResult<(String, usize)> {
    if call.args.len() != 2 {
        return Err(WindowError::execution_error(
            format!(
                "NTH_VALUE function requires exactly 2 arguments (column, n), but {} were provided",
                call.args.len()
            ),
            Some(call.render()),
        ));
    }
    let column = column_ref(call, 0, schema)?;
    match &call.args[1] {
        FunctionArg::Literal(FieldValue::Integer(n)) if *n >= 1 => Ok((column, *n as usize)),
        FunctionArg::Literal(FieldValue::Integer(n)) => Err(WindowError::execution_error(
            format!("NTH_VALUE position must be at least 1, got {}", n),
            Some(call.render()),
        )),
        other => Err(WindowError::execution_error(
            format!("NTH_VALUE position must be an integer literal, got {}", other),
            Some(call.render()),
        )),
    }
}

/// COUNT arguments: none or an integer-like literal for COUNT(*), a column
/// reference for COUNT(col)
fn count_args(call: &FunctionCall, schema: &Schema) -> WindowResult<FunctionKind> {
    match call.args.len() {
        0 => Ok(FunctionKind::CountAll),
        1 => match &call.args[0] {
            FunctionArg::Column(_) => Ok(FunctionKind::Count {
                column: column_ref(call, 0, schema)?,
            }),
            FunctionArg::Literal(FieldValue::Null) => Err(WindowError::execution_error(
                "COUNT argument cannot be the NULL literal",
                Some(call.render()),
            )),
            // COUNT(1) and friends count every frame row like COUNT(*)
            FunctionArg::Literal(_) => Ok(FunctionKind::CountAll),
        },
        n => Err(WindowError::execution_error(
            format!(
                "COUNT function requires 0 or 1 argument, but {} were provided",
                n
            ),
            Some(call.render()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowpane::window::execution::types::{Column, ColumnType};

    fn schema() -> Schema {
        Schema::new(vec![
            Column::new("amount", ColumnType::Integer),
            Column::new("category", ColumnType::String),
        ])
    }

    #[test]
    fn test_plan_is_case_insensitive() {
        let planned =
            PlannedFunction::plan(&FunctionCall::no_args("Row_Number", "rn"), &schema()).unwrap();
        assert_eq!(planned.kind, FunctionKind::RowNumber);
        assert_eq!(planned.output, "rn");
    }

    #[test]
    fn test_unknown_function_is_unsupported() {
        let err = PlannedFunction::plan(&FunctionCall::no_args("median", "m"), &schema())
            .unwrap_err();
        assert!(matches!(err, WindowError::UnsupportedFunction { .. }));
        assert!(err.to_string().contains("median"));
    }

    #[test]
    fn test_unknown_argument_column_is_invalid_key() {
        let err = PlannedFunction::plan(
            &FunctionCall::on_column("sum", "missing", "total"),
            &schema(),
        )
        .unwrap_err();
        assert!(matches!(err, WindowError::InvalidKey { .. }));
    }

    #[test]
    fn test_non_numeric_aggregate_argument_is_type_mismatch() {
        let err = PlannedFunction::plan(
            &FunctionCall::on_column("avg", "category", "a"),
            &schema(),
        )
        .unwrap_err();
        match err {
            WindowError::TypeMismatch { actual, column, .. } => {
                assert_eq!(actual, "STRING");
                assert_eq!(column.as_deref(), Some("category"));
            }
            other => panic!("expected TypeMismatch, got {:?}", other),
        }

        // MIN/MAX order any comparable type, so a string column is fine
        assert!(PlannedFunction::plan(
            &FunctionCall::on_column("min", "category", "m"),
            &schema()
        )
        .is_ok());
    }

    #[test]
    fn test_lag_argument_validation() {
        let err = PlannedFunction::plan(&FunctionCall::no_args("lag", "l"), &schema())
            .unwrap_err();
        assert!(err.to_string().contains("at least 1 argument"));

        let err = PlannedFunction::plan(
            &FunctionCall::new(
                "lag",
                vec![
                    FunctionArg::Column("amount".to_string()),
                    FunctionArg::Literal(FieldValue::Integer(-1)),
                ],
                "l",
            ),
            &schema(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn test_lag_defaults() {
        let planned = PlannedFunction::plan(
            &FunctionCall::on_column("lag", "amount", "prev"),
            &schema(),
        )
        .unwrap();
        assert_eq!(
            planned.kind,
            FunctionKind::Lag {
                column: "amount".to_string(),
                offset: 1,
                default: FieldValue::Null,
            }
        );
    }

    #[test]
    fn test_count_forms() {
        let star = PlannedFunction::plan(&FunctionCall::no_args("count", "c"), &schema()).unwrap();
        assert_eq!(star.kind, FunctionKind::CountAll);

        let one = PlannedFunction::plan(
            &FunctionCall::new(
                "count",
                vec![FunctionArg::Literal(FieldValue::Integer(1))],
                "c",
            ),
            &schema(),
        )
        .unwrap();
        assert_eq!(one.kind, FunctionKind::CountAll);

        let col = PlannedFunction::plan(
            &FunctionCall::on_column("count", "amount", "c"),
            &schema(),
        )
        .unwrap();
        assert_eq!(
            col.kind,
            FunctionKind::Count {
                column: "amount".to_string()
            }
        );
    }

    #[test]
    fn test_ntile_rejects_non_positive_buckets() {
        let err = PlannedFunction::plan(
            &FunctionCall::new(
                "ntile",
                vec![FunctionArg::Literal(FieldValue::Integer(0))],
                "t",
            ),
            &schema(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn test_ntile_even_distribution() {
        // 5 rows into 2 buckets: sizes 3 and 2
        let buckets: Vec<i64> = (0..5).map(|p| ntile_bucket(p, 5, 2)).collect();
        assert_eq!(buckets, vec![1, 1, 1, 2, 2]);

        // 5 rows into 3 buckets: sizes 2, 2, 1
        let buckets: Vec<i64> = (0..5).map(|p| ntile_bucket(p, 5, 3)).collect();
        assert_eq!(buckets, vec![1, 1, 2, 2, 3]);

        // More buckets than rows: one row per bucket
        let buckets: Vec<i64> = (0..3).map(|p| ntile_bucket(p, 3, 10)).collect();
        assert_eq!(buckets, vec![1, 2, 3]);
    }
}
