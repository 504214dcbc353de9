//! Window Request Validation
//!
//! Validates window requests before any row is touched:
//! - Partition and order column references against the schema
//! - Frame bound vocabulary and ordering
//! - RANGE frame requirements (ORDER BY presence, offset constraints)
//! - Output column uniqueness across an evaluation

use crate::rowpane::window::error::{WindowError, WindowResult};
use crate::rowpane::window::execution::types::Schema;
use crate::rowpane::window::spec::{FrameBound, FrameSpec, FrameUnit, WindowRequest, WindowSpec};
use std::collections::HashSet;

/// Validator for window request specifications
pub struct RequestValidator;

impl RequestValidator {
    /// Validate a batch of requests against a schema.
    ///
    /// Output column names must be unique across the whole batch and must
    /// not collide with input columns; every partition and order column
    /// must exist; every frame must be well-formed. Call arguments are
    /// validated separately during function planning.
    pub fn validate_requests(schema: &Schema, requests: &[WindowRequest]) -> WindowResult<()> {
        let mut outputs: HashSet<&str> = HashSet::new();

        for request in requests {
            Self::validate_spec(schema, &request.spec)?;

            for call in &request.calls {
                if call.output.is_empty() {
                    return Err(WindowError::invalid_key(
                        call.render(),
                        "output column name cannot be empty",
                    ));
                }
                if schema.has_column(&call.output) {
                    return Err(WindowError::invalid_key(
                        call.output.clone(),
                        "output column collides with an input column",
                    ));
                }
                if !outputs.insert(call.output.as_str()) {
                    return Err(WindowError::invalid_key(
                        call.output.clone(),
                        "duplicate output column across window requests",
                    ));
                }
            }
        }

        Ok(())
    }

    /// Validate one window spec: column references and the frame
    pub fn validate_spec(schema: &Schema, spec: &WindowSpec) -> WindowResult<()> {
        for column in &spec.partition_by {
            if !schema.has_column(column) {
                return Err(WindowError::invalid_key(
                    column.clone(),
                    "PARTITION BY column not found in schema",
                ));
            }
        }

        for key in &spec.order_by {
            if !schema.has_column(&key.column) {
                return Err(WindowError::invalid_key(
                    key.column.clone(),
                    "ORDER BY column not found in schema",
                ));
            }
        }

        if let Some(frame) = &spec.frame {
            Self::validate_frame(schema, spec, frame)?;
        }

        Ok(())
    }

    /// Validate a frame against its spec's ordering
    fn validate_frame(schema: &Schema, spec: &WindowSpec, frame: &FrameSpec) -> WindowResult<()> {
        Self::validate_bound_order(frame)?;

        if frame.units == FrameUnit::Range {
            if spec.order_by.is_empty() {
                return Err(WindowError::invalid_frame(
                    frame.to_string(),
                    "RANGE frame requires an ORDER BY clause",
                ));
            }

            if Self::has_offset_bound(frame) {
                if spec.order_by.len() != 1 {
                    return Err(WindowError::invalid_frame(
                        frame.to_string(),
                        format!(
                            "RANGE with a numeric offset requires exactly one ORDER BY column, got {}",
                            spec.order_by.len()
                        ),
                    ));
                }

                let key = &spec.order_by[0];
                // Existence was checked in validate_spec
                if let Some(column) = schema.column(&key.column) {
                    if !column.data_type.is_numeric() {
                        return Err(WindowError::type_mismatch(
                            "INTEGER or FLOAT",
                            column.data_type.to_string(),
                            Some(key.column.clone()),
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// Whether either bound carries a numeric offset
    fn has_offset_bound(frame: &FrameSpec) -> bool {
        matches!(
            frame.start,
            FrameBound::Preceding(_) | FrameBound::Following(_)
        ) || matches!(
            frame.end,
            FrameBound::Preceding(_) | FrameBound::Following(_)
        )
    }

    /// Validate ordering of frame bounds.
    ///
    /// Bounds compare on their logical offset from the current row, so
    /// `BETWEEN 5 PRECEDING AND 2 PRECEDING` is valid while
    /// `BETWEEN CURRENT ROW AND 2 PRECEDING` is not.
    fn validate_bound_order(frame: &FrameSpec) -> WindowResult<()> {
        if matches!(frame.start, FrameBound::UnboundedFollowing) {
            return Err(WindowError::invalid_frame(
                frame.to_string(),
                "UNBOUNDED FOLLOWING not allowed as frame start",
            ));
        }
        if matches!(frame.end, FrameBound::UnboundedPreceding) {
            return Err(WindowError::invalid_frame(
                frame.to_string(),
                "UNBOUNDED PRECEDING not allowed as frame end",
            ));
        }

        if Self::logical_offset(&frame.start) > Self::logical_offset(&frame.end) {
            return Err(WindowError::invalid_frame(
                frame.to_string(),
                "frame start cannot logically follow frame end",
            ));
        }

        Ok(())
    }

    /// A bound's offset from the current row on the frame axis
    fn logical_offset(bound: &FrameBound) -> i128 {
        match bound {
            FrameBound::UnboundedPreceding => i128::MIN,
            FrameBound::Preceding(n) => -(*n as i128),
            FrameBound::CurrentRow => 0,
            FrameBound::Following(n) => *n as i128,
            FrameBound::UnboundedFollowing => i128::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowpane::window::execution::types::{Column, ColumnType};
    use crate::rowpane::window::spec::{FunctionCall, OrderKey};

    fn schema() -> Schema {
        Schema::new(vec![
            Column::new("region", ColumnType::String),
            Column::new("amount", ColumnType::Integer),
            Column::new("label", ColumnType::String),
        ])
    }

    fn spec_with_frame(frame: FrameSpec) -> WindowSpec {
        WindowSpec::new()
            .order_by(vec![OrderKey::asc("amount")])
            .with_frame(frame)
    }

    #[test]
    fn test_valid_rows_frame_passes() {
        let spec = spec_with_frame(FrameSpec::rows(
            FrameBound::Preceding(10),
            FrameBound::CurrentRow,
        ));
        assert!(
            RequestValidator::validate_spec(&schema(), &spec).is_ok(),
            "valid ROWS frame should pass"
        );
    }

    #[test]
    fn test_preceding_to_preceding_frame_passes() {
        let spec = spec_with_frame(FrameSpec::rows(
            FrameBound::Preceding(5),
            FrameBound::Preceding(2),
        ));
        assert!(
            RequestValidator::validate_spec(&schema(), &spec).is_ok(),
            "start further back than end should pass"
        );
    }

    #[test]
    fn test_inverted_preceding_pair_fails() {
        let spec = spec_with_frame(FrameSpec::rows(
            FrameBound::Preceding(2),
            FrameBound::Preceding(5),
        ));
        assert!(
            RequestValidator::validate_spec(&schema(), &spec).is_err(),
            "start nearer than a PRECEDING end should fail"
        );
    }

    #[test]
    fn test_unbounded_following_start_fails() {
        let spec = spec_with_frame(FrameSpec::rows(
            FrameBound::UnboundedFollowing,
            FrameBound::UnboundedFollowing,
        ));
        let err = RequestValidator::validate_spec(&schema(), &spec).unwrap_err();
        assert!(err.to_string().contains("frame start"));
    }

    #[test]
    fn test_current_row_to_unbounded_preceding_fails() {
        let spec = spec_with_frame(FrameSpec::rows(
            FrameBound::CurrentRow,
            FrameBound::UnboundedPreceding,
        ));
        assert!(matches!(
            RequestValidator::validate_spec(&schema(), &spec),
            Err(WindowError::InvalidFrame { .. })
        ));
    }

    #[test]
    fn test_range_requires_order_by() {
        let spec = WindowSpec::new().with_frame(FrameSpec::range(
            FrameBound::UnboundedPreceding,
            FrameBound::CurrentRow,
        ));
        let err = RequestValidator::validate_spec(&schema(), &spec).unwrap_err();
        assert!(
            err.to_string().contains("ORDER BY"),
            "RANGE without ORDER BY should fail, got: {}",
            err
        );
    }

    #[test]
    fn test_range_offset_requires_single_order_column() {
        let spec = WindowSpec::new()
            .order_by(vec![OrderKey::asc("amount"), OrderKey::asc("label")])
            .with_frame(FrameSpec::range(
                FrameBound::Preceding(3),
                FrameBound::CurrentRow,
            ));
        assert!(matches!(
            RequestValidator::validate_spec(&schema(), &spec),
            Err(WindowError::InvalidFrame { .. })
        ));
    }

    #[test]
    fn test_range_offset_requires_numeric_order_column() {
        let spec = WindowSpec::new()
            .order_by(vec![OrderKey::asc("label")])
            .with_frame(FrameSpec::range(
                FrameBound::Preceding(3),
                FrameBound::CurrentRow,
            ));
        match RequestValidator::validate_spec(&schema(), &spec) {
            Err(WindowError::TypeMismatch { actual, column, .. }) => {
                assert_eq!(actual, "STRING");
                assert_eq!(column.as_deref(), Some("label"));
            }
            other => panic!("expected TypeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_range_current_row_allows_multi_column_order() {
        let spec = WindowSpec::new()
            .order_by(vec![OrderKey::asc("amount"), OrderKey::asc("label")])
            .with_frame(FrameSpec::range(
                FrameBound::UnboundedPreceding,
                FrameBound::CurrentRow,
            ));
        assert!(
            RequestValidator::validate_spec(&schema(), &spec).is_ok(),
            "peer-group RANGE bounds have no offset restriction"
        );
    }

    #[test]
    fn test_unknown_partition_column_fails() {
        let spec = WindowSpec::new().partition_by(vec!["missing"]);
        assert!(matches!(
            RequestValidator::validate_spec(&schema(), &spec),
            Err(WindowError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_duplicate_output_columns_fail() {
        let requests = vec![
            WindowRequest::new(
                WindowSpec::new().order_by(vec![OrderKey::asc("amount")]),
                vec![
                    FunctionCall::no_args("row_number", "rn"),
                    FunctionCall::no_args("rank", "rn"),
                ],
            ),
        ];
        let err = RequestValidator::validate_requests(&schema(), &requests).unwrap_err();
        assert!(err.to_string().contains("duplicate output column"));
    }

    #[test]
    fn test_output_colliding_with_input_fails() {
        let requests = vec![WindowRequest::new(
            WindowSpec::new(),
            vec![FunctionCall::no_args("row_number", "amount")],
        )];
        assert!(matches!(
            RequestValidator::validate_requests(&schema(), &requests),
            Err(WindowError::InvalidKey { .. })
        ));
    }
}
