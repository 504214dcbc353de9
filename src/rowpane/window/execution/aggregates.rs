//! Null-skipping aggregates over a resolved frame.
//!
//! All aggregates follow SQL null semantics: NULL inputs are skipped, and an
//! empty or all-NULL frame yields NULL (COUNT yields 0). Numeric argument
//! types are checked during request validation, so evaluation never fails.
//!
//! SUM keeps an Integer result while every input is an Integer and switches
//! to Float as soon as a Float participates. AVG and the deviation family
//! always produce Float.

use crate::rowpane::window::execution::frame::ResolvedFrame;
use crate::rowpane::window::execution::order::OrderedPartition;
use crate::rowpane::window::execution::types::{compare_field_values, FieldValue, Row};
use std::cmp::Ordering;

/// Frame-aggregate evaluation over one ordered partition
pub struct FrameAggregates;

impl FrameAggregates {
    /// COUNT(*): every row in the frame
    pub fn count_all(frame: &ResolvedFrame) -> FieldValue {
        FieldValue::Integer(frame.len() as i64)
    }

    /// COUNT(col): non-NULL values of the column in the frame
    pub fn count_column(
        rows: &[Row],
        ordered: &OrderedPartition,
        frame: &ResolvedFrame,
        column: &str,
    ) -> FieldValue {
        let count = Self::frame_values(rows, ordered, frame, column)
            .filter(|v| !matches!(v, FieldValue::Null))
            .count();
        FieldValue::Integer(count as i64)
    }

    /// SUM(col): null-skipping sum; all-Integer input stays Integer
    pub fn sum(
        rows: &[Row],
        ordered: &OrderedPartition,
        frame: &ResolvedFrame,
        column: &str,
    ) -> FieldValue {
        let mut sum = 0.0;
        let mut all_integers = true;
        let mut any = false;

        for value in Self::frame_values(rows, ordered, frame, column) {
            match value {
                FieldValue::Integer(i) => {
                    sum += i as f64;
                    any = true;
                }
                FieldValue::Float(f) => {
                    sum += f;
                    all_integers = false;
                    any = true;
                }
                _ => {}
            }
        }

        if !any {
            FieldValue::Null
        } else if all_integers {
            FieldValue::Integer(sum as i64)
        } else {
            FieldValue::Float(sum)
        }
    }

    /// AVG(col): null-skipping mean as Float
    pub fn avg(
        rows: &[Row],
        ordered: &OrderedPartition,
        frame: &ResolvedFrame,
        column: &str,
    ) -> FieldValue {
        let values = Self::numeric_values(rows, ordered, frame, column);
        if values.is_empty() {
            return FieldValue::Null;
        }
        FieldValue::Float(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// MIN(col): smallest non-NULL value under the ordering comparison
    pub fn min(
        rows: &[Row],
        ordered: &OrderedPartition,
        frame: &ResolvedFrame,
        column: &str,
    ) -> FieldValue {
        Self::extremum(rows, ordered, frame, column, Ordering::Less)
    }

    /// MAX(col): largest non-NULL value under the ordering comparison
    pub fn max(
        rows: &[Row],
        ordered: &OrderedPartition,
        frame: &ResolvedFrame,
        column: &str,
    ) -> FieldValue {
        Self::extremum(rows, ordered, frame, column, Ordering::Greater)
    }

    /// Sample standard deviation; needs at least 2 non-NULL values
    pub fn stddev_samp(
        rows: &[Row],
        ordered: &OrderedPartition,
        frame: &ResolvedFrame,
        column: &str,
    ) -> FieldValue {
        match Self::variance_of(rows, ordered, frame, column, true) {
            Some(variance) => FieldValue::Float(variance.sqrt()),
            None => FieldValue::Null,
        }
    }

    /// Population standard deviation; needs at least 1 non-NULL value
    pub fn stddev_pop(
        rows: &[Row],
        ordered: &OrderedPartition,
        frame: &ResolvedFrame,
        column: &str,
    ) -> FieldValue {
        match Self::variance_of(rows, ordered, frame, column, false) {
            Some(variance) => FieldValue::Float(variance.sqrt()),
            None => FieldValue::Null,
        }
    }

    /// Sample variance; needs at least 2 non-NULL values
    pub fn var_samp(
        rows: &[Row],
        ordered: &OrderedPartition,
        frame: &ResolvedFrame,
        column: &str,
    ) -> FieldValue {
        match Self::variance_of(rows, ordered, frame, column, true) {
            Some(variance) => FieldValue::Float(variance),
            None => FieldValue::Null,
        }
    }

    /// Population variance; needs at least 1 non-NULL value
    pub fn var_pop(
        rows: &[Row],
        ordered: &OrderedPartition,
        frame: &ResolvedFrame,
        column: &str,
    ) -> FieldValue {
        match Self::variance_of(rows, ordered, frame, column, false) {
            Some(variance) => FieldValue::Float(variance),
            None => FieldValue::Null,
        }
    }

    /// Column values across the frame, in frame order
    fn frame_values<'a>(
        rows: &'a [Row],
        ordered: &'a OrderedPartition,
        frame: &ResolvedFrame,
        column: &'a str,
    ) -> impl Iterator<Item = FieldValue> + 'a {
        frame
            .positions()
            .map(move |p| rows[ordered.rows[p]].column(column))
    }

    /// Non-NULL numeric values across the frame as f64
    fn numeric_values(
        rows: &[Row],
        ordered: &OrderedPartition,
        frame: &ResolvedFrame,
        column: &str,
    ) -> Vec<f64> {
        Self::frame_values(rows, ordered, frame, column)
            .filter_map(|v| v.as_f64())
            .collect()
    }

    fn extremum(
        rows: &[Row],
        ordered: &OrderedPartition,
        frame: &ResolvedFrame,
        column: &str,
        keep: Ordering,
    ) -> FieldValue {
        let mut best: Option<FieldValue> = None;
        for value in Self::frame_values(rows, ordered, frame, column) {
            if matches!(value, FieldValue::Null) {
                continue;
            }
            best = match best {
                None => Some(value),
                Some(current) => {
                    if compare_field_values(&value, &current) == keep {
                        Some(value)
                    } else {
                        Some(current)
                    }
                }
            };
        }
        best.unwrap_or(FieldValue::Null)
    }

    /// Variance over the frame; sample variance divides by n-1 and needs at
    /// least 2 values, population variance divides by n and needs 1
    fn variance_of(
        rows: &[Row],
        ordered: &OrderedPartition,
        frame: &ResolvedFrame,
        column: &str,
        sample: bool,
    ) -> Option<f64> {
        let values = Self::numeric_values(rows, ordered, frame, column);
        let n = values.len();
        if n == 0 || (sample && n < 2) {
            return None;
        }

        let mean = values.iter().sum::<f64>() / n as f64;
        let sum_sq = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
        let divisor = if sample { (n - 1) as f64 } else { n as f64 };
        Some(sum_sq / divisor)
    }
}
