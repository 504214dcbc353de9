//! Frame resolution: concrete per-row [low, high] index ranges.
//!
//! A [`FrameResolver`] is built once per ordered partition and resolves the
//! frame for each evaluation position. ROWS frames are literal position
//! offsets; RANGE frames work in peer groups and ordering-value distance.
//! Bounds clamp into the partition before the inversion check, so a frame
//! reaching past either edge shrinks to the partition rather than failing.

use crate::rowpane::window::error::{WindowError, WindowResult};
use crate::rowpane::window::execution::order::OrderedPartition;
use crate::rowpane::window::execution::types::Row;
use crate::rowpane::window::spec::{
    FrameBound, FrameSpec, FrameUnit, OrderKey, SortDirection, WindowSpec,
};

/// Concrete inclusive row range for one evaluation position
///
/// Positions index the *sorted* partition, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedFrame {
    /// First position in the frame (inclusive)
    pub low: usize,
    /// Last position in the frame (inclusive)
    pub high: usize,
}

impl ResolvedFrame {
    /// Number of rows in the frame; never zero since low <= high holds by
    /// construction
    pub fn len(&self) -> usize {
        self.high - self.low + 1
    }

    /// Iterate the positions covered by the frame
    pub fn positions(&self) -> std::ops::RangeInclusive<usize> {
        self.low..=self.high
    }
}

/// The frame in effect for a spec, applying the SQL defaults.
///
/// With an ORDER BY: `RANGE BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW`.
/// Without one: the entire partition.
pub fn effective_frame(spec: &WindowSpec) -> FrameSpec {
    match &spec.frame {
        Some(frame) => frame.clone(),
        None if spec.order_by.is_empty() => FrameSpec::entire_partition(),
        None => FrameSpec::range(FrameBound::UnboundedPreceding, FrameBound::CurrentRow),
    }
}

/// Resolves frame bounds for every row of one ordered partition
pub struct FrameResolver<'a> {
    rows: &'a [Row],
    ordered: &'a OrderedPartition,
    frame: FrameSpec,
    order_by: &'a [OrderKey],
}

impl<'a> FrameResolver<'a> {
    pub fn new(
        rows: &'a [Row],
        ordered: &'a OrderedPartition,
        frame: FrameSpec,
        order_by: &'a [OrderKey],
    ) -> Self {
        Self {
            rows,
            ordered,
            frame,
            order_by,
        }
    }

    /// Resolve the frame for one sorted position.
    ///
    /// Fails with `InvalidFrame` if the clamped bounds are inverted, e.g.
    /// `ROWS BETWEEN 1 FOLLOWING AND 1 PRECEDING`.
    pub fn resolve(&self, position: usize) -> WindowResult<ResolvedFrame> {
        if self.ordered.is_empty() {
            return Err(WindowError::execution_error(
                "cannot resolve a frame over an empty partition",
                None,
            ));
        }

        let (low, high) = match self.frame.units {
            FrameUnit::Rows => self.resolve_rows(position),
            FrameUnit::Range => self.resolve_range(position)?,
        };

        if low > high {
            return Err(WindowError::invalid_frame(
                self.frame.to_string(),
                format!(
                    "resolved start {} exceeds resolved end {} at row position {}",
                    low, high, position
                ),
            ));
        }

        Ok(ResolvedFrame { low, high })
    }

    /// ROWS bounds: literal position offsets clamped into the partition
    fn resolve_rows(&self, position: usize) -> (usize, usize) {
        let last = (self.ordered.len() - 1) as i64;
        let pos = position as i64;

        let low = match &self.frame.start {
            FrameBound::UnboundedPreceding => 0,
            FrameBound::Preceding(n) => pos.saturating_sub_unsigned(*n),
            FrameBound::CurrentRow => pos,
            FrameBound::Following(n) => pos.saturating_add_unsigned(*n),
            FrameBound::UnboundedFollowing => last,
        };
        let high = match &self.frame.end {
            FrameBound::UnboundedPreceding => 0,
            FrameBound::Preceding(n) => pos.saturating_sub_unsigned(*n),
            FrameBound::CurrentRow => pos,
            FrameBound::Following(n) => pos.saturating_add_unsigned(*n),
            FrameBound::UnboundedFollowing => last,
        };

        (low.clamp(0, last) as usize, high.clamp(0, last) as usize)
    }

    /// RANGE bounds: peer groups for CURRENT ROW, ordering-value distance
    /// for numeric offsets
    fn resolve_range(&self, position: usize) -> WindowResult<(usize, usize)> {
        let last = self.ordered.len() - 1;
        let (peer_start, peer_end) = self.ordered.peer_bounds(position);

        let low = match &self.frame.start {
            FrameBound::UnboundedPreceding => 0,
            FrameBound::CurrentRow => peer_start,
            FrameBound::Preceding(n) => self.range_offset_low(position, *n, true)?,
            FrameBound::Following(n) => self.range_offset_low(position, *n, false)?,
            FrameBound::UnboundedFollowing => last,
        };
        let high = match &self.frame.end {
            FrameBound::UnboundedPreceding => 0,
            FrameBound::CurrentRow => peer_end - 1,
            FrameBound::Preceding(n) => self.range_offset_high(position, *n, true)?,
            FrameBound::Following(n) => self.range_offset_high(position, *n, false)?,
            FrameBound::UnboundedFollowing => last,
        };

        Ok((low, high))
    }

    /// The current row's order value projected onto the sort axis: the raw
    /// value ascending, negated descending, so positions are always
    /// non-decreasing along the axis. None for NULL order values.
    fn axis_value(&self, position: usize) -> WindowResult<Option<f64>> {
        let key = self.order_by.first().ok_or_else(|| {
            WindowError::execution_error(
                "RANGE offset frame requires an ORDER BY column",
                None,
            )
        })?;
        let value = self.rows[self.ordered.rows[position]].column(&key.column);
        let raw = match value.as_f64() {
            Some(raw) => raw,
            None => return Ok(None),
        };
        Ok(Some(match key.direction {
            SortDirection::Asc => raw,
            SortDirection::Desc => -raw,
        }))
    }

    /// Lowest position whose order value is within the offset window.
    ///
    /// `preceding` selects which side of the current value the boundary
    /// sits on. A current row with a NULL order value frames its peer
    /// group, matching RANGE CURRENT ROW semantics for the null group.
    fn range_offset_low(
        &self,
        position: usize,
        offset: u64,
        preceding: bool,
    ) -> WindowResult<usize> {
        let current = match self.axis_value(position)? {
            Some(v) => v,
            None => return Ok(self.ordered.peer_bounds(position).0),
        };
        let target = if preceding {
            current - offset as f64
        } else {
            current + offset as f64
        };

        for p in 0..self.ordered.len() {
            if let Some(v) = self.axis_value(p)? {
                if v >= target {
                    return Ok(p);
                }
            }
        }
        Err(self.empty_offset_window(position))
    }

    /// Highest position whose order value is within the offset window
    fn range_offset_high(
        &self,
        position: usize,
        offset: u64,
        preceding: bool,
    ) -> WindowResult<usize> {
        let current = match self.axis_value(position)? {
            Some(v) => v,
            None => return Ok(self.ordered.peer_bounds(position).1 - 1),
        };
        let target = if preceding {
            current - offset as f64
        } else {
            current + offset as f64
        };

        for p in (0..self.ordered.len()).rev() {
            if let Some(v) = self.axis_value(p)? {
                if v <= target {
                    return Ok(p);
                }
            }
        }
        Err(self.empty_offset_window(position))
    }

    fn empty_offset_window(&self, position: usize) -> WindowError {
        WindowError::invalid_frame(
            self.frame.to_string(),
            format!(
                "no rows lie within the offset window at row position {}",
                position
            ),
        )
    }
}
