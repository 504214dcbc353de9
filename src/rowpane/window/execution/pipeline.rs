//! Sequential evaluation driver.
//!
//! [`WindowEvaluator::evaluate`] runs the full pipeline over one row set:
//! validate and plan every request, then per request partition the rows,
//! order each partition, resolve frames where a call needs one, and
//! evaluate every call at every position. Output rows keep the input order
//! and carry the input fields plus one column per call.

use crate::rowpane::window::error::WindowResult;
use crate::rowpane::window::execution::frame::{effective_frame, FrameResolver};
use crate::rowpane::window::execution::functions::PlannedFunction;
use crate::rowpane::window::execution::order::order_partition;
use crate::rowpane::window::execution::partition::partition_rows;
use crate::rowpane::window::execution::types::{Column, Row, Schema};
use crate::rowpane::window::spec::{WindowRequest, WindowSpec};
use crate::rowpane::window::validation::RequestValidator;
use log::{debug, warn};

/// Sequential window evaluator.
///
/// Stateless; both entry points validate and plan the whole request batch
/// before touching any row, so every configuration error surfaces before
/// the first computed value.
pub struct WindowEvaluator;

impl WindowEvaluator {
    /// Evaluate window requests over a row set.
    ///
    /// Returns one output row per input row, in input order, holding the
    /// input fields plus one computed column per call. Requests compute
    /// independently from the input columns; a computed column is not
    /// visible to other requests.
    pub fn evaluate(
        rows: &[Row],
        schema: &Schema,
        requests: &[WindowRequest],
    ) -> WindowResult<Vec<Row>> {
        let planned = Self::plan_requests(schema, requests)?;

        debug!(
            "Evaluating {} window request(s) over {} rows",
            requests.len(),
            rows.len()
        );

        let mut output = rows.to_vec();
        for (spec, functions) in &planned {
            Self::apply_request(rows, spec, functions, &mut output)?;
        }
        Ok(output)
    }

    /// Schema of the rows [`evaluate`](Self::evaluate) produces: the input
    /// columns followed by one nullable column per call, in request order.
    pub fn output_schema(schema: &Schema, requests: &[WindowRequest]) -> WindowResult<Schema> {
        let planned = Self::plan_requests(schema, requests)?;

        let mut columns = schema.columns.clone();
        for (_, functions) in &planned {
            for function in functions {
                columns.push(Column::new(
                    function.output.clone(),
                    function.kind.output_type(schema),
                ));
            }
        }
        Ok(Schema::new(columns))
    }

    /// Validate the batch and plan every call
    fn plan_requests<'a>(
        schema: &Schema,
        requests: &'a [WindowRequest],
    ) -> WindowResult<Vec<(&'a WindowSpec, Vec<PlannedFunction>)>> {
        RequestValidator::validate_requests(schema, requests).map_err(|error| {
            warn!("Window request rejected: {}", error);
            error
        })?;

        let mut planned = Vec::with_capacity(requests.len());
        for request in requests {
            let mut functions = Vec::with_capacity(request.calls.len());
            for call in &request.calls {
                functions.push(PlannedFunction::plan(call, schema).map_err(|error| {
                    warn!("Window call rejected: {}", error);
                    error
                })?);
            }
            planned.push((&request.spec, functions));
        }
        Ok(planned)
    }

    /// Evaluate one request, writing computed columns into `output` keyed
    /// by original input index
    fn apply_request(
        rows: &[Row],
        spec: &WindowSpec,
        functions: &[PlannedFunction],
        output: &mut [Row],
    ) -> WindowResult<()> {
        let partitions = partition_rows(rows, &spec.partition_by);
        let needs_frame = functions.iter().any(|f| f.kind.uses_frame());
        let frame = effective_frame(spec);

        debug!(
            "Window request: {} partition(s), {} call(s), frame {}",
            partitions.len(),
            functions.len(),
            frame
        );

        for partition in &partitions {
            let ordered = order_partition(rows, partition, &spec.order_by);
            let resolver = needs_frame
                .then(|| FrameResolver::new(rows, &ordered, frame.clone(), &spec.order_by));

            for position in 0..ordered.len() {
                let resolved = match &resolver {
                    Some(resolver) => Some(resolver.resolve(position)?),
                    None => None,
                };

                let input_index = ordered.rows[position];
                for function in functions {
                    let value = function.evaluate(rows, &ordered, position, resolved.as_ref());
                    output[input_index]
                        .fields
                        .insert(function.output.clone(), value);
                }
            }
        }

        Ok(())
    }
}
