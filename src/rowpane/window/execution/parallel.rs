//! Partition-parallel evaluation.
//!
//! [`ParallelEvaluator`] computes the same results as the sequential
//! [`WindowEvaluator`](crate::rowpane::window::execution::pipeline::WindowEvaluator):
//! requests are validated and planned up front, then every (request,
//! partition) pair becomes one worker task. A semaphore bounds how many
//! tasks compute at once, and computed columns merge back by original row
//! index so the output order never depends on task completion order.
//!
//! A [`CancellationHandle`] stops the evaluation between partition tasks:
//! tasks that have not started yet bail out, and the call returns
//! [`WindowError::Cancelled`] when any work was skipped.

use crate::rowpane::window::error::{WindowError, WindowResult};
use crate::rowpane::window::execution::frame::{effective_frame, FrameResolver};
use crate::rowpane::window::execution::functions::PlannedFunction;
use crate::rowpane::window::execution::order::order_partition;
use crate::rowpane::window::execution::partition::{partition_rows, Partition};
use crate::rowpane::window::execution::types::{FieldValue, Row, Schema};
use crate::rowpane::window::spec::{WindowRequest, WindowSpec};
use crate::rowpane::window::validation::RequestValidator;
use log::debug;
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

/// Configuration for parallel window evaluation
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Maximum number of partition tasks computing concurrently
    pub max_parallel: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_parallel: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

impl ParallelConfig {
    /// Create a configuration with specific parallelism
    pub fn with_max_parallel(max_parallel: usize) -> Self {
        Self { max_parallel }
    }
}

/// Cloneable handle that cancels an evaluation in flight.
///
/// Cancelling is idempotent and affects every evaluation run by the handle's
/// evaluator, including future ones.
#[derive(Clone)]
pub struct CancellationHandle {
    cancel: Arc<watch::Sender<bool>>,
}

impl CancellationHandle {
    /// Request cancellation; partition tasks that have not started bail out
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }
}

/// Partition-parallel window evaluator
pub struct ParallelEvaluator {
    config: ParallelConfig,
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
}

impl ParallelEvaluator {
    /// Create a new evaluator with the given configuration
    pub fn new(config: ParallelConfig) -> Self {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        Self {
            config,
            cancel_tx: Arc::new(cancel_tx),
            cancel_rx,
        }
    }

    /// Create with default configuration
    pub fn with_default_config() -> Self {
        Self::new(ParallelConfig::default())
    }

    /// Handle that cancels this evaluator's runs
    pub fn cancellation_handle(&self) -> CancellationHandle {
        CancellationHandle {
            cancel: self.cancel_tx.clone(),
        }
    }

    /// Evaluate window requests over a row set, partitions in parallel.
    ///
    /// Produces exactly the rows the sequential evaluator would: input order,
    /// input fields plus one computed column per call. Fails with
    /// [`WindowError::Cancelled`] when the cancellation handle fired before
    /// every partition task ran; configuration errors surface before any
    /// task is spawned.
    pub async fn evaluate(
        &self,
        rows: Vec<Row>,
        schema: &Schema,
        requests: &[WindowRequest],
    ) -> WindowResult<Vec<Row>> {
        RequestValidator::validate_requests(schema, requests)?;

        let mut planned: Vec<(Arc<WindowSpec>, Arc<Vec<PlannedFunction>>)> =
            Vec::with_capacity(requests.len());
        for request in requests {
            let mut functions = Vec::with_capacity(request.calls.len());
            for call in &request.calls {
                functions.push(PlannedFunction::plan(call, schema)?);
            }
            planned.push((Arc::new(request.spec.clone()), Arc::new(functions)));
        }

        let shared: Arc<[Row]> = rows.into();
        let mut output: Vec<Row> = shared.to_vec();

        // A zero permit pool would never run anything
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel.max(1)));
        let mut join_set = JoinSet::new();
        let mut task_count = 0usize;

        for (spec, functions) in &planned {
            for partition in partition_rows(&shared, &spec.partition_by) {
                let semaphore = semaphore.clone();
                let cancel = self.cancel_rx.clone();
                let rows = shared.clone();
                let spec = spec.clone();
                let functions = functions.clone();
                task_count += 1;

                join_set.spawn(async move {
                    let _permit = semaphore.acquire().await.unwrap();

                    if *cancel.borrow() {
                        return Err(WindowError::Cancelled);
                    }

                    evaluate_partition(&rows, &spec, &functions, &partition)
                });
            }
        }

        debug!(
            "Parallel window evaluation: {} request(s), {} partition task(s), max_parallel {}",
            requests.len(),
            task_count,
            self.config.max_parallel
        );

        let mut first_error: Option<WindowError> = None;
        let mut cancelled = false;

        while let Some(result) = join_set.join_next().await {
            match result {
                Ok(Ok(computed)) => {
                    for (input_index, column, value) in computed {
                        output[input_index].fields.insert(column, value);
                    }
                }
                Ok(Err(WindowError::Cancelled)) => {
                    cancelled = true;
                }
                Ok(Err(error)) => {
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
                Err(join_error) => {
                    log::error!("Window partition task failed to join: {}", join_error);
                    if first_error.is_none() {
                        first_error = Some(WindowError::execution_error(
                            format!("partition task panicked: {}", join_error),
                            None,
                        ));
                    }
                }
            }
        }

        if let Some(error) = first_error {
            return Err(error);
        }
        if cancelled {
            return Err(WindowError::Cancelled);
        }
        Ok(output)
    }
}

/// Evaluate one request over one partition, returning
/// (input index, output column, value) triples for the merge
fn evaluate_partition(
    rows: &[Row],
    spec: &WindowSpec,
    functions: &[PlannedFunction],
    partition: &Partition,
) -> WindowResult<Vec<(usize, String, FieldValue)>> {
    let ordered = order_partition(rows, partition, &spec.order_by);
    let needs_frame = functions.iter().any(|f| f.kind.uses_frame());
    let resolver = needs_frame
        .then(|| FrameResolver::new(rows, &ordered, effective_frame(spec), &spec.order_by));

    let mut computed = Vec::with_capacity(ordered.len() * functions.len());
    for position in 0..ordered.len() {
        let resolved = match &resolver {
            Some(resolver) => Some(resolver.resolve(position)?),
            None => None,
        };

        let input_index = ordered.rows[position];
        for function in functions {
            let value = function.evaluate(rows, &ordered, position, resolved.as_ref());
            computed.push((input_index, function.output.clone(), value));
        }
    }
    Ok(computed)
}
