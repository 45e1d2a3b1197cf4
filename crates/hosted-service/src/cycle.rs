//! # Cycle Runner
//!
//! Spawns one independent task per trigger firing and contains everything that can go wrong
//! inside it. A failed, timed out or panicking cycle is logged with `error!` and counted; it
//! never reaches the driver loop, so the next firing runs as usual.

use crate::error::CycleFailure;
use crate::job::CycleJob;
use crate::metrics::CycleMetrics;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tracing::{debug, error, info_span, Instrument};

/// Fire-and-forget: the returned value is not a handle, nothing ever awaits the cycle.
pub(crate) fn spawn_cycle<J: CycleJob>(
    job: Arc<J>,
    cycle: u64,
    deadline: Option<Duration>,
    metrics: CycleMetrics,
) {
    let span = info_span!("cycle", service = job.name(), cycle);
    metrics.record_started();

    let work = tokio::spawn(execute(job, cycle, deadline).instrument(span.clone()));

    tokio::spawn(
        async move {
            let outcome = match work.await {
                Ok(result) => result,
                Err(join_error) => Err(failure_from_join(join_error)),
            };
            match outcome {
                Ok(output) => {
                    debug!(?output, "Cycle completed");
                    metrics.record_succeeded();
                }
                Err(failure) => {
                    error!(error = %failure, "Cycle failed");
                    metrics.record_failed();
                }
            }
        }
        .instrument(span),
    );
}

/// The cycle body: fresh scope, then the job, optionally under a deadline.
async fn execute<J: CycleJob>(
    job: Arc<J>,
    cycle: u64,
    deadline: Option<Duration>,
) -> Result<J::Output, CycleFailure> {
    let scope = job
        .begin_scope()
        .map_err(|e| CycleFailure::Job(Box::new(e)))?;

    let run = job.run_cycle(scope, cycle);
    let result = match deadline {
        Some(limit) => tokio::time::timeout(limit, run)
            .await
            .map_err(|_| CycleFailure::TimedOut(limit))?,
        None => run.await,
    };
    result.map_err(|e| CycleFailure::Job(Box::new(e)))
}

fn failure_from_join(join_error: JoinError) -> CycleFailure {
    if join_error.is_panic() {
        CycleFailure::Panicked(panic_message(join_error.into_panic()))
    } else {
        CycleFailure::Aborted
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
