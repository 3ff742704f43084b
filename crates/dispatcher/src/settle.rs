//! Uniform settling of channel action outcomes
//!
//! Pending outcomes are spawned fire-and-forget; a rejection is stamped with
//! its originating dispatch context and forwarded to the error handler.
//! Failures in one channel's outcome never affect other channels.

use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use contracts::{DispatchContext, DispatchFailure, ErrorHandler, PendingOutcome};
use tokio::runtime::Handle;
use tracing::warn;

use crate::metrics::DispatchMetrics;

/// Settle one pending outcome in the background.
pub(crate) fn settle(
    outcome: PendingOutcome,
    context: DispatchContext,
    handler: ErrorHandler,
    metrics: Arc<DispatchMetrics>,
) {
    match Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(async move {
                if let Err(error) = outcome.await {
                    metrics.inc_failure_count();
                    observability::record_channel_failure(&context.channel);
                    handler(&DispatchFailure { error, context });
                }
            });
        }
        Err(_) => settle_without_runtime(outcome, context, handler, &metrics),
    }
}

/// Without a runtime, an already-settled failure must still reach the
/// handler (the synchronous failure path); a genuinely pending outcome can
/// never settle, so its handler is left dangling and the outcome dropped.
fn settle_without_runtime(
    mut outcome: PendingOutcome,
    context: DispatchContext,
    handler: ErrorHandler,
    metrics: &DispatchMetrics,
) {
    let mut cx = Context::from_waker(Waker::noop());
    match outcome.as_mut().poll(&mut cx) {
        Poll::Ready(Err(error)) => {
            metrics.inc_failure_count();
            observability::record_channel_failure(&context.channel);
            handler(&DispatchFailure { error, context });
        }
        Poll::Ready(Ok(())) => {}
        Poll::Pending => {
            warn!(channel = %context.channel, "pending outcome dropped: no async runtime");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{DispatchResult, TrackerError};
    use std::sync::Mutex;

    fn context() -> DispatchContext {
        let mut ctx = DispatchContext::new("track", "k", Default::default(), "test".into());
        ctx.result = DispatchResult::Pending;
        ctx
    }

    #[test]
    fn test_ready_failure_settles_without_runtime() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: ErrorHandler = Arc::new(move |failure| {
            sink.lock().unwrap().push(failure.error.to_string());
        });

        settle(
            Box::pin(std::future::ready(Err(TrackerError::action(
                "test", "track", "boom",
            )))),
            context(),
            handler,
            Arc::new(DispatchMetrics::new()),
        );

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(seen.lock().unwrap()[0].contains("boom"));
    }

    #[test]
    fn test_pending_outcome_without_runtime_is_dropped() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: ErrorHandler = Arc::new(move |failure| {
            sink.lock().unwrap().push(failure.error.to_string());
        });

        settle(
            Box::pin(std::future::pending::<Result<(), TrackerError>>()),
            context(),
            handler,
            Arc::new(DispatchMetrics::new()),
        );

        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejection_settles_on_runtime() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: ErrorHandler = Arc::new(move |failure| {
            sink.lock().unwrap().push(failure.to_string());
        });
        let metrics = Arc::new(DispatchMetrics::new());

        settle(
            Box::pin(async { Err(TrackerError::vendor("socket closed")) }),
            context(),
            handler,
            Arc::clone(&metrics),
        );

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(metrics.failure_count(), 1);
    }
}
