//! Two-state retry machine driven by [`PushClient`](crate::PushClient).
//!
//! ```text
//! Attempting(n) --success / fatal error / n == max--> done
//! Attempting(n) --retryable error-------------------> WaitingToRetry(n)
//! WaitingToRetry(n) --interval elapsed--------------> Attempting(n + 1)
//! WaitingToRetry(n) --cancelled---------------------> done (last error)
//! ```

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{PushError, RetryPolicy};

#[derive(Debug)]
pub(crate) enum RetryState {
    Attempting { attempt: u32 },
    WaitingToRetry {
        attempt: u32,
        delay: Duration,
        last_error: PushError,
    },
}

/// What follows a finished attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Decision {
    /// Hand the attempt's result back to the caller.
    Finish,
    /// Wait `delay` (possibly zero), then attempt again.
    Retry { delay: Duration },
}

impl RetryPolicy {
    /// Status codes never matter here: only retryable errors, with attempts left,
    /// lead to another attempt.
    pub(crate) fn decide<T>(&self, attempt: u32, result: &Result<T, PushError>) -> Decision {
        match result {
            Err(err) if err.is_retryable() && attempt < self.max_retry_times() => Decision::Retry {
                delay: self.retry_interval(),
            },
            _ => Decision::Finish,
        }
    }
}

/// Waits out `delay` unless `cancel` fires first.
///
/// Returns `false` when the call must stop. A zero delay does not wait but
/// still honors a cancellation that already happened.
///
/// A zero interval therefore means "retry immediately", not "never retry".
/// Stopping after the first failure when the interval is zero is deliberately
/// not done; the attempt budget alone bounds the loop.
pub(crate) async fn wait_for_retry(delay: Duration, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    if delay.is_zero() {
        return true;
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
