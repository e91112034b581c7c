//! Bounded-time execution guard.
//!
//! Wraps work whose collaborator may never terminate (template rendering).
//! The work runs on a detached worker thread and its result is raced
//! against a deadline; on timeout the worker is abandoned, never joined.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, bounded};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("operation did not complete within {}ms", timeout.as_millis())]
pub struct TimeoutError {
    pub timeout: Duration,
}

/// Run `work` on a worker thread, waiting at most `timeout` for its result.
///
/// The sender side uses a bounded(1) channel so an abandoned worker's late
/// send never blocks; the worker thread is detached and simply exits after
/// the failed send.
///
/// # Errors
/// Returns [`TimeoutError`] when the deadline elapses first. The worker
/// keeps running in the background and its eventual result is discarded.
pub fn run_with_timeout<T, F>(timeout: Duration, work: F) -> Result<T, TimeoutError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = bounded(1);

    thread::spawn(move || {
        let _ = tx.send(work());
    });

    rx.recv_timeout(timeout).map_err(|e| match e {
        RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected => TimeoutError { timeout },
    })
}

#[cfg(test)]
#[path = "timeout_tests.rs"]
mod tests;
