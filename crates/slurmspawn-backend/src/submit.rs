//! Serialization of external submissions.
//!
//! The scheduler CLI tolerates concurrent queries, but overlapping
//! submissions race against its own concurrency limits, so every submit in
//! the process goes through one gate. Callers suspend on the gate instead
//! of blocking, so other sessions keep making progress while they wait.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

/// Process-scoped gate admitting one external submission at a time.
///
/// Cloning shares the gate; construct it once and inject it into every
/// spawner so the limit spans all sessions in the process.
#[derive(Debug, Clone)]
pub struct SubmitGate {
    permits: Arc<Semaphore>,
}

impl SubmitGate {
    /// Create a gate admitting one submission at a time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    /// Run `task` once the gate admits it, queueing behind any submission
    /// already in flight.
    ///
    /// # Panics
    ///
    /// Panics if the gate's semaphore has been closed, which never happens:
    /// nothing in this crate closes it.
    pub async fn run<F, T>(&self, task: F) -> T
    where
        F: Future<Output = T> + Send,
        T: Send,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("submit gate semaphore closed");
        task.await
    }
}

impl Default for SubmitGate {
    fn default() -> Self {
        Self::new()
    }
}
