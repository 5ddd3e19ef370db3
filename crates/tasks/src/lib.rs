//! A task-spawning seam so background loops (the fees pump, the pending-tx
//! dispatcher, cache eviction) go through one trait instead of calling
//! `tokio::spawn` directly, letting tests swap in a synchronous executor.
//! Mirrors the teacher's own `reth-tasks` crate.

use std::future::Future;
use std::pin::Pin;

pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Spawns fire-and-forget tasks, distinguishing ones whose death should be
/// treated as fatal (`spawn_critical`) from best-effort ones (`spawn`).
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, fut: BoxFuture);

    /// Spawns a task whose panic or early return should be logged loudly —
    /// background pumps (fees, pending-tx) use this so a silent death
    /// doesn't look like a healthy idle state.
    fn spawn_critical(&self, name: &'static str, fut: BoxFuture) {
        self.spawn(Box::pin(async move {
            fut.await;
            tracing::debug!(task = name, "critical task finished");
        }));
    }
}

/// The production spawner: hands futures to the ambient tokio runtime.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioTaskExecutor;

impl TaskSpawner for TokioTaskExecutor {
    fn spawn(&self, fut: BoxFuture) {
        tokio::spawn(fut);
    }

    fn spawn_critical(&self, name: &'static str, fut: BoxFuture) {
        tokio::spawn(async move {
            fut.await;
            tracing::warn!(task = name, "critical background task exited");
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn tokio_executor_runs_spawned_future() {
        let executed = Arc::new(AtomicBool::new(false));
        let flag = executed.clone();
        TokioTaskExecutor.spawn(Box::pin(async move {
            flag.store(true, Ordering::SeqCst);
        }));
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(executed.load(Ordering::SeqCst));
    }
}
