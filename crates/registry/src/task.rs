//! Spawns isolated units of work with panic containment, so a bug in one
//! session, dispatcher, or handler never takes the rest of the process
//! down with it.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicI64, Ordering};

use futures::FutureExt as _;

/// Tracks how many units of work are currently in flight. Not load-bearing
/// for correctness, only for diagnostics/logging.
#[derive(Default)]
pub struct Task {
    in_flight: AtomicI64,
}

impl Task {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight(&self) -> i64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Spawns `fut` on the Tokio runtime. A panic inside `fut` is caught,
    /// logged, and does not propagate to the caller or any other spawned
    /// unit.
    pub fn submit<F>(&self, label: &'static str, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        tokio::spawn(async move {
            if let Err(panic) = AssertUnwindSafe(fut).catch_unwind().await {
                let message = panic_message(&panic);
                tracing::error!(label, message, "task panicked");
            }
        });
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    use hylan_future_ext::FutureExt;

    use super::*;

    #[tokio::test]
    async fn panicking_task_does_not_crash_others() {
        let task = Task::new();
        let ran = Arc::new(AtomicBool::new(false));

        task.submit("panics", async { panic!("boom") });

        let flag = ran.clone();
        task.submit("runs", async move {
            flag.store(true, Ordering::Relaxed);
        });

        tokio::time::sleep(Duration::from_millis(20)).with_timeout(Duration::from_millis(200)).await.unwrap();
        assert!(ran.load(Ordering::Relaxed));
    }
}
