use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use log::error;

use super::ThreadPool;
use crate::Result;

/// Starts a fresh, detached thread for every job.
///
/// The pool keeps no handle on the threads it starts, so the cost to the
/// caller is the same however long a job runs. The thread count passed to
/// [`ThreadPool::new`] is ignored.
pub struct PerSessionThreads {
    next_id: AtomicU64,
}

impl ThreadPool for PerSessionThreads {
    fn new(_threads: u32) -> Result<Self> {
        Ok(PerSessionThreads {
            next_id: AtomicU64::new(0),
        })
    }

    fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        thread::Builder::new()
            .name(format!("session-{id}"))
            .spawn(move || {
                if std::panic::catch_unwind(std::panic::AssertUnwindSafe(job)).is_err() {
                    error!("Session {id} panicked");
                }
            })?;
        Ok(())
    }
}
