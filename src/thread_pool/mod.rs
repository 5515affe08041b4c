use crate::Result;

/// Runs session jobs in worker threads.
///
/// Each job owns everything it touches; pools never hand a job any state
/// shared with the listener or with other jobs.
pub trait ThreadPool {
    /// Creates a new pool sized for `threads` concurrent jobs.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created (e.g., zero threads).
    fn new(threads: u32) -> Result<Self>
    where
        Self: Sized;

    /// Hands a job to the pool without waiting for it to run.
    ///
    /// A panic inside the job is contained to that job.
    fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static;
}

mod per_session;
mod shared_queue;

pub use self::per_session::PerSessionThreads;
pub use self::shared_queue::SharedQueueThreadPool;
