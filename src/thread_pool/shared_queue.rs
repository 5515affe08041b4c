use std::thread;

use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, error};

use super::ThreadPool;
use crate::{FtpError, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A fixed set of workers pulling jobs off one shared queue.
///
/// At most `threads` sessions are served at once; later ones wait in the
/// queue while the caller keeps accepting. A panicking job is caught and
/// its worker moves on to the next job.
pub struct SharedQueueThreadPool {
    tx: Sender<Job>,
}

impl ThreadPool for SharedQueueThreadPool {
    fn new(threads: u32) -> Result<Self> {
        if threads == 0 {
            return Err(FtpError::StringError(
                "thread pool needs at least one thread".to_owned(),
            ));
        }
        let (tx, rx) = channel::unbounded::<Job>();

        for id in 0..threads {
            spawn_worker(id, rx.clone())?;
        }

        Ok(SharedQueueThreadPool { tx })
    }

    fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx
            .send(Box::new(job))
            .map_err(|_| FtpError::StringError("thread pool has no active threads".to_owned()))
    }
}

fn spawn_worker(id: u32, rx: Receiver<Job>) -> Result<()> {
    thread::Builder::new()
        .name(format!("session-worker-{id}"))
        .spawn(move || {
            for job in rx.iter() {
                debug!("Worker {id} picked up a session");
                if std::panic::catch_unwind(std::panic::AssertUnwindSafe(job)).is_err() {
                    error!("Worker {id}: session panicked, continuing");
                }
            }
            debug!("Worker {id}: queue closed, shutting down");
        })?;
    Ok(())
}
