//! Cancellable repeating task
//!
//! Runs a job on a dedicated thread: once immediately, then once per
//! interval measured start-to-start. Runs never overlap; a run that overshoots
//! the interval is followed directly by the next one.

use eyre::{Context, Result};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub struct RepeatingTask {
    stop: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl RepeatingTask {
    pub fn spawn<F>(name: &str, interval: Duration, mut job: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (stop, stopped) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                loop {
                    let started = Instant::now();
                    job();
                    let wait = interval.saturating_sub(started.elapsed());
                    match stopped.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        // Cancelled, or the owning handle was dropped
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .context("Failed to spawn scheduler thread")?;

        Ok(Self { stop, handle })
    }

    /// Prevent further runs. A run already in progress finishes first.
    pub fn cancel(self) {
        let Self { stop, handle } = self;
        // A send error means the thread already exited
        let _ = stop.send(());
        if handle.join().is_err() {
            log::error!("Scheduler thread panicked");
        }
    }
}
