//! One-shot background I/O tasks.
//!
//! The concurrency model (spec.md §5) allows at most one outstanding
//! background task per stream, with buffers moved into the task rather than
//! shared. `command-executor`'s thread pool -- the teacher's concurrency
//! primitive -- models a shared queue drained by pool workers and joined as
//! a whole via `shutdown()`; it has no notion of "this one task, owned by
//! this one stream, joined right here". A dedicated one-shot thread per
//! task expresses that directly, at the cost of a thread spawn per
//! read-ahead/write-behind instead of a pool hand-off (see DESIGN.md).

use std::thread::JoinHandle;

use crate::error::{Error, Result};

/// A single background task producing a `T` when joined. At most one may be
/// outstanding per stream; streams hold an `Option<Task<T>>` and take it out
/// to join before starting the next one.
pub struct Task<T> {
    handle: JoinHandle<T>,
}

impl<T: Send + 'static> Task<T> {
    /// Spawn `f` on a dedicated thread.
    pub fn spawn<F>(f: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Task {
            handle: std::thread::spawn(f),
        }
    }

    /// Block until the task finishes and return its result. A panic in the
    /// background thread surfaces as `Error::WorkerPanicked` rather than
    /// propagating the panic into the foreground thread.
    pub fn join(self) -> Result<T> {
        self.handle.join().map_err(|_| Error::WorkerPanicked)
    }
}
