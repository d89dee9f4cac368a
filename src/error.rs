use std::{error::Error, fmt};

/// Misuse of a lock's worker indexing. Raised before any shared cell is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockError {
    /// A lock needs at least one worker.
    NoWorkers,
    /// The protocol only supports a fixed number of workers.
    UnsupportedWorkers { workers: usize, supported: usize },
    /// Worker ids are array indices in `0..workers`.
    WorkerOutOfRange { worker_id: usize, workers: usize },
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::NoWorkers => write!(f, "worker count must be at least 1"),
            LockError::UnsupportedWorkers { workers, supported } => write!(
                f,
                "protocol supports exactly {} workers, got {}",
                supported, workers
            ),
            LockError::WorkerOutOfRange { worker_id, workers } => write!(
                f,
                "worker id {} is outside 0..{}",
                worker_id, workers
            ),
        }
    }
}

impl Error for LockError {}

#[inline]
pub(crate) fn check_worker(worker_id: usize, workers: usize) -> Result<(), LockError> {
    if worker_id < workers {
        Ok(())
    } else {
        Err(LockError::WorkerOutOfRange { worker_id, workers })
    }
}
