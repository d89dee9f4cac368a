use std::time::Instant;

use log::trace;

use crate::{harness::Recorder, lock::RawDoorLock, LockError};

/// One participant, identified by its index into the lock's per-worker cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Worker {
    id: usize,
}

impl Worker {
    pub fn new(id: usize) -> Self {
        Self { id }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Acquire, call `payload`, release.
    pub fn run<L, F, R>(&self, lock: &L, payload: F) -> Result<R, LockError>
    where
        L: RawDoorLock + ?Sized,
        F: FnOnce() -> R,
    {
        lock.acquire(self.id)?;
        trace!("worker {} acquired the lock", self.id);

        let result = payload();

        trace!("worker {} is releasing the lock", self.id);
        lock.release(self.id)?;

        Ok(result)
    }

    /// Like [`Worker::run`], with the stay recorded in `recorder`.
    ///
    /// With a deadline the worker may give up; `Ok(None)` means it left without entering.
    pub fn run_recorded<L, F, R>(
        &self,
        lock: &L,
        recorder: &Recorder,
        round: usize,
        deadline: Option<Instant>,
        payload: F,
    ) -> Result<Option<R>, LockError>
    where
        L: RawDoorLock + ?Sized,
        F: FnOnce() -> R,
    {
        match deadline {
            Some(deadline) => {
                if !lock.try_acquire_until(self.id, deadline)? {
                    trace!("worker {} gave up in round {}", self.id, round);
                    return Ok(None);
                }
            }
            None => lock.acquire(self.id)?,
        }

        let entry = recorder.enter(self.id, round);
        trace!("worker {} entered in round {}", self.id, round);

        let result = payload();

        let interval = recorder.exit(entry);
        trace!(
            "worker {} leaves after {:?} in round {}",
            self.id,
            interval.held(),
            round
        );
        lock.release(self.id)?;

        Ok(Some(result))
    }
}
