//! Dijkstra's 1965 solution to concurrent programming control.
//!
//! Every worker owns two doors, one in an outer wall and one in an inner wall. A worker
//! may raise or lower its own doors and look at everybody else's. One shared `candidate`
//! cell names the worker currently favored to enter.
//!
//! A worker raises its outer door, then loops:
//!
//! * not the candidate: lower the inner door, and if the candidate's outer door is down
//!   the candidate is gone, so write yourself into `candidate`;
//! * the candidate: raise the inner door and look at every other inner door. All down
//!   means nobody else got this far, so the worker is inside.
//!
//! Two workers can both see the old candidate gone and both claim the slot. Whichever
//! write lands last is the candidate; the other one drops its inner door on its next
//! iteration. Both may briefly stand in their inner doorway and then both retry, but they
//! can never both pass the inner scan.
//!
//! No bound on the number of retries exists. A worker that dies inside, or walks away
//! from an attempt without lowering its doors, blocks everybody else forever.

use std::time::Instant;

use super::{
    cell::{doors, Door, Slot},
    hook::{Interleave, NoHook, PausePoint},
    spin::{SpinPolicy, Spinner},
    RawDoorLock,
};
use crate::{error::check_worker, LockError};

/// Where a worker stands, judged only from its own doors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Outside,
    /// Outer door raised, inner door down.
    Outer,
    /// Both doors raised: either scanning the inner wall or inside.
    Inner,
}

#[derive(Debug)]
pub struct DoorState {
    outer: Box<[Door]>,
    inner: Box<[Door]>,
    candidate: Slot,
}

impl DoorState {
    pub fn new(workers: usize) -> Result<Self, LockError> {
        if workers == 0 {
            return Err(LockError::NoWorkers);
        }

        Ok(Self {
            outer: doors(workers),
            inner: doors(workers),
            candidate: Slot::new(0),
        })
    }

    pub fn workers(&self) -> usize {
        self.outer.len()
    }

    pub fn candidate(&self) -> usize {
        self.candidate.get()
    }

    pub fn phase(&self, worker_id: usize) -> Result<Phase, LockError> {
        check_worker(worker_id, self.workers())?;

        let phase = match (
            self.outer[worker_id].is_raised(),
            self.inner[worker_id].is_raised(),
        ) {
            (false, _) => Phase::Outside,
            (true, false) => Phase::Outer,
            (true, true) => Phase::Inner,
        };

        Ok(phase)
    }

    /// Whether every door in both walls is down.
    pub fn is_quiescent(&self) -> bool {
        self.outer
            .iter()
            .chain(self.inner.iter())
            .all(|door| !door.is_raised())
    }
}

pub struct DijkstraLock<H = NoHook> {
    state: DoorState,
    spin: SpinPolicy,
    hook: H,
}

impl DijkstraLock {
    pub fn new(workers: usize) -> Result<Self, LockError> {
        Self::with_policy(workers, SpinPolicy::default())
    }

    pub fn with_policy(workers: usize, spin: SpinPolicy) -> Result<Self, LockError> {
        Self::with_hook(workers, spin, NoHook)
    }
}

impl<H: Interleave> DijkstraLock<H> {
    pub fn with_hook(workers: usize, spin: SpinPolicy, hook: H) -> Result<Self, LockError> {
        Ok(Self {
            state: DoorState::new(workers)?,
            spin,
            hook,
        })
    }

    pub fn state(&self) -> &DoorState {
        &self.state
    }

    pub fn spin_policy(&self) -> SpinPolicy {
        self.spin
    }

    fn enter(&self, worker_id: usize, deadline: Option<Instant>) -> bool {
        let DoorState {
            outer,
            inner,
            candidate,
        } = &self.state;
        let spinner = Spinner::new(self.spin, deadline);

        outer[worker_id].raise();
        self.hook.pause(worker_id, PausePoint::OuterRaised);

        loop {
            let current = candidate.get();

            if current != worker_id {
                inner[worker_id].lower();

                if !outer[current].is_raised() {
                    self.hook.pause(worker_id, PausePoint::ClaimCandidate);
                    candidate.set(worker_id);
                }
            } else {
                inner[worker_id].raise();
                self.hook.pause(worker_id, PausePoint::InnerRaised);

                let alone = inner
                    .iter()
                    .enumerate()
                    .all(|(other, door)| other == worker_id || !door.is_raised());

                if alone {
                    return true;
                }
            }

            if spinner.expired() {
                self.leave(worker_id);
                return false;
            }

            spinner.idle();
        }
    }

    // inner before outer: a lowered outer door tells others the candidate is gone
    fn leave(&self, worker_id: usize) {
        self.state.inner[worker_id].lower();
        self.state.outer[worker_id].lower();
    }
}

impl<H: Interleave> RawDoorLock for DijkstraLock<H> {
    fn workers(&self) -> usize {
        self.state.workers()
    }

    fn acquire(&self, worker_id: usize) -> Result<(), LockError> {
        check_worker(worker_id, self.workers())?;
        self.enter(worker_id, None);
        Ok(())
    }

    fn try_acquire_until(&self, worker_id: usize, deadline: Instant) -> Result<bool, LockError> {
        check_worker(worker_id, self.workers())?;
        Ok(self.enter(worker_id, Some(deadline)))
    }

    fn release(&self, worker_id: usize) -> Result<(), LockError> {
        check_worker(worker_id, self.workers())?;
        self.leave(worker_id);
        Ok(())
    }
}
