//! Hyman's 1966 two-worker protocol. It does not provide mutual exclusion.
//!
//! ```text
//! flag[me] = true
//! while turn != me:
//!     while flag[you]: spin
//!     turn = me
//! <critical section>
//! flag[me] = false
//! ```
//!
//! Failing schedule: worker 1 raises its flag, sees `turn == 0`, sees flag 0 down and
//! leaves the inner spin. Worker 0 now raises its flag, sees `turn == 0` and walks in.
//! Worker 1 writes `turn = 1`, re-reads it and walks in as well.
//!
//! The lock is kept as a control for the harness, which must be able to observe this.

use std::time::Instant;

use super::{
    cell::{doors, Door, Slot},
    hook::{Interleave, NoHook, PausePoint},
    spin::{SpinPolicy, Spinner},
    RawDoorLock,
};
use crate::{error::check_worker, LockError};

const WORKERS: usize = 2;

#[derive(Debug)]
pub struct FlagState {
    flags: Box<[Door]>,
    turn: Slot,
}

impl FlagState {
    pub fn new(workers: usize) -> Result<Self, LockError> {
        match workers {
            0 => Err(LockError::NoWorkers),
            WORKERS => Ok(Self {
                flags: doors(WORKERS),
                turn: Slot::new(0),
            }),
            _ => Err(LockError::UnsupportedWorkers {
                workers,
                supported: WORKERS,
            }),
        }
    }

    pub fn workers(&self) -> usize {
        WORKERS
    }

    pub fn turn(&self) -> usize {
        self.turn.get()
    }

    pub fn is_raised(&self, worker_id: usize) -> Result<bool, LockError> {
        check_worker(worker_id, WORKERS)?;
        Ok(self.flags[worker_id].is_raised())
    }

    pub fn is_quiescent(&self) -> bool {
        self.flags.iter().all(|flag| !flag.is_raised())
    }
}

pub struct HymanLock<H = NoHook> {
    state: FlagState,
    spin: SpinPolicy,
    hook: H,
}

impl HymanLock {
    pub fn new(workers: usize) -> Result<Self, LockError> {
        Self::with_policy(workers, SpinPolicy::default())
    }

    pub fn with_policy(workers: usize, spin: SpinPolicy) -> Result<Self, LockError> {
        Self::with_hook(workers, spin, NoHook)
    }
}

impl<H: Interleave> HymanLock<H> {
    pub fn with_hook(workers: usize, spin: SpinPolicy, hook: H) -> Result<Self, LockError> {
        Ok(Self {
            state: FlagState::new(workers)?,
            spin,
            hook,
        })
    }

    pub fn state(&self) -> &FlagState {
        &self.state
    }

    fn enter(&self, worker_id: usize, deadline: Option<Instant>) -> bool {
        let FlagState { flags, turn } = &self.state;
        let other_id = 1 - worker_id;
        let spinner = Spinner::new(self.spin, deadline);

        flags[worker_id].raise();
        self.hook.pause(worker_id, PausePoint::FlagRaised);

        while turn.get() != worker_id {
            while flags[other_id].is_raised() {
                if spinner.expired() {
                    flags[worker_id].lower();
                    return false;
                }

                spinner.idle();
            }

            self.hook.pause(worker_id, PausePoint::ClaimTurn);
            turn.set(worker_id);
        }

        true
    }
}

impl<H: Interleave> RawDoorLock for HymanLock<H> {
    fn workers(&self) -> usize {
        self.state.workers()
    }

    fn acquire(&self, worker_id: usize) -> Result<(), LockError> {
        check_worker(worker_id, WORKERS)?;
        self.enter(worker_id, None);
        Ok(())
    }

    fn try_acquire_until(&self, worker_id: usize, deadline: Instant) -> Result<bool, LockError> {
        check_worker(worker_id, WORKERS)?;
        Ok(self.enter(worker_id, Some(deadline)))
    }

    fn release(&self, worker_id: usize) -> Result<(), LockError> {
        check_worker(worker_id, WORKERS)?;
        self.state.flags[worker_id].lower();
        Ok(())
    }
}
