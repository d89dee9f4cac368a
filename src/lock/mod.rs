pub mod cell;
pub mod dijkstra;
pub mod hook;
pub mod hyman;
pub mod spin;

pub use dijkstra::{DijkstraLock, DoorState, Phase};
pub use hook::{Interleave, NoHook, PausePoint};
pub use hyman::{FlagState, HymanLock};
pub use spin::SpinPolicy;

use std::time::Instant;

use crate::LockError;

/// A lock over `workers()` indexed participants, built only from shared reads and writes.
///
/// Implementations do not promise mutual exclusion: `HymanLock` is known to break it.
/// Callers pass their own dense worker id to every call.
pub trait RawDoorLock: Sync {
    fn workers(&self) -> usize;

    /// Blocking: spin until the worker is let in.
    fn acquire(&self, worker_id: usize) -> Result<(), LockError>;

    /// Blocking with a deadline. Returns false after the worker gave up and lowered
    /// everything it raised during the attempt.
    fn try_acquire_until(&self, worker_id: usize, deadline: Instant) -> Result<bool, LockError>;

    /// Release the lock. Only touches the cells owned by `worker_id`.
    fn release(&self, worker_id: usize) -> Result<(), LockError>;
}
