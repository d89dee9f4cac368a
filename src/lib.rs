pub mod error;
pub mod harness;
pub mod lock;
pub mod worker;

pub use error::LockError;
pub use harness::{Harness, HarnessError, Recorder, Report};
pub use lock::{DijkstraLock, DoorState, FlagState, HymanLock, RawDoorLock, SpinPolicy};
pub use worker::Worker;
