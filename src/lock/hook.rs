//! Interleaving injection for tests.
//!
//! Protocols call [`Interleave::pause`] at fixed points of `acquire`. The default
//! [`NoHook`] compiles to nothing, so a production lock performs exactly the protocol's
//! reads and writes. A test hook may block the calling worker to force a schedule.

/// Named points inside `acquire` where a hook runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PausePoint {
    /// Dijkstra: own outer door was just raised.
    OuterRaised,
    /// Dijkstra: the current candidate's outer door was seen lowered, `candidate` not yet
    /// written.
    ClaimCandidate,
    /// Dijkstra: own inner door was just raised, other inner doors not yet scanned.
    InnerRaised,
    /// Hyman: own flag was just raised.
    FlagRaised,
    /// Hyman: the other flag was seen lowered, `turn` not yet written.
    ClaimTurn,
}

pub trait Interleave: Sync {
    fn pause(&self, worker_id: usize, point: PausePoint);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoHook;

impl Interleave for NoHook {
    #[inline(always)]
    fn pause(&self, _worker_id: usize, _point: PausePoint) {}
}

impl<F> Interleave for F
where
    F: Fn(usize, PausePoint) + Sync,
{
    #[inline]
    fn pause(&self, worker_id: usize, point: PausePoint) {
        self(worker_id, point)
    }
}
