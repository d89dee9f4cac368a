use std::{
    sync::atomic::{AtomicU64, AtomicUsize, Ordering},
    time::{Duration, Instant},
};

use parking_lot::Mutex;

/// One stay inside the critical section.
///
/// `enter` and `exit` are ticks of a recorder-wide clock, so intervals from different
/// workers are totally ordered even when their wall-clock timestamps tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub worker_id: usize,
    pub round: usize,
    pub enter: u64,
    pub exit: u64,
    pub entered_at: Instant,
    pub exited_at: Instant,
}

impl Interval {
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.enter < other.exit && other.enter < self.exit
    }

    pub fn held(&self) -> Duration {
        self.exited_at.duration_since(self.entered_at)
    }
}

/// Proof of a recorded entry, handed back to [`Recorder::exit`].
#[derive(Debug)]
#[must_use]
pub struct Entry {
    worker_id: usize,
    round: usize,
    enter: u64,
    entered_at: Instant,
}

#[derive(Debug, Default)]
pub struct Recorder {
    clock: AtomicU64,
    inside: AtomicUsize,
    peak: AtomicUsize,
    intervals: Mutex<Vec<Interval>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called right after `acquire` returns.
    pub fn enter(&self, worker_id: usize, round: usize) -> Entry {
        let inside = self.inside.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(inside, Ordering::SeqCst);

        Entry {
            worker_id,
            round,
            enter: self.clock.fetch_add(1, Ordering::SeqCst),
            entered_at: Instant::now(),
        }
    }

    /// Called right before `release`.
    pub fn exit(&self, entry: Entry) -> Interval {
        let exited_at = Instant::now();
        let exit = self.clock.fetch_add(1, Ordering::SeqCst);
        self.inside.fetch_sub(1, Ordering::SeqCst);

        let interval = Interval {
            worker_id: entry.worker_id,
            round: entry.round,
            enter: entry.enter,
            exit,
            entered_at: entry.entered_at,
            exited_at,
        };
        self.intervals.lock().push(interval);

        interval
    }

    /// Number of workers currently between `enter` and `exit`.
    pub fn inside(&self) -> usize {
        self.inside.load(Ordering::SeqCst)
    }

    /// Most workers ever observed between `enter` and `exit` at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Recorded intervals in entry order.
    pub fn intervals(&self) -> Vec<Interval> {
        let mut intervals = self.intervals.lock().clone();
        intervals.sort_by_key(|interval| interval.enter);
        intervals
    }
}

/// Every pair of overlapping intervals. `intervals` must be sorted by `enter`.
pub fn overlapping(intervals: &[Interval]) -> Vec<(Interval, Interval)> {
    let mut pairs = Vec::new();

    for (i, first) in intervals.iter().enumerate() {
        for second in intervals[i + 1..]
            .iter()
            .take_while(|second| second.enter < first.exit)
        {
            pairs.push((*first, *second));
        }
    }

    pairs
}
