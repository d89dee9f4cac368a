//! Runs workers against a lock and records what happened.
//!
//! The harness never judges a run while it is going on. It records an [`Interval`] for
//! every stay inside the critical section, and [`Report`] checks the intervals afterwards.

mod recorder;

pub use recorder::{overlapping, Entry, Interval, Recorder};

use std::{
    error::Error,
    fmt, thread,
    time::{Duration, Instant},
};

use crossbeam_utils::thread::scope;
use log::{debug, info, warn};
use rand::{thread_rng, Rng};

use crate::{lock::RawDoorLock, LockError, Worker};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    /// Every worker needs at least one round. Zero workers is `Lock(NoWorkers)`.
    NoRounds,
    Lock(LockError),
    /// Workers that hit the deadline before finishing all their rounds.
    Starved { workers: Vec<usize>, entries: usize },
    /// Two or more workers were inside together.
    Overlap { pairs: usize },
    Panicked,
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessError::NoRounds => write!(f, "every worker needs at least one round"),
            HarnessError::Lock(e) => write!(f, "lock misuse: {}", e),
            HarnessError::Starved { workers, entries } => write!(
                f,
                "workers {:?} starved after {} recorded entries",
                workers, entries
            ),
            HarnessError::Overlap { pairs } => {
                write!(f, "{} pairs of overlapping critical sections", pairs)
            }
            HarnessError::Panicked => write!(f, "a worker thread panicked"),
        }
    }
}

impl Error for HarnessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            HarnessError::Lock(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LockError> for HarnessError {
    fn from(e: LockError) -> Self {
        HarnessError::Lock(e)
    }
}

#[derive(Debug, Clone)]
pub struct Harness {
    workers: usize,
    rounds: usize,
    hold: Duration,
    jitter: Duration,
    timeout: Duration,
}

impl Harness {
    /// One round per worker, no hold, no jitter, 30 seconds to finish.
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            rounds: 1,
            hold: Duration::ZERO,
            jitter: Duration::ZERO,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    /// Time spent inside the critical section per entry.
    pub fn hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    /// Upper bound of the random pause before each attempt.
    pub fn jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn check<L: RawDoorLock + ?Sized>(&self, lock: &L) -> Result<(), HarnessError> {
        if self.workers == 0 {
            return Err(LockError::NoWorkers.into());
        }
        if self.rounds == 0 {
            return Err(HarnessError::NoRounds);
        }
        if self.workers > lock.workers() {
            return Err(LockError::WorkerOutOfRange {
                worker_id: self.workers - 1,
                workers: lock.workers(),
            }
            .into());
        }

        Ok(())
    }

    /// Run every worker for its rounds and collect the intervals.
    ///
    /// Workers still trying at the deadline abandon their attempt and the run fails with
    /// [`HarnessError::Starved`]. Overlaps are not an error here; see [`Report::check`].
    pub fn run<L: RawDoorLock + ?Sized>(&self, lock: &L) -> Result<Report, HarnessError> {
        self.check(lock)?;

        info!(
            "running {} workers x {} rounds (hold {:?}, jitter {:?})",
            self.workers, self.rounds, self.hold, self.jitter
        );

        let recorder = Recorder::new();
        let start = Instant::now();
        let deadline = start + self.timeout;

        let outcomes = scope(|s| {
            let mut threads = Vec::new();

            for id in 0..self.workers {
                let recorder = &recorder;
                let t = s.spawn(move |_| self.work(lock, Worker::new(id), recorder, deadline));

                threads.push(t);
            }

            threads
                .into_iter()
                .map(|h| h.join().map_err(|_| HarnessError::Panicked))
                .collect::<Vec<_>>()
        })
        .map_err(|_| HarnessError::Panicked)?;

        let elapsed = start.elapsed();
        let mut starved = Vec::new();
        for (id, outcome) in outcomes.into_iter().enumerate() {
            if !outcome?? {
                starved.push(id);
            }
        }

        let report = Report {
            intervals: recorder.intervals(),
            elapsed,
            peak: recorder.peak(),
        };

        if !starved.is_empty() {
            warn!("workers {:?} did not finish within {:?}", starved, self.timeout);
            return Err(HarnessError::Starved {
                workers: starved,
                entries: report.entries(),
            });
        }

        let overlaps = report.overlaps().len();
        if overlaps > 0 {
            warn!("{} overlapping critical sections", overlaps);
        }
        info!("{}", report);

        Ok(report)
    }

    // true when all rounds completed
    fn work<L: RawDoorLock + ?Sized>(
        &self,
        lock: &L,
        worker: Worker,
        recorder: &Recorder,
        deadline: Instant,
    ) -> Result<bool, LockError> {
        let mut rng = thread_rng();

        for round in 0..self.rounds {
            if !self.jitter.is_zero() {
                thread::sleep(rng.gen_range(Duration::ZERO..=self.jitter));
            }

            let hold = self.hold;
            let entered = worker.run_recorded(lock, recorder, round, Some(deadline), || {
                if !hold.is_zero() {
                    thread::sleep(hold);
                }
            })?;

            if entered.is_none() {
                debug!("worker {} abandoned round {}", worker.id(), round);
                return Ok(false);
            }
        }

        Ok(true)
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    intervals: Vec<Interval>,
    elapsed: Duration,
    peak: usize,
}

impl Report {
    pub fn entries(&self) -> usize {
        self.intervals.len()
    }

    pub fn entries_of(&self, worker_id: usize) -> usize {
        self.intervals
            .iter()
            .filter(|interval| interval.worker_id == worker_id)
            .count()
    }

    /// Intervals sorted by entry tick.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Most workers seen inside at once.
    pub fn peak(&self) -> usize {
        self.peak
    }

    pub fn overlaps(&self) -> Vec<(Interval, Interval)> {
        overlapping(&self.intervals)
    }

    pub fn is_exclusive(&self) -> bool {
        self.overlaps().is_empty()
    }

    pub fn check(&self) -> Result<(), HarnessError> {
        match self.overlaps().len() {
            0 => Ok(()),
            pairs => Err(HarnessError::Overlap { pairs }),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries in {:?}, peak occupancy {}, {} overlaps",
            self.entries(),
            self.elapsed,
            self.peak,
            self.overlaps().len()
        )
    }
}
