use std::{
    fmt, hint,
    str::FromStr,
    thread,
    time::{Duration, Instant},
};

use crossbeam_utils::Backoff;

/// What a waiting worker does between two iterations of a retry loop.
///
/// The policy only decides how long a worker idles. It never adds, drops or reorders a
/// protocol read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpinPolicy {
    /// Pure busy-wait with a CPU spin hint.
    Spin,
    /// Give the rest of the time slice back to the OS.
    Yield,
    /// Exponential spinning that falls back to yielding.
    #[default]
    Backoff,
    /// Sleep for a fixed duration.
    Sleep(Duration),
}

impl fmt::Display for SpinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpinPolicy::Spin => write!(f, "spin"),
            SpinPolicy::Yield => write!(f, "yield"),
            SpinPolicy::Backoff => write!(f, "backoff"),
            SpinPolicy::Sleep(duration) if duration.subsec_nanos() % 1_000 == 0 => {
                write!(f, "sleep:{}", duration.as_micros())
            }
            SpinPolicy::Sleep(duration) => write!(f, "sleep:{}ns", duration.as_nanos()),
        }
    }
}

/// Parses `spin`, `yield`, `backoff`, `sleep` (100us), `sleep:<micros>` or
/// `sleep:<nanos>ns`.
impl FromStr for SpinPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spin" => Ok(SpinPolicy::Spin),
            "yield" => Ok(SpinPolicy::Yield),
            "backoff" => Ok(SpinPolicy::Backoff),
            "sleep" => Ok(SpinPolicy::Sleep(Duration::from_micros(100))),
            _ => match s.strip_prefix("sleep:") {
                Some(amount) => {
                    let duration = match amount.strip_suffix("ns") {
                        Some(nanos) => nanos.parse().map(Duration::from_nanos),
                        None => amount.parse().map(Duration::from_micros),
                    };

                    duration
                        .map(SpinPolicy::Sleep)
                        .map_err(|e| format!("invalid sleep duration {:?}: {}", amount, e))
                }
                None => Err(format!("unknown spin policy {:?}", s)),
            },
        }
    }
}

/// Per-call idle state for one retry loop.
pub(crate) struct Spinner {
    policy: SpinPolicy,
    backoff: Backoff,
    deadline: Option<Instant>,
}

impl Spinner {
    pub(crate) fn new(policy: SpinPolicy, deadline: Option<Instant>) -> Self {
        Self {
            policy,
            backoff: Backoff::new(),
            deadline,
        }
    }

    pub(crate) fn expired(&self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    #[inline]
    pub(crate) fn idle(&self) {
        match self.policy {
            SpinPolicy::Spin => hint::spin_loop(),
            SpinPolicy::Yield => thread::yield_now(),
            SpinPolicy::Backoff => self.backoff.snooze(),
            SpinPolicy::Sleep(duration) => thread::sleep(duration),
        }
    }
}
