use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Barrier,
    },
    thread,
    time::Duration,
};

use doorlock::{
    harness::Recorder,
    lock::PausePoint,
    HymanLock, LockError, RawDoorLock, SpinPolicy, Worker,
};

use crate::util::lock::*;

#[test]
fn test_hyman_self_exclusion() {
    test_self_exclusion(HymanLock::new(2).unwrap());
}

#[test]
fn test_hyman_only_two_workers() {
    assert_eq!(
        HymanLock::with_policy(3, SpinPolicy::Spin).err(),
        Some(LockError::UnsupportedWorkers {
            workers: 3,
            supported: 2
        })
    );

    let lock = HymanLock::new(2).unwrap();
    assert!(lock.acquire(2).is_err());
    assert!(lock.state().is_quiescent());
}

/// 1. worker 1 raises its flag, sees `turn == 0` and flag 0 down, and stops before
///    writing `turn`;
/// 2. worker 0 raises its flag, sees `turn == 0` and walks in;
/// 3. worker 1 writes `turn = 1`, re-reads it and walks in as well.
#[test]
fn test_hyman_violation() {
    let reached = Barrier::new(2);
    let resume = Barrier::new(2);
    let inside = Barrier::new(2);
    let paused = AtomicBool::new(false);
    let raised = [AtomicBool::new(false), AtomicBool::new(false)];

    let hook = |id: usize, point: PausePoint| {
        if point == PausePoint::FlagRaised {
            raised[id].store(true, Ordering::SeqCst);
        }
        if id == 1 && point == PausePoint::ClaimTurn && !paused.swap(true, Ordering::SeqCst) {
            reached.wait();
            resume.wait();
        }
    };

    let lock = HymanLock::with_hook(2, SpinPolicy::Yield, hook).unwrap();
    let recorder = Recorder::new();

    thread::scope(|scope| {
        scope.spawn(|| {
            Worker::new(1)
                .run_recorded(&lock, &recorder, 0, None, || {
                    inside.wait();
                })
                .unwrap()
        });

        scope.spawn(|| {
            reached.wait();
            Worker::new(0)
                .run_recorded(&lock, &recorder, 0, None, || {
                    resume.wait();
                    inside.wait();
                })
                .unwrap()
        });
    });

    // both acquire calls returned and both workers were inside together
    let intervals = recorder.intervals();
    assert_eq!(intervals.len(), 2);
    assert!(intervals[0].overlaps(&intervals[1]));
    assert_eq!(recorder.peak(), 2);
    assert_eq!(lock.state().turn(), 1);
    assert!(lock.state().is_quiescent());
    assert!(raised.iter().all(|raised| raised.load(Ordering::SeqCst)));
}

#[test]
fn test_hyman_alternating() {
    let lock = HymanLock::new(2).unwrap();
    let recorder = Recorder::new();

    for round in 0..10 {
        for id in 0..2 {
            Worker::new(id)
                .run_recorded(&lock, &recorder, round, None, || {
                    thread::sleep(Duration::from_micros(10))
                })
                .unwrap();
        }
    }

    let intervals = recorder.intervals();
    assert_eq!(intervals.len(), 20);
    assert_eq!(recorder.peak(), 1);
    assert_eq!(lock.state().turn(), 1);
}
