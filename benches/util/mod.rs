use std::time::{Duration, Instant};

use criterion::{black_box, measurement::WallTime, BenchmarkGroup};
use crossbeam_utils::thread;
use doorlock::{RawDoorLock, Worker};

pub fn get_test_thread_nums() -> Vec<usize> {
    let mut nums = Vec::new();
    let logical_cores = num_cpus::get();

    let mut num = 1;

    while num <= logical_cores {
        nums.push(num);
        num *= 2;
    }

    if *nums.last().unwrap() != logical_cores {
        nums.push(logical_cores);
    }

    nums
}

pub fn bench_contended_lock<L>(
    make: impl Fn(usize) -> L,
    per_ops: usize,
    thread_num: usize,
    c: &mut BenchmarkGroup<WallTime>,
) where
    L: RawDoorLock,
{
    c.bench_function(&format!("{} threads", thread_num), |b| {
        b.iter_custom(|iters| {
            let lock = make(thread_num);

            let mut duration = Duration::ZERO;
            for _ in 0..iters {
                let batched_time = thread::scope(|s| {
                    let mut threads = Vec::new();

                    for id in 0..thread_num {
                        let lock = &lock;
                        let t = s.spawn(move |_| {
                            let worker = Worker::new(id);

                            let start = Instant::now();
                            for _ in 0..per_ops {
                                worker.run(lock, || black_box(id)).unwrap();
                            }
                            start.elapsed()
                        });

                        threads.push(t);
                    }

                    threads
                        .into_iter()
                        .map(|h| h.join().unwrap())
                        .sum::<Duration>()
                })
                .unwrap();

                duration += batched_time
            }

            // avg thread time
            duration / (thread_num as u32)
        });
    });
}
