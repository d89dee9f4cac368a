//! Run a door lock under contention and report what the workers saw.
//!
//! `cargo run --features cli --bin doors -- --protocol dijkstra --workers 4 --rounds 10`

use std::time::Duration;

use clap::{Parser, ValueEnum};
use doorlock::{DijkstraLock, Harness, HymanLock, RawDoorLock, SpinPolicy};
use log::{error, info};

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Protocol {
    Dijkstra,
    Hyman,
}

#[derive(Parser, Debug)]
#[command(name = "doors")]
#[command(about = "Mutual exclusion from shared reads and writes")]
struct Args {
    #[arg(short, long, value_enum, default_value_t = Protocol::Dijkstra)]
    protocol: Protocol,

    /// Number of workers (Hyman supports exactly 2)
    #[arg(short, long, default_value_t = 3)]
    workers: usize,

    /// Entries per worker
    #[arg(short, long, default_value_t = 1)]
    rounds: usize,

    /// Time spent inside the critical section, in milliseconds
    #[arg(long, default_value_t = 0)]
    hold_ms: u64,

    /// Upper bound of the random pause before each attempt, in milliseconds
    #[arg(long, default_value_t = 0)]
    jitter_ms: u64,

    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// spin, yield, backoff, sleep, sleep:<micros> or sleep:<nanos>ns
    #[arg(long, default_value_t = SpinPolicy::Backoff)]
    spin: SpinPolicy,

    /// Log every entry and exit
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Trace
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let lock: Box<dyn RawDoorLock> = match args.protocol {
        Protocol::Dijkstra => Box::new(DijkstraLock::with_policy(args.workers, args.spin)?),
        Protocol::Hyman => Box::new(HymanLock::with_policy(args.workers, args.spin)?),
    };
    info!("{:?} lock with {} workers, {} spin", args.protocol, args.workers, args.spin);

    let harness = Harness::new(args.workers)
        .rounds(args.rounds)
        .hold(Duration::from_millis(args.hold_ms))
        .jitter(Duration::from_millis(args.jitter_ms))
        .timeout(Duration::from_secs(args.timeout_secs));

    let report = harness.run(lock.as_ref())?;
    println!("{}", report);

    for (first, second) in report.overlaps() {
        error!(
            "worker {} (round {}) and worker {} (round {}) were inside together",
            first.worker_id, first.round, second.worker_id, second.round
        );
    }
    report.check()?;

    Ok(())
}
