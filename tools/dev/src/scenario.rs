use std::{sync::Arc, thread, time::Duration, time::Instant};

use anyhow::Context;
use clap::Args;
use monitor::TimeoutStrategy;
use sync::Monitor;

use crate::strategy::pick;

#[derive(Args)]
pub struct Signal {
    /// Timeout strategy to build the monitor with.
    #[arg(long)]
    strategy: Option<TimeoutStrategy>,
    /// Delay before the second thread signals.
    #[arg(long, default_value_t = 50)]
    delay_ms: u64,
    /// Timeout of the waiting thread.
    #[arg(long, default_value_t = 5_000)]
    timeout_ms: u32,
}

impl Signal {
    pub fn run(&self) -> anyhow::Result<()> {
        let strategy = pick(self.strategy);
        let monitor = Arc::new(Monitor::with_strategy((), strategy)?);
        let guard = monitor.lock();
        {
            let monitor = monitor.clone();
            let delay = Duration::from_millis(self.delay_ms);
            threading::spawn_detached(0, move || {
                thread::sleep(delay);
                let guard = monitor.lock();
                monitor.signal_and_unlock(guard);
            })
            .context("starting the signaling thread")?;
        }
        let start = Instant::now();
        let (guard, signaled) = monitor.wait_timeout(guard, self.timeout_ms);
        let elapsed = start.elapsed();
        drop(guard);
        println!(
            "{}: signaled={} after {:?} (signal at {} ms, timeout {} ms)",
            strategy, signaled, elapsed, self.delay_ms, self.timeout_ms
        );
        Ok(())
    }
}

#[derive(Args)]
pub struct Timeout {
    /// Timeout strategy to build the monitor with.
    #[arg(long)]
    strategy: Option<TimeoutStrategy>,
    #[arg(long, default_value_t = 200)]
    timeout_ms: u32,
}

impl Timeout {
    pub fn run(&self) -> anyhow::Result<()> {
        let strategy = pick(self.strategy);
        let monitor = Monitor::with_strategy((), strategy)?;
        let guard = monitor.lock();
        let start = Instant::now();
        let (guard, signaled) = monitor.wait_timeout(guard, self.timeout_ms);
        let elapsed = start.elapsed();
        drop(guard);
        println!(
            "{}: signaled={} after {:?} (timeout {} ms)",
            strategy, signaled, elapsed, self.timeout_ms
        );
        Ok(())
    }
}
