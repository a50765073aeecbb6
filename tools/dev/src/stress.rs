use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Instant,
};

use anyhow::ensure;
use clap::Args;
use monitor::LowLevelMonitor;

#[derive(Args)]
pub struct Stress {
    #[arg(long, default_value_t = 8)]
    threads: usize,
    #[arg(long, default_value_t = 100_000)]
    iterations: usize,
}

impl Stress {
    pub fn run(&self) -> anyhow::Result<()> {
        let monitor = LowLevelMonitor::new()?;
        let inside = AtomicUsize::new(0);
        let overlaps = AtomicUsize::new(0);
        let start = Instant::now();
        crossbeam::scope(|s| {
            for _ in 0..self.threads {
                s.spawn(|_| {
                    for _ in 0..self.iterations {
                        monitor.acquire();
                        if inside.fetch_add(1, Ordering::SeqCst) != 0 {
                            overlaps.fetch_add(1, Ordering::SeqCst);
                        }
                        inside.fetch_sub(1, Ordering::SeqCst);
                        monitor.release();
                    }
                });
            }
        })
        .map_err(|_| anyhow::anyhow!("a stress thread panicked"))?;
        let elapsed = start.elapsed();
        let overlaps = overlaps.load(Ordering::SeqCst);
        ensure!(overlaps == 0, "{} overlapping critical sections", overlaps);
        println!(
            "{} threads x {} iterations in {:?} on cpu {:?}",
            self.threads,
            self.iterations,
            elapsed,
            threading::current_cpu()
        );
        Ok(())
    }
}
