use clap::Args;
use monitor::{TimeoutStrategy, ALL_STRATEGIES};

#[derive(Args)]
pub struct Strategy {}

impl Strategy {
    pub fn run(&self) -> anyhow::Result<()> {
        let detected = TimeoutStrategy::detect();
        println!("detected: {}", detected);
        for strategy in ALL_STRATEGIES {
            let mark = if strategy == detected { "*" } else { " " };
            let support = if strategy.is_supported() {
                "supported"
            } else {
                "unavailable"
            };
            println!("{} {:<20} {}", mark, strategy.name(), support);
        }
        Ok(())
    }
}

/// The strategy named on the command line, or the detected one.
pub fn pick(strategy: Option<TimeoutStrategy>) -> TimeoutStrategy {
    strategy.unwrap_or_else(TimeoutStrategy::detect)
}
