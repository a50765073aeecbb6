mod scenario;
mod strategy;
mod stress;

use clap::{Parser, Subcommand};
use log::LevelFilter;

/// Tools for exercising the low-level monitor on this machine.
#[derive(Parser)]
#[command(name = "monitor-dev", version, author = "Wenyu Zhao")]
struct Opts {
    /// Log level for the stderr logger.
    #[arg(long, global = true, default_value = "info")]
    log_level: LevelFilter,
    #[command(subcommand)]
    sub_command: SubCommand,
}

#[derive(Subcommand)]
enum SubCommand {
    /// Show the detected timeout strategy
    #[command(name = "strategy")]
    Strategy(strategy::Strategy),
    /// Wake a timed waiter from a second thread
    #[command(name = "signal")]
    Signal(scenario::Signal),
    /// Let a timed wait run out
    #[command(name = "timeout")]
    Timeout(scenario::Timeout),
    /// Hammer acquire/release from many threads
    #[command(name = "stress")]
    Stress(stress::Stress),
}

fn main() -> anyhow::Result<()> {
    let opts: Opts = Opts::parse();
    logger::init(opts.log_level).map_err(|e| anyhow::anyhow!("{}", e))?;
    match opts.sub_command {
        SubCommand::Strategy(t) => t.run(),
        SubCommand::Signal(t) => t.run(),
        SubCommand::Timeout(t) => t.run(),
        SubCommand::Stress(t) => t.run(),
    }
}
