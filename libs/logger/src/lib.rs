use std::io::{self, Write};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

pub const IS_ENABLED: bool = cfg!(not(feature = "disable"));

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        IS_ENABLED
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{}", format_record(record.level(), record.target(), record.args()));
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

fn format_record(level: Level, target: &str, args: &std::fmt::Arguments) -> String {
    format!("[{}] {}: {}", level, target, args)
}

/// Installs the stderr sink. Only the first call in a process succeeds.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(if IS_ENABLED { level } else { LevelFilter::Off });
    Ok(())
}
