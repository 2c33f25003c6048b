//! file: cli/src/logger.rs
//! description: `log` backend writing styled lines to stderr.

use console::Style;
use log::{Level, LevelFilter, Log, Metadata, Record};

pub const ENV_LOG: &str = "SIL2CAST_LOG";

struct ConsoleLogger {
    level: LevelFilter,
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let style = match record.level() {
            Level::Error => Style::new().red().bold(),
            Level::Warn => Style::new().yellow(),
            Level::Info => Style::new().cyan(),
            Level::Debug | Level::Trace => Style::new().dim(),
        };
        let tag = format!("[{:<5}]", record.level());
        eprintln!("{} {}", style.apply_to(tag), record.args());
    }

    fn flush(&self) {}
}

/// Picks the level from `-v` occurrences, falling back to `SIL2CAST_LOG`.
pub fn level_from(verbosity: u8, env: Option<String>) -> LevelFilter {
    match verbosity {
        0 => env
            .and_then(|v| v.trim().parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Warn),
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the logger. A second call keeps the first logger.
pub fn init(level: LevelFilter) {
    if log::set_boxed_logger(Box::new(ConsoleLogger { level })).is_ok() {
        log::set_max_level(level);
    }
}
