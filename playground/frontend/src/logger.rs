//! `log` records go to the browser console.

use lca::zoon::{eprintln, println};
use log::{Level, LevelFilter, Log, Metadata, Record};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            Level::Error | Level::Warn => {
                eprintln!("[{}] {}: {}", record.level(), record.target(), record.args())
            }
            _ => println!("[{}] {}: {}", record.level(), record.target(), record.args()),
        }
    }

    fn flush(&self) {}
}

pub fn init() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(error) = log::set_logger(&LOGGER) {
        eprintln!("Failed to install logger: {error}");
        return;
    }
    log::set_max_level(level);
}
