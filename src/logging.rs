//! Minimal `log::Log` sink: timestamped lines to stderr, installed once at
//! process startup. Nothing in the renderer reads its own log output back.

use log::{Level, Log, Metadata, Record};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let secs = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
        eprintln!("[{secs}] {} {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

static INSTALLED: AtomicUsize = AtomicUsize::new(0);

/// Install the stderr sink as the global logger. Safe to call more than
/// once; only the first call takes effect.
pub fn init() {
    if INSTALLED.swap(1, Ordering::SeqCst) == 0 {
        log::set_boxed_logger(Box::new(StderrLogger))
            .map(|()| log::set_max_level(log::LevelFilter::Info))
            .expect("logger already installed");
    }
}
