//! Minimal `log` backend.
//!
//! The terminal UI owns the screen, so interactive sessions log to a file in
//! the data directory. One-shot modes log to stderr.

use anyhow::{Context, Result};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

pub const LOG_FILE_NAME: &str = "gridfill.log";

enum Sink {
    File(File),
    Stderr,
}

struct Logger {
    level: LevelFilter,
    sink: Mutex<Sink>,
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("{} {}: {}\n", record.level(), record.target(), record.args());
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };
        // Nowhere left to report a failed log write.
        let _ = match &mut *sink {
            Sink::File(file) => file.write_all(line.as_bytes()),
            Sink::Stderr => io::stderr().write_all(line.as_bytes()),
        };
    }

    fn flush(&self) {
        if let Ok(mut sink) = self.sink.lock() {
            let _ = match &mut *sink {
                Sink::File(file) => file.flush(),
                Sink::Stderr => io::stderr().flush(),
            };
        }
    }
}

fn install(level: LevelFilter, sink: Sink) -> Result<()> {
    let logger = Box::leak(Box::new(Logger {
        level,
        sink: Mutex::new(sink),
    }));
    log::set_logger(logger).context("logger already installed")?;
    log::set_max_level(level);
    Ok(())
}

/// Append to `<dir>/gridfill.log`, creating the directory if needed.
pub fn init_file(dir: &Path, level: LevelFilter) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    install(level, Sink::File(file))
}

pub fn init_stderr(level: LevelFilter) -> Result<()> {
    install(level, Sink::Stderr)
}
