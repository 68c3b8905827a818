use chrono::Local;
use log::{LevelFilter, Metadata, Record};
use once_cell::sync::OnceCell;
use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use crate::error::{Result, VestigeError};

#[derive(Debug)]
struct FileLogger {
    log_path: PathBuf,
    level: LevelFilter,
}

static LOGGER: OnceCell<FileLogger> = OnceCell::new();

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let log_entry = format!(
                "{} {} Vestige of Yimyar | {} - {}\n",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            );
            let log_file = self.log_path.join("log.txt");

            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_file) {
                let _ = file.write_all(log_entry.as_bytes());
            }
        }
    }

    fn flush(&self) {}
}

// Default log directory: ~/vestige/data
pub fn default_log_dir() -> Result<PathBuf> {
    let home = dir::home_dir().ok_or_else(|| {
        VestigeError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "home directory not found",
        ))
    })?;
    Ok(home.join("vestige").join("data"))
}

// Install the file logger. `debug` raises verbosity from Info to Debug.
pub fn init(log_path: PathBuf, debug: bool) -> Result<()> {
    create_dir_all(&log_path)?;
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let logger = LOGGER.get_or_init(|| FileLogger { log_path, level });
    log::set_logger(logger)?;
    log::set_max_level(logger.level);
    Ok(())
}
