// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! `log` backend shared by the pxapi binaries.
//!
//! Lines use the agent format:
//!
//! ```text
//! 2026-01-02 03:04:05 UTC | PXCTL | INFO | (src/value.rs:42 in pxapi::value) | message
//! ```

// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use log::{LevelFilter, Log, Metadata, Record};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LevelFilter,
    /// Short upper-case tag identifying the emitting program.
    pub component: String,
    /// Append to this file instead of writing to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            component: "PXAPI".to_string(),
            file: None,
        }
    }
}

impl LogConfig {
    pub fn new(component: &str, level: &str) -> Result<Self, InitError> {
        Ok(Self {
            level: parse_level(level)?,
            component: component.to_uppercase(),
            file: None,
        })
    }
}

#[derive(Error, Debug)]
pub enum InitError {
    #[error("invalid log level: {0}")]
    InvalidLevel(String),
    #[error("failed to open log file: {0}")]
    Io(#[source] io::Error),
    #[error("logger already initialized: {0}")]
    AlreadyInitialized(#[source] log::SetLoggerError),
}

/// Parse `trace|debug|info|warn|error|off`, case-insensitive.
pub fn parse_level(level: &str) -> Result<LevelFilter, InitError> {
    LevelFilter::from_str(level.trim()).map_err(|_| InitError::InvalidLevel(level.to_string()))
}

enum Sink {
    Stderr,
    File(File),
}

pub struct AgentLogger {
    component: String,
    level: LevelFilter,
    sink: Mutex<Sink>,
}

impl AgentLogger {
    pub fn new(config: &LogConfig) -> Result<Self, InitError> {
        let sink = match &config.file {
            Some(path) => Sink::File(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(InitError::Io)?,
            ),
            None => Sink::Stderr,
        };
        Ok(Self {
            component: config.component.clone(),
            level: config.level,
            sink: Mutex::new(sink),
        })
    }
}

impl Log for AgentLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(&self.component, record, OffsetDateTime::now_utc());
        // A poisoned sink only means another thread panicked mid-write.
        let mut sink = match self.sink.lock() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        let _ = match &mut *sink {
            Sink::Stderr => writeln!(io::stderr().lock(), "{line}"),
            Sink::File(file) => writeln!(file, "{line}"),
        };
    }

    fn flush(&self) {
        if let Ok(mut sink) = self.sink.lock() {
            let _ = match &mut *sink {
                Sink::Stderr => io::stderr().flush(),
                Sink::File(file) => file.flush(),
            };
        }
    }
}

pub fn format_line(component: &str, record: &Record, now: OffsetDateTime) -> String {
    let timestamp = now
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| now.unix_timestamp().to_string());
    let location = match (record.file(), record.line()) {
        (Some(file), Some(line)) => format!("{file}:{line}"),
        (Some(file), None) => file.to_string(),
        _ => record.target().to_string(),
    };
    let module = record.module_path().unwrap_or_else(|| record.target());
    format!(
        "{timestamp} UTC | {component} | {} | ({location} in {module}) | {}",
        record.level(),
        record.args()
    )
}

/// Install the global logger. Can only succeed once per process.
pub fn init(config: &LogConfig) -> Result<(), InitError> {
    let logger = AgentLogger::new(config)?;
    log::set_boxed_logger(Box::new(logger)).map_err(InitError::AlreadyInitialized)?;
    log::set_max_level(config.level);
    Ok(())
}
