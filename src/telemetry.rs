use std::{
    fs::{File, OpenOptions},
    sync::Mutex,
};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Keeps the log file open for the life of the process and syncs it to disk on drop.
pub struct LogGuard {
    file: Option<File>,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            let _ = file.sync_all();
        }
    }
}

/// Installs the global subscriber. Hold the returned guard until shutdown.
pub fn init(config: &LogConfig) -> anyhow::Result<LogGuard> {
    let filter = EnvFilter::try_new(&config.filter)
        .with_context(|| format!("invalid log filter {:?}", config.filter))?;

    let Some(path) = &config.file else {
        if config.json {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .json()
                .init();
        } else {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
        return Ok(LogGuard { file: None });
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let writer = file
        .try_clone()
        .with_context(|| format!("duplicate log file handle {}", path.display()))?;
    let writer = Mutex::new(writer);

    if config.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .json()
            .with_writer(writer)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(writer)
            .init();
    }
    Ok(LogGuard { file: Some(file) })
}
