use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use simplelog::{CombinedLogger, Config, LevelFilter, SharedLogger, SimpleLogger, WriteLogger};

/// Logs to the console and, if given, to `log_file`.
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(SimpleLogger::new(level, Config::default()));
    if let Some(path) = log_file {
        let file = File::create(path).with_context(|| format!("creating log file {:?}", path))?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }

    CombinedLogger::init(loggers).with_context(|| "configuring logging")
}
