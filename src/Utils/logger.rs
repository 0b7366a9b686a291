//! Logger set-up shared by the demo binary and by hosts embedding the plotter.
use chrono::Local;
use log::info;
use simplelog::*;
use std::fs::File;

use crate::graphing::error::{PlotError, Result};

/// Maps a loglevel string to a filter; `None` means "info".
pub fn level_filter(loglevel: Option<&str>) -> Result<LevelFilter> {
    let Some(level) = loglevel else {
        return Ok(LevelFilter::Info);
    };
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(LevelFilter::Trace),
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        "off" | "none" => Ok(LevelFilter::Off),
        other => Err(PlotError::Config(format!(
            "loglevel must be debug, info, warn, error or off, got `{}`",
            other
        ))),
    }
}

/// Installs a terminal logger and, with `log_to_file`, a copy into `log_<date>.txt`.
///
/// Returns `Ok(false)` when a logger was already installed; the existing one is kept.
pub fn init_logger(loglevel: Option<&str>, log_to_file: bool) -> Result<bool> {
    let log_option = level_filter(loglevel)?;
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if log_to_file {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("log_{}.txt", date_and_time);
        let file = File::create(&name)
            .map_err(|e| PlotError::Config(format!("cannot create log file {}: {}", name, e)))?;
        loggers.push(WriteLogger::new(log_option, Config::default(), file));
    }
    match CombinedLogger::init(loggers) {
        Ok(()) => {
            info!("logger started with loglevel {}", log_option);
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}
