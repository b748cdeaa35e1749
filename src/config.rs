use crate::error::{Error, Result};
use crate::types::ControlVector;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Supplied once at startup and never changed afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    pub host: String,
    pub port: u16,
    pub dataset_path: PathBuf,
    /// Unset means the OS connect timeout applies.
    pub connect_timeout_ms: Option<u64>,
    /// Upper bound on waiting for the worker to exit on stop.
    pub shutdown_timeout_ms: u64,
    pub tick_ms: u64,
    /// Live control vector before any sample is chosen. All zeros if unset.
    pub initial_control: Option<ControlVector>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 65432,
            dataset_path: PathBuf::from("dataset.csv"),
            connect_timeout_ms: None,
            shutdown_timeout_ms: 500,
            tick_ms: 16,
            initial_control: None,
        }
    }
}

impl ControllerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Count of `-v` flags to a log level, starting from warnings only.
pub fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
