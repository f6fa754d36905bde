//! # Configuration
//!
//! Settings for logging and request dispatch. Values come from built-in
//! defaults, then an optional config file, then `PUSH_CORE__*` environment
//! variables (e.g. `PUSH_CORE__DISPATCHER__WORKER_COUNT=16`).
//!
//! ```rust,no_run
//! use push_request_core::config::PushCoreConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PushCoreConfig::load(Some("config/push-core.toml".as_ref()))?;
//! let workers = config.dispatcher.worker_count;
//! # Ok(())
//! # }
//! ```

pub mod loader;

use crate::error::{ConfigurationError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::Semaphore;

pub use loader::detect_environment;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PushCoreConfig {
    /// Deployment environment (development, test, production, ...)
    pub environment: String,

    pub logging: LoggingConfig,

    pub dispatcher: DispatcherConfig,
}

impl Default for PushCoreConfig {
    fn default() -> Self {
        Self {
            environment: detect_environment(),
            logging: LoggingConfig::default(),
            dispatcher: DispatcherConfig::default(),
        }
    }
}

impl PushCoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.environment.is_empty() {
            return Err(invalid("environment", "must not be empty"));
        }
        self.dispatcher.validate()
    }
}

/// Structured logging output
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; derived from the environment when unset
    pub level: Option<String>,

    /// Directory for JSON log files; console only when unset
    pub directory: Option<PathBuf>,

    pub ansi: bool,
}

/// Request dispatch and worker pool
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Maximum requests processed concurrently
    pub worker_count: usize,

    /// Pending requests buffered before `submit` waits
    pub queue_capacity: usize,

    /// Route push requests to the action printer when no push processor is installed
    pub action_printer_for_push: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            worker_count: 8,
            queue_capacity: 1024,
            action_printer_for_push: true,
        }
    }
}

impl DispatcherConfig {
    /// Both sizes back tokio semaphores, so they must fit in `1..=Semaphore::MAX_PERMITS`
    pub fn validate(&self) -> Result<()> {
        check_permits("dispatcher.worker_count", self.worker_count)?;
        check_permits("dispatcher.queue_capacity", self.queue_capacity)
    }
}

fn check_permits(field: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(invalid(field, "must be greater than 0"));
    }
    if value > Semaphore::MAX_PERMITS {
        return Err(invalid(field, format!("must be at most {}", Semaphore::MAX_PERMITS)));
    }
    Ok(())
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigurationError {
    ConfigurationError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}
