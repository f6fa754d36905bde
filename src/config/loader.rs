//! Configuration Loader
//!
//! Environment detection and layered loading through the `config` crate.

use super::PushCoreConfig;
use crate::error::Result;
use ::config::{Config, Environment, File};
use std::env;
use std::path::Path;
use tracing::debug;

/// Prefix for environment overrides, `PUSH_CORE__<SECTION>__<KEY>`
pub const ENV_PREFIX: &str = "PUSH_CORE";

impl PushCoreConfig {
    /// Load configuration from an optional file plus environment overrides, then validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: PushCoreConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            environment = %config.environment,
            worker_count = config.dispatcher.worker_count,
            queue_capacity = config.dispatcher.queue_capacity,
            source = ?path,
            "Configuration loaded"
        );
        Ok(config)
    }
}

/// Current environment from `PUSH_CORE_ENV`, falling back to `APP_ENV`
pub fn detect_environment() -> String {
    env::var("PUSH_CORE_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
        .to_lowercase()
}
