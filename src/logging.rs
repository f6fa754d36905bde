//! # Structured Logging Module
//!
//! Two pieces live here:
//!
//! - [`ProcessorLogger`], the logging capability injected into every request
//!   processor. [`TracingLogger`] is the production implementation and forwards
//!   to `tracing`.
//! - [`init_structured_logging`], environment-aware subscriber setup with
//!   console output and optional JSON file output.

use crate::config::LoggingConfig;
use chrono::Utc;
use std::fmt;
use std::fs;
use std::process;
use std::sync::OnceLock;
use tracing::Level;
use tracing_subscriber::{
    fmt as fmt_layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Logging capability used by request processors. Logging never fails the caller.
pub trait ProcessorLogger: Send + Sync {
    fn log(&self, level: Level, args: fmt::Arguments<'_>);

    fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::DEBUG, args);
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::INFO, args);
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::WARN, args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::ERROR, args);
    }
}

/// Forwards processor log lines to `tracing`, tagged with a component name
#[derive(Debug, Clone)]
pub struct TracingLogger {
    component: String,
}

impl TracingLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new("request_processor")
    }
}

impl ProcessorLogger for TracingLogger {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let component = self.component.as_str();
        match level {
            Level::ERROR => tracing::error!(component, "{}", args),
            Level::WARN => tracing::warn!(component, "{}", args),
            Level::INFO => tracing::info!(component, "{}", args),
            Level::DEBUG => tracing::debug!(component, "{}", args),
            _ => tracing::trace!(component, "{}", args),
        }
    }
}

/// Initialize structured logging. Later calls are no-ops, and an already
/// installed global subscriber is kept.
pub fn init_structured_logging(config: &LoggingConfig, environment: &str) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let log_level = config
            .level
            .clone()
            .unwrap_or_else(|| default_log_level(environment).to_string());
        let pid = process::id();

        let console = fmt_layer::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_level(true)
            .with_ansi(config.ansi)
            .with_filter(EnvFilter::new(&log_level));

        let mut log_file = None;
        let file = config.directory.as_ref().and_then(|log_dir| {
            if let Err(e) = fs::create_dir_all(log_dir) {
                eprintln!("Failed to create log directory {}: {e}", log_dir.display());
                return None;
            }

            let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
            let file_name = format!("{environment}.{pid}.{timestamp}.log");
            log_file = Some(log_dir.join(&file_name));

            let appender = tracing_appender::rolling::never(log_dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            // The writer must outlive every log call for the rest of the process
            std::mem::forget(guard);

            Some(
                fmt_layer::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_level(true)
                    .with_ansi(false)
                    .json()
                    .with_filter(EnvFilter::new(&log_level)),
            )
        });

        let subscriber = tracing_subscriber::registry().with(console).with(file);
        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::info!(
            pid,
            environment,
            level = %log_level,
            log_file = ?log_file,
            "Structured logging initialized"
        );
    });
}

/// Get log level based on environment
pub fn default_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}
