//! # Error Types
//!
//! Structured error handling for request processing using thiserror.
//!
//! Processors never surface these to their caller. Every error a processor
//! runs into is reported through the log and through the request's response,
//! both tagged with the request id and the failing operation.

use crate::request::{Action, Request};
use thiserror::Error;

/// A service or subscriber name contains characters outside the accepted set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid subscriber name: {0}. Accept characters: a-z, A-Z, 0-9, -, _ or .")]
    InvalidSubscriber(String),

    #[error("invalid service name: {0}. Accept characters: a-z, A-Z, 0-9, -, _ or .")]
    InvalidService(String),
}

impl ValidationError {
    /// The offending name
    pub fn name(&self) -> &str {
        match self {
            ValidationError::InvalidSubscriber(name) | ValidationError::InvalidService(name) => {
                name
            }
        }
    }
}

/// Errors returned by a persistence backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("no push service provider in service {service} accepts delivery point {delivery_point}")]
    NoMatchingProvider {
        service: String,
        delivery_point: String,
    },

    #[error("not found: {0}")]
    NotFound(String),
}

/// Everything that can make a single request fail
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Rendered with the `DatabaseError` prefix existing log consumers key on
    #[error("DatabaseError {0}")]
    Persistence(#[from] PersistenceError),

    /// The backend accepted the call but returned nothing usable
    #[error("DatabaseError no push service provider returned")]
    EmptyResult,

    #[error("{0}")]
    MalformedRequest(String),

    #[error("missing push service provider")]
    MissingProvider,

    #[error("no processor registered for action {}", .0.name())]
    NoProcessor(Action),
}

/// Configuration and construction errors
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("invalid name pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("invalid configuration value {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Errors handing requests to the dispatcher
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The dispatcher stopped; the request is handed back unprocessed
    #[error("request dispatcher has shut down")]
    Closed(Box<Request>),

    /// The request was accepted but dropped before it finished
    #[error("request {0} was dropped before it finished")]
    Abandoned(String),
}

/// A request was dropped without ever being finished
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("request was dropped before it finished")]
pub struct RequestAbandoned;

pub type Result<T> = std::result::Result<T, ConfigurationError>;
