//! Input validation for request names
//!
//! Service and subscriber names are free-form strings supplied by callers.
//! Both must be made of ASCII letters, digits, `.`, `_` and `-` before any
//! request is allowed to touch the persistence backend.

use crate::error::{ConfigurationError, Result, ValidationError};
use crate::request::Request;
use regex::Regex;

/// Pattern accepted for both service and subscriber names
pub const DEFAULT_NAME_PATTERN: &str = r"^[a-zA-Z0-9._-]+$";

/// Compiled name patterns, shared read-only by a processor's invocations
#[derive(Debug, Clone)]
pub struct RequestValidator {
    valid_subscriber_pattern: Regex,
    valid_service_pattern: Regex,
}

impl RequestValidator {
    pub fn new() -> Result<Self> {
        Self::with_patterns(DEFAULT_NAME_PATTERN, DEFAULT_NAME_PATTERN)
    }

    /// Build a validator from explicit patterns, failing if either does not compile
    pub fn with_patterns(service_pattern: &str, subscriber_pattern: &str) -> Result<Self> {
        Ok(Self {
            valid_subscriber_pattern: compile(subscriber_pattern)?,
            valid_service_pattern: compile(service_pattern)?,
        })
    }

    /// Subscribers are checked in order before the service; an empty list passes.
    pub fn validate<S: AsRef<str>>(
        &self,
        service: &str,
        subscribers: &[S],
    ) -> std::result::Result<(), ValidationError> {
        if let Some(invalid) = subscribers
            .iter()
            .map(AsRef::as_ref)
            .find(|sub| !self.valid_subscriber_pattern.is_match(sub))
        {
            return Err(ValidationError::InvalidSubscriber(invalid.to_string()));
        }

        if !self.valid_service_pattern.is_match(service) {
            return Err(ValidationError::InvalidService(service.to_string()));
        }

        Ok(())
    }

    pub fn validate_request(&self, request: &Request) -> std::result::Result<(), ValidationError> {
        self.validate(&request.service, request.subscribers.as_slice())
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| ConfigurationError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
