//! # Push Domain References
//!
//! The provider and delivery point references carried by requests. Processors
//! only care about their identity; the push service type lets a backend pair a
//! delivery point with a provider of the same push network.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Credentials and configuration for sending through one external push network
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PushServiceProvider {
    name: String,
    push_service_type: String,
    #[serde(default)]
    pub fixed_data: BTreeMap<String, String>,
}

impl PushServiceProvider {
    pub fn new(name: impl Into<String>, push_service_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            push_service_type: push_service_type.into(),
            fixed_data: BTreeMap::new(),
        }
    }

    /// Attach a fixed configuration value, e.g. an API key
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fixed_data.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn push_service_type(&self) -> &str {
        &self.push_service_type
    }
}

impl fmt::Display for PushServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A device or endpoint address able to receive a push notification
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryPoint {
    name: String,
    push_service_type: String,
    #[serde(default)]
    pub fixed_data: BTreeMap<String, String>,
}

impl DeliveryPoint {
    pub fn new(name: impl Into<String>, push_service_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            push_service_type: push_service_type.into(),
            fixed_data: BTreeMap::new(),
        }
    }

    /// Attach a fixed addressing value, e.g. a device token
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fixed_data.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn push_service_type(&self) -> &str {
        &self.push_service_type
    }
}

impl fmt::Display for DeliveryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
