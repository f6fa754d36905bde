#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Push Request Core
//!
//! Request-processing layer of a push-notification backend.
//!
//! ## Overview
//!
//! Administrative and subscription requests (register or remove a push
//! service provider for a service, subscribe or unsubscribe a delivery point)
//! are validated, applied to a persistence backend, and answered back to
//! whoever issued them.
//!
//! Every processor follows the same lifecycle:
//!
//! ```text
//! validate -> mutate persisted state -> respond -> finish
//! ```
//!
//! Failures at any step are logged and answered, and every request is
//! finished exactly once regardless of the path taken.
//!
//! ## Module Organization
//!
//! - [`request`] - Requests, actions, outcomes and the completion protocol
//! - [`validation`] - Service and subscriber name validation
//! - [`persistence`] - The storage port and an in-memory backend
//! - [`processor`] - One processor per action
//! - [`registry`] - Action to processor mapping and the worker pool dispatcher
//! - [`config`] - Configuration loading
//! - [`logging`] - Processor logging capability and structured logging setup
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use push_request_core::config::PushCoreConfig;
//! use push_request_core::logging::TracingLogger;
//! use push_request_core::model::PushServiceProvider;
//! use push_request_core::persistence::InMemoryPushDatabase;
//! use push_request_core::registry::{ProcessorRegistry, RequestDispatcher};
//! use push_request_core::request::{Action, Request};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PushCoreConfig::default();
//! let registry = ProcessorRegistry::with_defaults(
//!     Arc::new(TracingLogger::default()),
//!     Arc::new(InMemoryPushDatabase::new()),
//!     &config.dispatcher,
//! )?;
//! let (dispatcher, submitter) = RequestDispatcher::new(Arc::new(registry), &config.dispatcher)?;
//! let running = dispatcher.spawn();
//!
//! let outcome = submitter
//!     .call(
//!         Request::builder(Action::AddPushServiceProvider)
//!             .service("news")
//!             .push_service_provider(PushServiceProvider::new("apns:prod", "apns")),
//!     )
//!     .await?;
//! assert_eq!(
//!     outcome.map(|o| o.message().to_string()),
//!     Some("PushServiceProvider=apns:prod Success!".to_string())
//! );
//!
//! drop(submitter);
//! running.await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod processor;
pub mod registry;
pub mod request;
pub mod test_utils;
pub mod validation;

pub use crate::config::{DispatcherConfig, LoggingConfig, PushCoreConfig};
pub use error::{
    ConfigurationError, DispatchError, PersistenceError, ProcessingError, RequestAbandoned,
    ValidationError,
};
pub use logging::{ProcessorLogger, TracingLogger};
pub use model::{DeliveryPoint, PushServiceProvider};
pub use persistence::{InMemoryPushDatabase, PushDatabase};
pub use processor::RequestProcessor;
pub use registry::{ProcessorRegistry, RequestDispatcher, RequestSubmitter};
pub use request::{Action, Outcome, Request};
pub use validation::RequestValidator;
