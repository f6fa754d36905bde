//! # Processor Registry
//!
//! Maps each request action to the processor responsible for it. The mapping
//! is built once at startup and read concurrently afterwards.
//!
//! ## Usage
//!
//! ```rust
//! use push_request_core::config::DispatcherConfig;
//! use push_request_core::logging::TracingLogger;
//! use push_request_core::persistence::InMemoryPushDatabase;
//! use push_request_core::registry::ProcessorRegistry;
//! use push_request_core::request::{Action, Request};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ProcessorRegistry::with_defaults(
//!     Arc::new(TracingLogger::default()),
//!     Arc::new(InMemoryPushDatabase::new()),
//!     &DispatcherConfig::default(),
//! )?;
//!
//! let (request, _handle) = Request::builder(Action::Push).build_with_channel();
//! registry.dispatch(request);
//! # Ok(())
//! # }
//! ```

pub mod dispatcher;

pub use dispatcher::{DispatchStats, RequestDispatcher, RequestSubmitter};

use crate::config::DispatcherConfig;
use crate::error::{ProcessingError, Result};
use crate::logging::ProcessorLogger;
use crate::persistence::PushDatabase;
use crate::processor::{
    report_failure, tags, ActionPrinter, AddPushServiceProviderProcessor,
    RemovePushServiceProviderProcessor, RequestProcessor, SubscribeProcessor,
    UnsubscribeProcessor,
};
use crate::request::{Action, Request};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Action to processor mapping
pub struct ProcessorRegistry {
    processors: HashMap<Action, Arc<dyn RequestProcessor>>,
    logger: Arc<dyn ProcessorLogger>,
}

impl ProcessorRegistry {
    /// Create an empty registry. `logger` is injected into every registered processor.
    pub fn new(logger: Arc<dyn ProcessorLogger>) -> Self {
        Self {
            processors: HashMap::new(),
            logger,
        }
    }

    /// Registry with the standard provider and subscription processors
    pub fn with_defaults(
        logger: Arc<dyn ProcessorLogger>,
        database: Arc<dyn PushDatabase>,
        config: &DispatcherConfig,
    ) -> Result<Self> {
        let mut registry = Self::new(logger.clone());
        registry.register(
            Action::AddPushServiceProvider,
            AddPushServiceProviderProcessor::new(logger.clone(), database.clone())?,
        );
        registry.register(
            Action::RemovePushServiceProvider,
            RemovePushServiceProviderProcessor::new(logger.clone(), database.clone())?,
        );
        registry.register(
            Action::Subscribe,
            SubscribeProcessor::new(logger.clone(), database.clone())?,
        );
        registry.register(
            Action::Unsubscribe,
            UnsubscribeProcessor::new(logger.clone(), database)?,
        );
        if config.action_printer_for_push {
            registry.register(Action::Push, ActionPrinter::new(logger));
        }
        Ok(registry)
    }

    /// Register a processor for an action, replacing and returning any previous one
    pub fn register<P>(
        &mut self,
        action: Action,
        mut processor: P,
    ) -> Option<Arc<dyn RequestProcessor>>
    where
        P: RequestProcessor + 'static,
    {
        processor.set_logger(self.logger.clone());
        let previous = self.processors.insert(action, Arc::new(processor));
        info!(
            action = %action,
            replaced = previous.is_some(),
            "Registered request processor"
        );
        previous
    }

    pub fn get(&self, action: Action) -> Option<Arc<dyn RequestProcessor>> {
        self.processors.get(&action).cloned()
    }

    pub fn contains(&self, action: Action) -> bool {
        self.processors.contains_key(&action)
    }

    /// Registered actions in code order
    pub fn actions(&self) -> Vec<Action> {
        let mut actions: Vec<Action> = self.processors.keys().copied().collect();
        actions.sort_by_key(|action| action.code());
        actions
    }

    /// Hand a request to the processor registered for its action.
    /// Requests with no processor are failed and finished here.
    pub fn dispatch(&self, request: Request) {
        match self.processors.get(&request.action()) {
            Some(processor) => {
                debug!(request_id = %request.id, action = %request.action(), "Dispatching request");
                processor.process(request);
            }
            None => {
                let action = request.action();
                let mut request = request.finish_guard(self.logger.clone());
                report_failure(
                    &mut request,
                    tags::DISPATCH_FAIL,
                    &ProcessingError::NoProcessor(action),
                );
            }
        }
    }
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("actions", &self.actions())
            .finish_non_exhaustive()
    }
}
