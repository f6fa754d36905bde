use super::RequestProcessor;
use crate::logging::ProcessorLogger;
use crate::request::Request;
use std::sync::Arc;

/// Logs what arrived and finishes it. No validation, no mutation, no response.
pub struct ActionPrinter {
    logger: Arc<dyn ProcessorLogger>,
}

impl ActionPrinter {
    pub fn new(logger: Arc<dyn ProcessorLogger>) -> Self {
        Self { logger }
    }
}

impl RequestProcessor for ActionPrinter {
    fn set_logger(&mut self, logger: Arc<dyn ProcessorLogger>) {
        self.logger = logger;
    }

    fn process(&self, request: Request) {
        let request = request.finish_guard(self.logger.clone());
        self.logger.debug(format_args!(
            "Action: {}-{}, id: {}",
            request.action().code(),
            request.action_name(),
            request.id
        ));
    }
}
