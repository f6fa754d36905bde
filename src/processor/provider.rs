use super::{report_failure, tags, RequestProcessor};
use crate::error::{ProcessingError, Result};
use crate::logging::ProcessorLogger;
use crate::model::PushServiceProvider;
use crate::persistence::PushDatabase;
use crate::request::{Outcome, Request};
use crate::validation::RequestValidator;
use std::sync::Arc;

/// Validated provider reference carried by a request
fn provider_of<'r>(
    validator: &RequestValidator,
    request: &'r Request,
) -> std::result::Result<&'r PushServiceProvider, ProcessingError> {
    validator.validate_request(request)?;
    request
        .push_service_provider
        .as_ref()
        .ok_or(ProcessingError::MissingProvider)
}

/// Registers a push service provider under a service and confirms it by name
pub struct AddPushServiceProviderProcessor {
    logger: Arc<dyn ProcessorLogger>,
    database: Arc<dyn PushDatabase>,
    validator: RequestValidator,
}

impl AddPushServiceProviderProcessor {
    pub fn new(logger: Arc<dyn ProcessorLogger>, database: Arc<dyn PushDatabase>) -> Result<Self> {
        Ok(Self {
            logger,
            database,
            validator: RequestValidator::new()?,
        })
    }

    fn add(&self, request: &Request) -> std::result::Result<String, ProcessingError> {
        let provider = provider_of(&self.validator, request)?;
        self.database
            .add_push_service_provider_to_service(&request.service, provider)?;
        Ok(provider.name().to_string())
    }
}

impl RequestProcessor for AddPushServiceProviderProcessor {
    fn set_logger(&mut self, logger: Arc<dyn ProcessorLogger>) {
        self.logger = logger;
    }

    fn process(&self, request: Request) {
        let mut request = request.finish_guard(self.logger.clone());

        match self.add(&request) {
            Ok(provider) => {
                self.logger.info(format_args!(
                    "[AddPushServiceRequest] RequestId={} Success PushServiceProviderID={provider}",
                    request.id
                ));
                request.respond(Outcome::Success(format!(
                    "PushServiceProvider={provider} Success!"
                )));
            }
            Err(e) => report_failure(&mut request, tags::ADD_PUSH_SERVICE_FAIL, &e),
        }
    }
}

/// Unregisters a push service provider from a service. Succeeds silently.
pub struct RemovePushServiceProviderProcessor {
    logger: Arc<dyn ProcessorLogger>,
    database: Arc<dyn PushDatabase>,
    validator: RequestValidator,
}

impl RemovePushServiceProviderProcessor {
    pub fn new(logger: Arc<dyn ProcessorLogger>, database: Arc<dyn PushDatabase>) -> Result<Self> {
        Ok(Self {
            logger,
            database,
            validator: RequestValidator::new()?,
        })
    }

    fn remove(&self, request: &Request) -> std::result::Result<String, ProcessingError> {
        let provider = provider_of(&self.validator, request)?;
        self.database
            .remove_push_service_provider_from_service(&request.service, provider)?;
        Ok(provider.name().to_string())
    }
}

impl RequestProcessor for RemovePushServiceProviderProcessor {
    fn set_logger(&mut self, logger: Arc<dyn ProcessorLogger>) {
        self.logger = logger;
    }

    fn process(&self, request: Request) {
        let mut request = request.finish_guard(self.logger.clone());

        match self.remove(&request) {
            Ok(provider) => self.logger.info(format_args!(
                "[RemovePushServiceRequest] RequestId={} Success PushServiceProviderID={provider}",
                request.id
            )),
            Err(e) => report_failure(&mut request, tags::REMOVE_PUSH_SERVICE_FAIL, &e),
        }
    }
}
