use super::{report_failure, tags, RequestProcessor};
use crate::error::{ProcessingError, Result};
use crate::logging::ProcessorLogger;
use crate::persistence::PushDatabase;
use crate::request::{Outcome, Request};
use crate::validation::RequestValidator;
use std::sync::Arc;

/// Attaches a delivery point to the request's first subscriber
pub struct SubscribeProcessor {
    logger: Arc<dyn ProcessorLogger>,
    database: Arc<dyn PushDatabase>,
    validator: RequestValidator,
}

impl SubscribeProcessor {
    pub fn new(logger: Arc<dyn ProcessorLogger>, database: Arc<dyn PushDatabase>) -> Result<Self> {
        Ok(Self {
            logger,
            database,
            validator: RequestValidator::new()?,
        })
    }

    /// Returns the delivery point and provider names on success
    fn subscribe(
        &self,
        request: &Request,
        subscriber: &str,
    ) -> std::result::Result<(String, String), ProcessingError> {
        self.validator.validate_request(request)?;
        let delivery_point = request
            .delivery_point
            .as_ref()
            .ok_or_else(|| {
                ProcessingError::MalformedRequest("missing delivery point".to_string())
            })?;

        let provider = self
            .database
            .add_delivery_point_to_service(&request.service, subscriber, delivery_point)?
            .ok_or(ProcessingError::EmptyResult)?;

        Ok((delivery_point.name().to_string(), provider.name().to_string()))
    }
}

impl RequestProcessor for SubscribeProcessor {
    fn set_logger(&mut self, logger: Arc<dyn ProcessorLogger>) {
        self.logger = logger;
    }

    fn process(&self, request: Request) {
        let mut request = request.finish_guard(self.logger.clone());
        // No subscriber means nothing to do; this is not a failure.
        let Some(subscriber) = request.first_subscriber() else {
            return;
        };

        match self.subscribe(&request, subscriber) {
            Ok((delivery_point, provider)) => {
                self.logger.info(format_args!(
                    "[SubscribeRequest] RequestId={} Success DeliveryPoint={delivery_point} PushServiceProvider={provider}",
                    request.id
                ));
                request.respond(Outcome::Success(format!(
                    "DeliveryPoint={delivery_point} Success!"
                )));
            }
            Err(e) => report_failure(&mut request, tags::SUBSCRIBE_FAIL, &e),
        }
    }
}

/// Detaches a delivery point from the request's first subscriber. Succeeds silently.
pub struct UnsubscribeProcessor {
    logger: Arc<dyn ProcessorLogger>,
    database: Arc<dyn PushDatabase>,
    validator: RequestValidator,
}

impl UnsubscribeProcessor {
    pub fn new(logger: Arc<dyn ProcessorLogger>, database: Arc<dyn PushDatabase>) -> Result<Self> {
        Ok(Self {
            logger,
            database,
            validator: RequestValidator::new()?,
        })
    }

    fn unsubscribe(&self, request: &Request) -> std::result::Result<String, ProcessingError> {
        let (Some(subscriber), Some(delivery_point)) =
            (request.first_subscriber(), request.delivery_point.as_ref())
        else {
            return Err(ProcessingError::MalformedRequest("Nil Pointer".to_string()));
        };

        self.validator.validate_request(request)?;
        self.database
            .remove_delivery_point_from_service(&request.service, subscriber, delivery_point)?;
        Ok(delivery_point.name().to_string())
    }
}

impl RequestProcessor for UnsubscribeProcessor {
    fn set_logger(&mut self, logger: Arc<dyn ProcessorLogger>) {
        self.logger = logger;
    }

    fn process(&self, request: Request) {
        let mut request = request.finish_guard(self.logger.clone());

        match self.unsubscribe(&request) {
            Ok(delivery_point) => self.logger.info(format_args!(
                "[UnsubscribeRequest] RequestId={} Success DeliveryPoint={delivery_point}",
                request.id
            )),
            Err(e) => report_failure(&mut request, tags::UNSUBSCRIBE_FAIL, &e),
        }
    }
}
