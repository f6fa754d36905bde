//! # Requests
//!
//! The unit of work flowing through processors. A [`Request`] carries the
//! operation parameters and the completion protocol: at most one
//! [`FinishGuard::respond`] followed by exactly one finish.
//!
//! ## Completion
//!
//! Neither responding nor finishing is exposed on `Request` itself. A
//! processor converts the request into a [`FinishGuard`] on entry, and the
//! guard signals completion when it goes out of scope, so every exit path
//! finishes the request exactly once and nothing can respond after it.
//!
//! ```rust
//! use push_request_core::logging::TracingLogger;
//! use push_request_core::request::{Action, Outcome, Request};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let (request, handle) = Request::builder(Action::Subscribe)
//!     .service("news")
//!     .subscriber("alice")
//!     .build_with_channel();
//!
//! let mut request = request.finish_guard(Arc::new(TracingLogger::default()));
//! request.respond(Outcome::success("DeliveryPoint=phone Success!"));
//! drop(request);
//!
//! let outcome = handle.wait().await.ok().flatten();
//! assert!(outcome.is_some_and(|outcome| outcome.is_success()));
//! # }
//! ```

mod completion;

pub use completion::{ChannelCompletion, FinishGuard, RequestCompletion, ResponseHandle};

use crate::logging::ProcessorLogger;
use crate::model::{DeliveryPoint, PushServiceProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Operation a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Push,
    Subscribe,
    Unsubscribe,
    AddPushServiceProvider,
    RemovePushServiceProvider,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Push,
        Action::Subscribe,
        Action::Unsubscribe,
        Action::AddPushServiceProvider,
        Action::RemovePushServiceProvider,
    ];

    /// Stable numeric action code
    pub fn code(self) -> u8 {
        match self {
            Action::Push => 0,
            Action::Subscribe => 1,
            Action::Unsubscribe => 2,
            Action::AddPushServiceProvider => 3,
            Action::RemovePushServiceProvider => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.code() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::Push => "Push",
            Action::Subscribe => "Subscribe",
            Action::Unsubscribe => "Unsubscribe",
            Action::AddPushServiceProvider => "AddPushServiceProvider",
            Action::RemovePushServiceProvider => "RemovePushServiceProvider",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Human readable result delivered to whoever awaits a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Success(String),
    Failure(String),
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Outcome::Success(message.into())
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Outcome::Failure(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::Success(message) | Outcome::Failure(message) => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// One administrative or subscription operation
pub struct Request {
    pub id: String,
    action: Action,
    pub service: String,
    /// Only the first subscriber is used by subscription operations
    pub subscribers: Vec<String>,
    pub push_service_provider: Option<PushServiceProvider>,
    pub delivery_point: Option<DeliveryPoint>,
    completion: Arc<dyn RequestCompletion>,
    responded: bool,
}

impl Request {
    pub fn builder(action: Action) -> RequestBuilder {
        RequestBuilder::new(action)
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn action_name(&self) -> &'static str {
        self.action.name()
    }

    /// First subscriber, the one subscription operations act on
    pub fn first_subscriber(&self) -> Option<&str> {
        self.subscribers.first().map(String::as_str)
    }

    pub fn has_responded(&self) -> bool {
        self.responded
    }

    /// Take ownership of completion; the request finishes when the guard drops.
    /// `logger` receives protocol violations observed by the guard.
    pub fn finish_guard(self, logger: Arc<dyn ProcessorLogger>) -> FinishGuard {
        FinishGuard::new(self, logger)
    }

    /// Forward the first outcome; any later one is handed back undelivered
    fn deliver(&mut self, outcome: Outcome) -> Option<Outcome> {
        if self.responded {
            return Some(outcome);
        }
        self.responded = true;
        self.completion.respond(outcome);
        None
    }

    fn finish(&self) {
        self.completion.finish();
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("action", &self.action)
            .field("service", &self.service)
            .field("subscribers", &self.subscribers)
            .field("push_service_provider", &self.push_service_provider)
            .field("delivery_point", &self.delivery_point)
            .field("responded", &self.responded)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Request`]
#[derive(Debug)]
pub struct RequestBuilder {
    id: Option<String>,
    action: Action,
    service: String,
    subscribers: Vec<String>,
    push_service_provider: Option<PushServiceProvider>,
    delivery_point: Option<DeliveryPoint>,
}

impl RequestBuilder {
    fn new(action: Action) -> Self {
        Self {
            id: None,
            action,
            service: String::new(),
            subscribers: Vec::new(),
            push_service_provider: None,
            delivery_point: None,
        }
    }

    /// Request id; a random UUID is used when unset
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn subscriber(mut self, subscriber: impl Into<String>) -> Self {
        self.subscribers.push(subscriber.into());
        self
    }

    pub fn subscribers<I, S>(mut self, subscribers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subscribers.extend(subscribers.into_iter().map(Into::into));
        self
    }

    pub fn push_service_provider(mut self, provider: PushServiceProvider) -> Self {
        self.push_service_provider = Some(provider);
        self
    }

    pub fn delivery_point(mut self, delivery_point: DeliveryPoint) -> Self {
        self.delivery_point = Some(delivery_point);
        self
    }

    /// Build a request reporting to the given completion
    pub fn build(self, completion: Arc<dyn RequestCompletion>) -> Request {
        Request {
            id: self
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            action: self.action,
            service: self.service,
            subscribers: self.subscribers,
            push_service_provider: self.push_service_provider,
            delivery_point: self.delivery_point,
            completion,
            responded: false,
        }
    }

    /// Build a request together with a handle that resolves when it finishes
    pub fn build_with_channel(self) -> (Request, ResponseHandle) {
        let (completion, handle) = ChannelCompletion::new();
        (self.build(Arc::new(completion)), handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_codes_round_trip() {
        for action in Action::ALL {
            assert_eq!(Action::from_code(action.code()), Some(action));
        }
        assert_eq!(Action::from_code(42), None);
        assert_eq!(Action::AddPushServiceProvider.code(), 3);
        assert_eq!(Action::Unsubscribe.to_string(), "Unsubscribe");
    }

    #[test]
    fn test_builder_generates_id_when_missing() {
        let (request, _handle) = Request::builder(Action::Push).build_with_channel();
        assert!(uuid::Uuid::parse_str(&request.id).is_ok());

        let (request, _handle) = Request::builder(Action::Push)
            .id("req-1")
            .build_with_channel();
        assert_eq!(request.id, "req-1");
    }

    #[test]
    fn test_first_subscriber() {
        let (request, _handle) = Request::builder(Action::Subscribe)
            .subscribers(["alice", "bob"])
            .build_with_channel();
        assert_eq!(request.first_subscriber(), Some("alice"));

        let (request, _handle) = Request::builder(Action::Subscribe).build_with_channel();
        assert_eq!(request.first_subscriber(), None);
    }

    #[tokio::test]
    async fn test_only_first_response_is_delivered() {
        let (request, handle) = Request::builder(Action::Subscribe).build_with_channel();
        let mut guard = request.finish_guard(crate::test_utils::RecordingLogger::new());

        assert!(guard.respond(Outcome::failure("first")));
        assert!(!guard.respond(Outcome::success("second")));
        assert!(guard.has_responded());
        drop(guard);

        assert_eq!(handle.wait().await, Ok(Some(Outcome::failure("first"))));
    }
}
