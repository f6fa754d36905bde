//! # Test Utilities
//!
//! Instrumented collaborators for exercising processors without a transport
//! or a real backend: a completion that records every call, a logger that
//! keeps every line, and a persistence stub with scripted results.

use crate::error::PersistenceError;
use crate::logging::ProcessorLogger;
use crate::model::{DeliveryPoint, PushServiceProvider};
use crate::persistence::{PersistenceResult, PushDatabase};
use crate::request::{Outcome, Request, RequestBuilder, RequestCompletion};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::Level;

/// A call observed by [`RecordingCompletion`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionEvent {
    Respond(Outcome),
    Finish,
}

/// Completion that records the order of respond and finish calls
#[derive(Debug, Default)]
pub struct RecordingCompletion {
    events: Mutex<Vec<CompletionEvent>>,
}

impl RecordingCompletion {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<CompletionEvent> {
        self.events.lock().clone()
    }

    pub fn responses(&self) -> Vec<Outcome> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                CompletionEvent::Respond(outcome) => Some(outcome.clone()),
                CompletionEvent::Finish => None,
            })
            .collect()
    }

    pub fn finish_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| matches!(event, CompletionEvent::Finish))
            .count()
    }

    /// Finished exactly once, as the last call, after at most one response
    pub fn completed_correctly(&self) -> bool {
        let events = self.events.lock();
        matches!(events.last(), Some(CompletionEvent::Finish))
            && events.len() <= 2
            && events[..events.len() - 1]
                .iter()
                .all(|event| matches!(event, CompletionEvent::Respond(_)))
    }
}

impl RequestCompletion for RecordingCompletion {
    fn respond(&self, outcome: Outcome) {
        self.events.lock().push(CompletionEvent::Respond(outcome));
    }

    fn finish(&self) {
        self.events.lock().push(CompletionEvent::Finish);
    }
}

/// Build a request wired to a fresh [`RecordingCompletion`]
pub fn recorded_request(builder: RequestBuilder) -> (Request, Arc<RecordingCompletion>) {
    let completion = RecordingCompletion::new();
    let request = builder.build(completion.clone());
    (request, completion)
}

/// Logger that keeps every formatted line
#[derive(Debug, Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<(Level, String)>>,
}

impl RecordingLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().clone()
    }

    pub fn lines_at(&self, level: Level) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, line)| line.clone())
            .collect()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines_at(level).iter().any(|line| line.contains(needle))
    }
}

impl ProcessorLogger for RecordingLogger {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        self.lines.lock().push((level, args.to_string()));
    }
}

/// A persistence call observed by [`StubDatabase`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortCall {
    AddProvider {
        service: String,
        provider: String,
    },
    RemoveProvider {
        service: String,
        provider: String,
    },
    AddDeliveryPoint {
        service: String,
        subscriber: String,
        delivery_point: String,
    },
    RemoveDeliveryPoint {
        service: String,
        subscriber: String,
        delivery_point: String,
    },
}

/// Persistence stub: records calls and answers from a script
#[derive(Debug, Default)]
pub struct StubDatabase {
    calls: Mutex<Vec<PortCall>>,
    failure: Mutex<Option<PersistenceError>>,
    subscribed_provider: Mutex<Option<PushServiceProvider>>,
}

impl StubDatabase {
    /// Every call succeeds; subscribing returns no provider until one is scripted
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every call fails with `error`
    pub fn failing(error: PersistenceError) -> Arc<Self> {
        let stub = Self::default();
        *stub.failure.lock() = Some(error);
        Arc::new(stub)
    }

    /// Subscribing succeeds and returns `provider`
    pub fn subscribing_to(provider: PushServiceProvider) -> Arc<Self> {
        let stub = Self::default();
        *stub.subscribed_provider.lock() = Some(provider);
        Arc::new(stub)
    }

    pub fn calls(&self) -> Vec<PortCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn record(&self, call: PortCall) -> PersistenceResult<()> {
        self.calls.lock().push(call);
        match self.failure.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl PushDatabase for StubDatabase {
    fn add_push_service_provider_to_service(
        &self,
        service: &str,
        provider: &PushServiceProvider,
    ) -> PersistenceResult<()> {
        self.record(PortCall::AddProvider {
            service: service.to_string(),
            provider: provider.name().to_string(),
        })
    }

    fn remove_push_service_provider_from_service(
        &self,
        service: &str,
        provider: &PushServiceProvider,
    ) -> PersistenceResult<()> {
        self.record(PortCall::RemoveProvider {
            service: service.to_string(),
            provider: provider.name().to_string(),
        })
    }

    fn add_delivery_point_to_service(
        &self,
        service: &str,
        subscriber: &str,
        delivery_point: &DeliveryPoint,
    ) -> PersistenceResult<Option<PushServiceProvider>> {
        self.record(PortCall::AddDeliveryPoint {
            service: service.to_string(),
            subscriber: subscriber.to_string(),
            delivery_point: delivery_point.name().to_string(),
        })?;
        Ok(self.subscribed_provider.lock().clone())
    }

    fn remove_delivery_point_from_service(
        &self,
        service: &str,
        subscriber: &str,
        delivery_point: &DeliveryPoint,
    ) -> PersistenceResult<()> {
        self.record(PortCall::RemoveDeliveryPoint {
            service: service.to_string(),
            subscriber: subscriber.to_string(),
            delivery_point: delivery_point.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Action;

    #[test]
    fn test_recording_completion_detects_misuse() {
        let completion = RecordingCompletion::new();
        assert!(!completion.completed_correctly());

        completion.respond(Outcome::success("a"));
        completion.finish();
        assert!(completion.completed_correctly());

        completion.finish();
        assert!(!completion.completed_correctly());
        assert_eq!(completion.finish_count(), 2);
    }

    #[test]
    fn test_recorded_request_reports_to_completion() {
        let (request, completion) = recorded_request(Request::builder(Action::Push).id("r1"));
        let mut guard = request.finish_guard(RecordingLogger::new());
        guard.respond(Outcome::failure("nope"));
        drop(guard);

        assert_eq!(
            completion.events(),
            vec![
                CompletionEvent::Respond(Outcome::failure("nope")),
                CompletionEvent::Finish
            ]
        );
    }

    #[test]
    fn test_stub_database_scripted_failure() {
        let db = StubDatabase::failing(PersistenceError::Backend("down".to_string()));
        let provider = PushServiceProvider::new("p", "apns");
        assert!(db.add_push_service_provider_to_service("s", &provider).is_err());
        assert_eq!(db.call_count(), 1);
    }
}
