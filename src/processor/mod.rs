//! # Request Processors
//!
//! One processor per operation kind, all behind the [`RequestProcessor`]
//! contract:
//!
//! 1. validate the request,
//! 2. make at most one mutating call to the [`PushDatabase`](crate::persistence::PushDatabase),
//! 3. respond at most once,
//! 4. finish exactly once, on every path.
//!
//! Step 4 is enforced by converting the request into a
//! [`FinishGuard`](crate::request::FinishGuard) on entry.
//!
//! Processors hold no per-request state: an injected logger, an injected
//! database handle and an immutable [`RequestValidator`](crate::validation::RequestValidator).
//! One instance serves any number of concurrent requests.
//!
//! ## Failure reporting
//!
//! Every failure is logged at error severity and answered with the same text,
//! `[<Operation>Fail] RequestId=<id> <details>`.
//!
//! ## Silent paths
//!
//! Removing a provider and unsubscribing succeed without a response, and a
//! subscribe request with no subscribers finishes without doing anything.
//! Consumers of these operations only observe the finish.

mod action_printer;
mod provider;
mod subscription;

pub use action_printer::ActionPrinter;
pub use provider::{AddPushServiceProviderProcessor, RemovePushServiceProviderProcessor};
pub use subscription::{SubscribeProcessor, UnsubscribeProcessor};

use crate::error::ProcessingError;
use crate::logging::ProcessorLogger;
use crate::request::{FinishGuard, Outcome, Request};
use std::sync::Arc;

/// Failure tags, part of the observable log and response format
pub mod tags {
    pub const ADD_PUSH_SERVICE_FAIL: &str = "AddPushServiceRequestFail";
    pub const REMOVE_PUSH_SERVICE_FAIL: &str = "RemovePushServiceRequestFail";
    pub const SUBSCRIBE_FAIL: &str = "SubscribeRequestFail";
    pub const UNSUBSCRIBE_FAIL: &str = "UnSubscribeRequestFail";
    pub const DISPATCH_FAIL: &str = "DispatchFail";
}

/// Handles every request of one action kind
pub trait RequestProcessor: Send + Sync {
    fn set_logger(&mut self, logger: Arc<dyn ProcessorLogger>);

    /// Process one request to completion. The request is finished before this returns.
    fn process(&self, request: Request);
}

/// Log a failure to the guard's logger and answer the request with the same text
pub(crate) fn report_failure(request: &mut FinishGuard, tag: &str, error: &ProcessingError) {
    let message = format!("[{tag}] RequestId={} {error}", request.id);
    request.logger().error(format_args!("{message}"));
    request.respond(Outcome::Failure(message));
}
