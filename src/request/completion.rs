//! Completion protocol between processors and whatever produced the request.

use super::{Outcome, Request};
use crate::error::RequestAbandoned;
use crate::logging::ProcessorLogger;
use parking_lot::Mutex;
use std::ops::Deref;
use std::sync::Arc;
use std::thread;
use tokio::sync::oneshot;

/// Consumer side of a request: receives the outcome and the completion signal.
///
/// Implementations must not panic or block for long; they run on the
/// processor's worker.
pub trait RequestCompletion: Send + Sync {
    /// Deliver the request's outcome. Called at most once.
    fn respond(&self, outcome: Outcome);

    /// Signal that processing is over. Called exactly once, always last.
    fn finish(&self);
}

/// Owns a request for the duration of processing and finishes it on drop.
///
/// Responding goes through the guard so a second response is reported to
/// the processor's logger. If the processor panics before responding, the
/// guard answers with a failure before finishing.
pub struct FinishGuard {
    request: Request,
    logger: Arc<dyn ProcessorLogger>,
}

impl FinishGuard {
    pub(super) fn new(request: Request, logger: Arc<dyn ProcessorLogger>) -> Self {
        Self { request, logger }
    }

    pub(crate) fn logger(&self) -> &dyn ProcessorLogger {
        self.logger.as_ref()
    }

    /// Deliver the outcome. Only the first call per request is forwarded.
    pub fn respond(&mut self, outcome: Outcome) -> bool {
        match self.request.deliver(outcome) {
            None => true,
            Some(dropped) => {
                self.logger.warn(format_args!(
                    "[{}] RequestId={} dropping second response: {dropped}",
                    self.request.action(),
                    self.request.id
                ));
                false
            }
        }
    }
}

impl Deref for FinishGuard {
    type Target = Request;

    fn deref(&self) -> &Request {
        &self.request
    }
}

impl std::fmt::Debug for FinishGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinishGuard")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        if thread::panicking() && !self.request.has_responded() {
            let message = format!(
                "[{}Fail] RequestId={} processor panicked",
                self.request.action(),
                self.request.id
            );
            self.logger.error(format_args!("{message}"));
            self.request.deliver(Outcome::Failure(message));
        }
        self.request.finish();
    }
}

/// Completion that hands the outcome to a [`ResponseHandle`] at finish
pub struct ChannelCompletion {
    outcome: Mutex<Option<Outcome>>,
    sender: Mutex<Option<oneshot::Sender<Option<Outcome>>>>,
}

impl ChannelCompletion {
    pub fn new() -> (Self, ResponseHandle) {
        let (sender, receiver) = oneshot::channel();
        let completion = Self {
            outcome: Mutex::new(None),
            sender: Mutex::new(Some(sender)),
        };
        (completion, ResponseHandle { receiver })
    }
}

impl RequestCompletion for ChannelCompletion {
    fn respond(&self, outcome: Outcome) {
        let mut slot = self.outcome.lock();
        if slot.is_none() {
            *slot = Some(outcome);
        }
    }

    fn finish(&self) {
        if let Some(sender) = self.sender.lock().take() {
            // The waiting side may have gone away; nothing else to notify.
            let _ = sender.send(self.outcome.lock().take());
        }
    }
}

/// Awaits the completion of one request
#[derive(Debug)]
pub struct ResponseHandle {
    receiver: oneshot::Receiver<Option<Outcome>>,
}

impl ResponseHandle {
    /// Resolves once the request finished, with `None` for silent completions.
    /// A request dropped without finishing yields [`RequestAbandoned`].
    pub async fn wait(self) -> Result<Option<Outcome>, RequestAbandoned> {
        self.receiver.await.map_err(|_| RequestAbandoned)
    }

    /// Blocking variant of [`ResponseHandle::wait`] for non-async callers.
    /// Must not be called from within an async context.
    pub fn blocking_wait(self) -> Result<Option<Outcome>, RequestAbandoned> {
        self.receiver.blocking_recv().map_err(|_| RequestAbandoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Action;
    use crate::test_utils::{recorded_request, CompletionEvent, RecordingLogger};
    use std::panic::{self, AssertUnwindSafe};
    use tracing::Level;

    #[tokio::test]
    async fn test_silent_finish_resolves_to_none() {
        let (request, handle) = Request::builder(Action::Unsubscribe).build_with_channel();
        drop(request.finish_guard(RecordingLogger::new()));
        assert_eq!(handle.wait().await, Ok(None));
    }

    #[tokio::test]
    async fn test_unprocessed_request_is_abandoned() {
        let (request, handle) = Request::builder(Action::RemovePushServiceProvider)
            .id("r1")
            .build_with_channel();
        drop(request);
        assert_eq!(handle.wait().await, Err(RequestAbandoned));
    }

    #[test]
    fn test_blocking_wait_after_finish() {
        let (request, handle) = Request::builder(Action::Subscribe).build_with_channel();
        let mut guard = request.finish_guard(RecordingLogger::new());
        guard.respond(Outcome::success("done"));
        drop(guard);
        assert_eq!(handle.blocking_wait(), Ok(Some(Outcome::success("done"))));
    }

    #[test]
    fn test_second_response_is_reported_to_logger() {
        let logger = RecordingLogger::new();
        let (request, completion) =
            recorded_request(Request::builder(Action::Subscribe).id("twice"));
        let mut guard = request.finish_guard(logger.clone());

        assert!(guard.respond(Outcome::failure("first")));
        assert!(!guard.respond(Outcome::success("second")));
        drop(guard);

        assert_eq!(completion.responses(), vec![Outcome::failure("first")]);
        assert!(logger.contains(Level::WARN, "RequestId=twice dropping second response: second"));
    }

    #[test]
    fn test_panic_before_responding_answers_with_failure() {
        let logger = RecordingLogger::new();
        let (request, completion) =
            recorded_request(Request::builder(Action::Unsubscribe).id("boom"));

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _request = request.finish_guard(logger.clone());
            panic!("processor bug");
        }));

        assert!(result.is_err());
        let expected = "[UnsubscribeFail] RequestId=boom processor panicked";
        assert_eq!(
            completion.events(),
            vec![
                CompletionEvent::Respond(Outcome::failure(expected)),
                CompletionEvent::Finish
            ]
        );
        assert_eq!(logger.lines_at(Level::ERROR), vec![expected.to_string()]);
    }

    #[test]
    fn test_panic_after_responding_keeps_first_response() {
        let (request, completion) =
            recorded_request(Request::builder(Action::Subscribe).id("late"));

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut request = request.finish_guard(RecordingLogger::new());
            request.respond(Outcome::success("DeliveryPoint=phone Success!"));
            panic!("processor bug");
        }));

        assert!(result.is_err());
        assert_eq!(
            completion.responses(),
            vec![Outcome::success("DeliveryPoint=phone Success!")]
        );
        assert_eq!(completion.finish_count(), 1);
    }

    #[test]
    fn test_channel_completion_ignores_late_respond() {
        let (completion, handle) = ChannelCompletion::new();
        completion.respond(Outcome::success("first"));
        completion.respond(Outcome::failure("second"));
        completion.finish();
        completion.finish();
        assert_eq!(
            tokio_test::block_on(handle.wait()),
            Ok(Some(Outcome::success("first")))
        );
    }
}
