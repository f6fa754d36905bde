//! # Request Dispatcher
//!
//! Worker pool in front of a [`ProcessorRegistry`]. Requests arrive over a
//! bounded queue and each one runs on a blocking-capable worker, since
//! persistence calls may block. At most `worker_count` requests are processed
//! at a time; across requests there is no ordering guarantee.
//!
//! The dispatcher stops accepting work once every [`RequestSubmitter`] has
//! been dropped, then drains what is in flight.

use super::ProcessorRegistry;
use crate::config::DispatcherConfig;
use crate::error::{ConfigurationError, DispatchError};
use crate::request::{Outcome, Request, RequestBuilder};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{error, info, info_span, instrument};

/// Counters reported when the dispatcher stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub dispatched: u64,
    pub panicked: u64,
}

/// Front door for requests; cheap to clone
#[derive(Debug, Clone)]
pub struct RequestSubmitter {
    sender: mpsc::Sender<Request>,
}

impl RequestSubmitter {
    /// Queue a request, waiting for space if the queue is full
    pub async fn submit(&self, request: Request) -> Result<(), DispatchError> {
        self.sender
            .send(request)
            .await
            .map_err(|e| DispatchError::Closed(Box::new(e.0)))
    }

    /// Submit a request and wait for its outcome. `None` for silent completions.
    ///
    /// A request the dispatcher drops without finishing, for example one still
    /// queued at shutdown, yields [`DispatchError::Abandoned`].
    pub async fn call(&self, builder: RequestBuilder) -> Result<Option<Outcome>, DispatchError> {
        let (request, handle) = builder.build_with_channel();
        let request_id = request.id.clone();
        self.submit(request).await?;
        handle
            .wait()
            .await
            .map_err(|_| DispatchError::Abandoned(request_id))
    }
}

/// Runs registered processors on a bounded worker pool
pub struct RequestDispatcher {
    registry: Arc<ProcessorRegistry>,
    receiver: mpsc::Receiver<Request>,
    workers: Arc<Semaphore>,
    worker_count: usize,
}

impl RequestDispatcher {
    pub fn new(
        registry: Arc<ProcessorRegistry>,
        config: &DispatcherConfig,
    ) -> Result<(Self, RequestSubmitter), ConfigurationError> {
        config.validate()?;
        let (sender, receiver) = mpsc::channel(config.queue_capacity);
        let dispatcher = Self {
            registry,
            receiver,
            workers: Arc::new(Semaphore::new(config.worker_count)),
            worker_count: config.worker_count,
        };
        Ok((dispatcher, RequestSubmitter { sender }))
    }

    /// Run the dispatcher on the current runtime
    pub fn spawn(self) -> JoinHandle<DispatchStats> {
        tokio::spawn(self.run())
    }

    /// Process requests until every submitter is dropped, then drain in-flight work
    #[instrument(skip(self), fields(worker_count = self.worker_count))]
    pub async fn run(mut self) -> DispatchStats {
        info!("Starting request dispatcher");
        let mut stats = DispatchStats::default();
        let mut in_flight = JoinSet::new();

        while let Some(request) = self.receiver.recv().await {
            let permit = match self.workers.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!(error = %e, "Worker pool closed; stopping dispatch");
                    break;
                }
            };

            let registry = self.registry.clone();
            in_flight.spawn_blocking(move || {
                let _permit = permit;
                let span = info_span!(
                    "process_request",
                    request_id = %request.id,
                    action = %request.action()
                );
                let _entered = span.enter();
                registry.dispatch(request);
            });
            stats.dispatched += 1;

            while let Some(result) = in_flight.try_join_next() {
                record(&mut stats, result);
            }
        }

        while let Some(result) = in_flight.join_next().await {
            record(&mut stats, result);
        }

        info!(
            dispatched = stats.dispatched,
            panicked = stats.panicked,
            "Request dispatcher stopped"
        );
        stats
    }
}

fn record(stats: &mut DispatchStats, result: Result<(), JoinError>) {
    if let Err(e) = result {
        // The request's finish guard has already run during unwinding
        error!(error = %e, "Request processor panicked");
        stats.panicked += 1;
    }
}
