//! End-to-end flow: submitter -> dispatcher worker pool -> registry ->
//! processors -> in-memory backend.

mod common;

use common::builders::*;
use push_request_core::config::DispatcherConfig;
use push_request_core::persistence::InMemoryPushDatabase;
use push_request_core::registry::{DispatchStats, ProcessorRegistry, RequestDispatcher};
use push_request_core::request::{Action, Outcome, Request};
use push_request_core::test_utils::RecordingLogger;
use std::sync::Arc;
use tracing::Level;

struct Harness {
    db: Arc<InMemoryPushDatabase>,
    logger: Arc<RecordingLogger>,
    submitter: push_request_core::registry::RequestSubmitter,
    running: tokio::task::JoinHandle<DispatchStats>,
}

fn start(config: DispatcherConfig) -> Harness {
    let db = Arc::new(InMemoryPushDatabase::new());
    let logger = RecordingLogger::new();
    let registry = ProcessorRegistry::with_defaults(logger.clone(), db.clone(), &config).unwrap();
    let (dispatcher, submitter) = RequestDispatcher::new(Arc::new(registry), &config).unwrap();
    Harness {
        db,
        logger,
        submitter,
        running: dispatcher.spawn(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_provider_and_subscription_flow() {
    let h = start(DispatcherConfig::default());

    let outcome = h
        .submitter
        .call(add_provider("1", "news", apns_provider()))
        .await
        .unwrap();
    assert_eq!(outcome, Some(Outcome::success("PushServiceProvider=apns:prod Success!")));

    let outcome = h
        .submitter
        .call(subscribe("2", "news", "alice", iphone()))
        .await
        .unwrap();
    assert_eq!(outcome, Some(Outcome::success("DeliveryPoint=apns:iphone Success!")));
    assert_eq!(h.db.delivery_points("news", "alice"), vec![iphone()]);

    // No gcm provider in the service: the backend refuses the android device
    let outcome = h
        .submitter
        .call(subscribe("3", "news", "alice", android()))
        .await
        .unwrap()
        .unwrap();
    assert!(!outcome.is_success());
    assert!(outcome
        .message()
        .starts_with("[SubscribeRequestFail] RequestId=3 DatabaseError"));

    // Silent successes resolve to no outcome
    let outcome = h
        .submitter
        .call(unsubscribe("4", "news", "alice", iphone()))
        .await
        .unwrap();
    assert_eq!(outcome, None);
    assert!(h.db.delivery_points("news", "alice").is_empty());

    let outcome = h
        .submitter
        .call(remove_provider("5", "news", apns_provider()))
        .await
        .unwrap();
    assert_eq!(outcome, None);
    assert!(h.db.providers("news").is_empty());

    let outcome = h
        .submitter
        .call(remove_provider("6", "news", apns_provider()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        outcome.message(),
        "[RemovePushServiceRequestFail] RequestId=6 DatabaseError not found: push service provider apns:prod in service news"
    );

    drop(h.submitter);
    let stats = h.running.await.unwrap();
    assert_eq!(stats, DispatchStats { dispatched: 6, panicked: 0 });
    assert_eq!(h.logger.lines_at(Level::ERROR).len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_push_requests_reach_action_printer() {
    let h = start(DispatcherConfig::default());

    let outcome = h
        .submitter
        .call(Request::builder(Action::Push).id("p1").service("news"))
        .await
        .unwrap();
    assert_eq!(outcome, None);
    assert!(h.logger.contains(Level::DEBUG, "Action: 0-Push, id: p1"));

    drop(h.submitter);
    h.running.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_push_without_printer_is_rejected() {
    let h = start(DispatcherConfig {
        action_printer_for_push: false,
        ..DispatcherConfig::default()
    });

    let outcome = h
        .submitter
        .call(Request::builder(Action::Push).id("p2"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Some(Outcome::failure(
            "[DispatchFail] RequestId=p2 no processor registered for action Push"
        ))
    );

    drop(h.submitter);
    h.running.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_subscribers_with_small_pool() {
    let h = start(DispatcherConfig {
        worker_count: 2,
        queue_capacity: 4,
        ..DispatcherConfig::default()
    });
    h.submitter
        .call(add_provider("setup", "news", apns_provider()))
        .await
        .unwrap();

    let mut calls = tokio::task::JoinSet::new();
    for i in 0..32 {
        let submitter = h.submitter.clone();
        calls.spawn(async move {
            submitter
                .call(subscribe(&format!("s{i}"), "news", &format!("user{i}"), iphone()))
                .await
                .unwrap()
        });
    }

    let mut successes = 0;
    while let Some(outcome) = calls.join_next().await {
        if outcome.unwrap().is_some_and(|o| o.is_success()) {
            successes += 1;
        }
    }
    assert_eq!(successes, 32);
    assert_eq!(h.db.delivery_points("news", "user31"), vec![iphone()]);

    drop(h.submitter);
    let stats = h.running.await.unwrap();
    assert_eq!(stats.dispatched, 33);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_delivery_points_resolve_to_provider_of_their_type() {
    let h = start(DispatcherConfig::default());
    for (id, provider) in [("g1", gcm_provider()), ("g2", apns_provider())] {
        h.submitter
            .call(add_provider(id, "news", provider))
            .await
            .unwrap();
    }

    let outcome = h
        .submitter
        .call(subscribe("g3", "news", "bob", android()))
        .await
        .unwrap();
    assert_eq!(outcome, Some(Outcome::success("DeliveryPoint=gcm:pixel Success!")));
    assert!(h.logger.contains(
        Level::INFO,
        "[SubscribeRequest] RequestId=g3 Success DeliveryPoint=gcm:pixel PushServiceProvider=gcm:project-1"
    ));
    assert_eq!(h.db.delivery_points("news", "bob"), vec![android()]);

    drop(h.submitter);
    h.running.await.unwrap();
}
