// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::testing::{config, work, Harness};
use async_trait::async_trait;
use rw_adapters::{FakeProcessor, FetchError, ProcessError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Panics on one resource id, succeeds on every other
struct PanickingProcessor {
    on: &'static str,
}

#[async_trait]
impl Processor<String> for PanickingProcessor {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn process(
        &self,
        meta: &ResourceMetadata,
        _resource: &String,
        _cancel: &CancellationToken,
    ) -> Result<(), ProcessError> {
        if meta.id.as_str() == self.on {
            panic!("processor blew up on {}", meta.id);
        }
        Ok(())
    }
}

fn ids(results: &[AttemptResult]) -> Vec<String> {
    let mut ids: Vec<_> = results.iter().map(|r| r.resource_id.to_string()).collect();
    ids.sort();
    ids
}

/// Counts attempts between the start of fetch and the end of processing
#[derive(Clone, Default)]
struct Gauge {
    current: Arc<AtomicUsize>,
    max: Arc<AtomicUsize>,
}

impl Gauge {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    fn max(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }
}

/// Enters the gauge, then waits like a slow source
struct GaugedFetcher {
    gauge: Gauge,
    delay: Duration,
}

#[async_trait]
impl PayloadFetcher for GaugedFetcher {
    type Resource = String;

    async fn fetch(
        &self,
        meta: &ResourceMetadata,
        _last: Option<&TrackedState>,
        _cancel: &CancellationToken,
    ) -> Result<FetchOutcome<String>, FetchError> {
        self.gauge.enter();
        tokio::time::sleep(self.delay).await;
        Ok(FetchOutcome::fetched(meta.id.to_string()))
    }
}

/// Waits like a slow sink, then leaves the gauge
struct GaugedProcessor {
    gauge: Gauge,
    delay: Duration,
}

#[async_trait]
impl Processor<String> for GaugedProcessor {
    fn name(&self) -> &str {
        "gauged"
    }

    async fn process(
        &self,
        _meta: &ResourceMetadata,
        _resource: &String,
        _cancel: &CancellationToken,
    ) -> Result<(), ProcessError> {
        tokio::time::sleep(self.delay).await;
        self.gauge.exit();
        Ok(())
    }
}

#[tokio::test]
async fn never_more_than_parallelism_attempts_in_flight() {
    let h = Harness::new();
    let gauge = Gauge::default();
    let config = config().with_parallelism(3);
    let processors: Vec<Arc<dyn Processor<String>>> = vec![
        Arc::new(GaugedProcessor {
            gauge: gauge.clone(),
            delay: Duration::from_millis(15),
        }),
        Arc::new(h.processor.clone()),
    ];
    let context = AttemptContext {
        fetcher: Arc::new(GaugedFetcher {
            gauge: gauge.clone(),
            delay: Duration::from_millis(15),
        }),
        processors: processors.into(),
        tenant: config.tenant(),
        run_id: RunId::new("run-test"),
        store: Arc::new(h.store.clone()),
        notifier: Arc::new(h.notifier.clone()),
        clock: h.clock.clone(),
        policy: config.retry_policy(),
        resource_limit: None,
        ignore_state: false,
    };
    let dispatcher = Dispatcher::new(context, 3);
    let items = (0..10).map(|n| work(&format!("r{}", n))).collect();

    let results = dispatcher.dispatch(items, &CancellationToken::new()).await;

    assert_eq!(results.len(), 10);
    assert_eq!(gauge.max(), 3);
    assert_eq!(h.processor.calls().len(), 10);
}

#[tokio::test]
async fn parallelism_of_one_is_sequential() {
    let h = Harness::new();
    h.fetcher.set_delay(Duration::from_millis(5));
    let dispatcher = Dispatcher::new(h.context(&config(), Vec::new()), 1);
    let items = (0..4).map(|n| work(&format!("r{}", n))).collect();

    dispatcher.dispatch(items, &CancellationToken::new()).await;

    assert_eq!(h.fetcher.max_in_flight(), 1);
}

#[tokio::test]
async fn processors_run_in_order_and_stop_at_first_failure() {
    let h = Harness::new();
    let first = FakeProcessor::new("first");
    let second = first.sharing_log("second");
    first.fail_on("r1");
    let processors: Vec<Arc<dyn Processor<String>>> =
        vec![Arc::new(first.clone()), Arc::new(second.clone())];
    let dispatcher = Dispatcher::new(h.context(&config(), processors), 1);

    let results = dispatcher
        .dispatch(vec![work("r1"), work("r2")], &CancellationToken::new())
        .await;

    let order: Vec<_> = first
        .calls()
        .into_iter()
        .map(|c| format!("{}:{}", c.processor, c.resource_id))
        .collect();
    assert_eq!(order, vec!["first:r1", "first:r2", "second:r2"]);
    let r1 = results.iter().find(|r| r.resource_id.as_str() == "r1").unwrap();
    assert!(r1.outcome.is_failure());
}

#[tokio::test]
async fn processors_receive_the_same_payload() {
    let h = Harness::new();
    h.fetcher.script(
        "r1",
        rw_adapters::FakeFetch::Payload {
            payload: "shared body".to_string(),
            checksum: None,
        },
    );
    let first = FakeProcessor::new("first");
    let second = first.sharing_log("second");
    let processors: Vec<Arc<dyn Processor<String>>> = vec![Arc::new(first.clone()), Arc::new(second)];
    let dispatcher = Dispatcher::new(h.context(&config(), processors), 1);

    dispatcher
        .dispatch(vec![work("r1")], &CancellationToken::new())
        .await;

    let payloads: Vec<_> = first.calls().into_iter().map(|c| c.payload).collect();
    assert_eq!(payloads, vec!["shared body", "shared body"]);
}

#[tokio::test]
async fn panic_is_recorded_as_that_resources_failure() {
    let h = Harness::new();
    let processors: Vec<Arc<dyn Processor<String>>> =
        vec![Arc::new(PanickingProcessor { on: "boom" })];
    let dispatcher = Dispatcher::new(h.context(&config(), processors), 2);

    let results = dispatcher
        .dispatch(
            vec![work("ok-1"), work("boom"), work("ok-2")],
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(ids(&results), vec!["boom", "ok-1", "ok-2"]);
    let failed: Vec<_> = results.iter().filter(|r| r.outcome.is_failure()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].resource_id.as_str(), "boom");

    let state = h.state("boom").unwrap();
    assert_eq!(state.retry_count, 1);
    let error = state.last_error.unwrap();
    assert!(error.contains("panicked"), "got: {}", error);
    assert!(error.contains("processor blew up on boom"), "got: {}", error);
    assert_eq!(h.state("ok-1").unwrap().retry_count, 0);
}

#[tokio::test]
async fn cancellation_fails_in_flight_and_skips_queued() {
    let h = Harness::new();
    h.fetcher.set_delay(Duration::from_secs(30));
    let dispatcher = Dispatcher::new(h.context(&config(), Vec::new()), 1);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let results = dispatcher
        .dispatch(vec![work("first"), work("second"), work("third")], &cancel)
        .await;

    assert_eq!(ids(&results), vec!["first"]);
    let state = h.state("first").unwrap();
    assert_eq!(state.retry_count, 1);
    assert_eq!(state.last_error.as_deref(), Some(CANCELLED));
    assert!(h.state("second").is_none());
    assert!(h.state("third").is_none());
    assert_eq!(h.fetcher.calls().len(), 1);
}

#[tokio::test]
async fn slow_resource_notifies_without_failing() {
    let h = Harness::new();
    let clock = h.clock.clone();
    let slow = FakeProcessor::new("slow").with_hook(move |_| clock.advance(Duration::from_secs(5)));
    let config = config().with_resource_duration_limit(Duration::from_secs(2));
    let processors: Vec<Arc<dyn Processor<String>>> = vec![Arc::new(slow)];
    let dispatcher = Dispatcher::new(h.context(&config, processors), 1);

    let results = dispatcher
        .dispatch(vec![work("r1")], &CancellationToken::new())
        .await;

    assert!(!results[0].outcome.is_failure());
    assert_eq!(
        h.notifier.breaches(),
        vec![DurationBreach::Resource {
            tenant: Tenant::new(crate::testing::TENANT),
            resource_id: ResourceId::new("r1"),
            elapsed: Duration::from_secs(5),
            limit: Duration::from_secs(2),
        }]
    );
}

#[tokio::test]
async fn empty_dispatch_returns_nothing() {
    let h = Harness::new();
    let dispatcher = Dispatcher::new(h.context(&config(), Vec::new()), 4);

    let results = dispatcher.dispatch(Vec::new(), &CancellationToken::new()).await;

    assert!(results.is_empty());
}
