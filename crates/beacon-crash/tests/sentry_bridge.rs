// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bridge behavior against the real Sentry client with in-process transports.

use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use beacon_crash::{CrashConfig, SentrySdk, TelemetryBridge};
use sentry::protocol::Event;
use sentry::test::TestTransport;
use sentry::{Envelope, Hub, Scope, Transport, TransportFactory};

const DSN: &str = "https://public@sentry.invalid/1";

fn isolated_hub() -> Arc<Hub> {
	Arc::new(Hub::new(None, Arc::new(Scope::default())))
}

fn bridge_with(transport: Arc<dyn TransportFactory>) -> TelemetryBridge {
	let sdk = SentrySdk::with_hub(isolated_hub()).transport(transport);
	let bridge = TelemetryBridge::new(sdk);
	let mut config = CrashConfig::new(DSN, "v1.0").unwrap();
	config.auto_session_tracking = false;
	bridge.init_with_config(config).unwrap();
	bridge
}

fn events(transport: &TestTransport) -> Vec<Event<'static>> {
	transport
		.fetch_and_clear_envelopes()
		.into_iter()
		.filter_map(|envelope| envelope.event().cloned())
		.collect()
}

#[test]
fn foreign_exception_trace_stays_on_its_own_event() {
	let transport = TestTransport::new();
	let bridge = bridge_with(Arc::new(Arc::clone(&transport)));
	let trace = "#0 foo()\n#1 bar()";

	bridge.capture_foreign_exception_with_trace("div by zero", "ArithmeticError", Some(trace));
	bridge.capture_message("unrelated");

	let events = events(&transport);
	assert_eq!(events.len(), 2);

	let exception_event = &events[0];
	assert_eq!(exception_event.exception.values.len(), 1);
	let value = exception_event.exception.values[0]
		.value
		.as_deref()
		.unwrap_or_default();
	assert!(value.contains("div by zero"));
	assert!(value.contains("ArithmeticError"));
	assert_eq!(
		exception_event.tags.get("exception_source").map(String::as_str),
		Some("cpp")
	);
	assert_eq!(
		exception_event.extra.get("cpp_stacktrace"),
		Some(&serde_json::Value::from(trace))
	);
	assert_eq!(exception_event.release.as_deref(), Some("v1.0"));

	let later = &events[1];
	assert!(!later.tags.contains_key("exception_source"));
	assert!(!later.extra.contains_key("cpp_stacktrace"));
}

#[test]
fn breadcrumbs_ride_along_with_next_event() {
	let transport = TestTransport::new();
	let bridge = bridge_with(Arc::new(Arc::clone(&transport)));

	bridge.add_breadcrumb("opened settings", "INFO");
	bridge.add_breadcrumb("cache miss", "whatever");
	bridge.capture_foreign_exception("bad state", "std::logic_error");

	let events = events(&transport);
	let crumbs = &events[0].breadcrumbs.values;
	assert_eq!(crumbs.len(), 2);
	assert!(crumbs.iter().all(|c| c.category.as_deref() == Some("log")));
	assert!(crumbs.iter().all(|c| c.level == sentry::Level::Info));
}

#[test]
fn nothing_reaches_transport_before_init() {
	let transport = TestTransport::new();
	let factory: Arc<dyn TransportFactory> = Arc::new(Arc::clone(&transport));
	let bridge = TelemetryBridge::new(SentrySdk::with_hub(isolated_hub()).transport(factory));

	bridge.capture_message("early");
	bridge.capture_foreign_exception_with_trace("early", "E", Some("#0 a()"));
	bridge.add_breadcrumb("early", "error");

	assert!(transport.fetch_and_clear_envelopes().is_empty());
}

#[test]
fn concurrent_callers_keep_trace_on_their_own_event() {
	let transport = TestTransport::new();
	let bridge = Arc::new(bridge_with(Arc::new(Arc::clone(&transport))));
	let (tx, rx) = mpsc::channel();

	let handles: Vec<_> = (0..4)
		.map(|worker| {
			let bridge = Arc::clone(&bridge);
			let tx = tx.clone();
			thread::spawn(move || {
				for i in 0..200 {
					let key = format!("w{worker}i{i}");
					if worker % 2 == 0 {
						let trace = format!("#0 {key}()");
						bridge.capture_foreign_exception_with_trace(&key, "E", Some(&trace));
					} else {
						bridge.add_breadcrumb(&key, "info");
						bridge.capture_foreign_exception(&key, "E");
					}
				}
				tx.send(worker).unwrap();
			})
		})
		.collect();
	drop(tx);

	let deadline = Instant::now() + Duration::from_secs(20);
	let mut finished = 0;
	while finished < handles.len() {
		let left = deadline.saturating_duration_since(Instant::now());
		rx.recv_timeout(left)
			.unwrap_or_else(|_| panic!("only {finished}/4 workers finished"));
		finished += 1;
	}
	for handle in handles {
		handle.join().unwrap();
	}

	let events = events(&transport);
	assert_eq!(events.len(), 800);
	for event in &events {
		let value = event.exception.values[0].value.as_deref().unwrap_or_default();
		let key = value.split(' ').next().unwrap_or_default();
		let worker: usize = key[1..key.find('i').unwrap()].parse().unwrap();
		if worker % 2 == 0 {
			assert_eq!(
				event.extra.get("cpp_stacktrace"),
				Some(&serde_json::Value::from(format!("#0 {key}()")))
			);
			assert_eq!(event.tags.get("exception_source").map(String::as_str), Some("cpp"));
		} else {
			assert!(!event.extra.contains_key("cpp_stacktrace"));
			assert!(!event.tags.contains_key("exception_source"));
		}
	}
}

/// Transport that accepts envelopes and never delivers them.
#[derive(Default)]
struct StalledTransport {
	queued: Mutex<Vec<Envelope>>,
}

impl Transport for StalledTransport {
	fn send_envelope(&self, envelope: Envelope) {
		self.queued.lock().unwrap().push(envelope);
	}

	fn flush(&self, timeout: Duration) -> bool {
		std::thread::sleep(timeout);
		false
	}

	fn shutdown(&self, timeout: Duration) -> bool {
		self.flush(timeout)
	}
}

#[test]
fn flush_returns_within_bound_when_undeliverable() {
	let transport = Arc::new(StalledTransport::default());
	let bridge = bridge_with(Arc::new(Arc::clone(&transport)));

	bridge.capture_message("stuck");
	assert_eq!(transport.queued.lock().unwrap().len(), 1);

	let timeout = Duration::from_millis(200);
	let started = Instant::now();
	let drained = bridge.flush(timeout);

	assert!(!drained);
	assert!(started.elapsed() < timeout + Duration::from_secs(2));
}
