// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory [`CrashSdk`] that records every call instead of sending it.
//!
//! Used by tests and by hosts that want a dry run without a backend.

use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use beacon_crash_core::{Breadcrumb, CrashConfig, CrashError, EventId, Result};
use uuid::Uuid;

use crate::context::EventContext;
use crate::sdk::CrashSdk;

/// What kind of event was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedKind {
	Message,
	Error,
}

/// A captured event together with the context it was captured with.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
	pub id: EventId,
	pub kind: CapturedKind,
	/// Message text, or the error's display text.
	pub message: String,
	pub extra: BTreeMap<String, String>,
	pub tags: BTreeMap<String, String>,
	pub breadcrumbs: Vec<Breadcrumb>,
}

#[derive(Default)]
struct MemoryState {
	configs: Vec<CrashConfig>,
	events: Vec<CapturedEvent>,
	breadcrumbs: Vec<Breadcrumb>,
	flushes: Vec<Duration>,
	closed: bool,
	fail_initialize: bool,
	initialize_delay: Duration,
	panic_next_capture: bool,
	undeliverable: bool,
}

/// Recording SDK. Clones share the same recording.
#[derive(Clone, Default)]
pub struct MemorySdk {
	state: Arc<Mutex<MemoryState>>,
}

impl MemorySdk {
	pub fn new() -> Self {
		Self::default()
	}

	/// Makes `initialize` fail with a DSN error.
	pub fn failing_initialize(self) -> Self {
		self.lock().fail_initialize = true;
		self
	}

	/// Makes `initialize` sleep before returning, to widen init races.
	pub fn slow_initialize(self, delay: Duration) -> Self {
		self.lock().initialize_delay = delay;
		self
	}

	/// Makes the next capture panic inside the SDK.
	pub fn panicking_capture(self) -> Self {
		self.lock().panic_next_capture = true;
		self
	}

	/// Makes every flush report that events are still queued.
	pub fn undeliverable(self) -> Self {
		self.lock().undeliverable = true;
		self
	}

	pub fn initialize_calls(&self) -> usize {
		self.lock().configs.len()
	}

	pub fn last_config(&self) -> Option<CrashConfig> {
		self.lock().configs.last().cloned()
	}

	pub fn events(&self) -> Vec<CapturedEvent> {
		self.lock().events.clone()
	}

	pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
		self.lock().breadcrumbs.clone()
	}

	pub fn flushes(&self) -> Vec<Duration> {
		self.lock().flushes.clone()
	}

	pub fn is_closed(&self) -> bool {
		self.lock().closed
	}

	fn lock(&self) -> MutexGuard<'_, MemoryState> {
		// A panicking capture poisons the lock; the recording is still valid.
		self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	fn record(&self, kind: CapturedKind, message: String, context: &EventContext) -> EventId {
		let mut state = self.lock();
		if std::mem::take(&mut state.panic_next_capture) {
			drop(state);
			panic!("capture failed inside SDK");
		}
		let event = CapturedEvent {
			id: Uuid::new_v4(),
			kind,
			message,
			extra: context.extra.clone(),
			tags: context.tags.clone(),
			breadcrumbs: state.breadcrumbs.clone(),
		};
		let id = event.id;
		state.events.push(event);
		id
	}
}

impl CrashSdk for MemorySdk {
	fn initialize(&self, config: &CrashConfig) -> Result<()> {
		let delay = self.lock().initialize_delay;
		if !delay.is_zero() {
			std::thread::sleep(delay);
		}

		let mut state = self.lock();
		if state.fail_initialize {
			return Err(CrashError::invalid_dsn(&config.dsn, "rejected by memory SDK"));
		}
		state.configs.push(config.clone());
		Ok(())
	}

	fn capture_message(&self, message: &str) -> EventId {
		self.record(CapturedKind::Message, message.to_string(), &EventContext::default())
	}

	fn capture_error(&self, error: &(dyn Error + 'static), context: &EventContext) -> EventId {
		self.record(CapturedKind::Error, error.to_string(), context)
	}

	fn add_breadcrumb(&self, breadcrumb: Breadcrumb) {
		self.lock().breadcrumbs.push(breadcrumb);
	}

	fn flush(&self, timeout: Duration) -> bool {
		let mut state = self.lock();
		state.flushes.push(timeout);
		!state.undeliverable
	}

	fn close(&self, _timeout: Duration) -> bool {
		self.lock().closed = true;
		true
	}
}
