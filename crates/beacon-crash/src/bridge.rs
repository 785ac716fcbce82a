// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The telemetry bridge: an idempotent front for a crash-reporting SDK.

use std::error::Error;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use beacon_crash_core::{
	Breadcrumb, CrashConfig, EventId, ForeignException, Result, DEFAULT_FLUSH_TIMEOUT_MS,
};
use tracing::{debug, error, info, warn};

use crate::panic_hook;
use crate::context::EventContext;
use crate::sdk::CrashSdk;
use crate::sentry_sdk::SentrySdk;

const UNINITIALIZED: u8 = 0;
const INITIALIZING: u8 = 1;
const INITIALIZED: u8 = 2;
const CLOSED: u8 = 3;

/// Lifecycle of a bridge. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
	Uninitialized,
	/// One caller is configuring the SDK.
	Initializing,
	Initialized,
	/// Shut down; every operation is skipped.
	Closed,
}

impl BridgeState {
	fn from_raw(raw: u8) -> Self {
		match raw {
			UNINITIALIZED => Self::Uninitialized,
			INITIALIZING => Self::Initializing,
			INITIALIZED => Self::Initialized,
			_ => Self::Closed,
		}
	}
}

/// Front for a crash-reporting SDK that native and Rust code can call from
/// any thread.
///
/// Every operation other than init is skipped with a warning until the
/// bridge has been initialized. Init is idempotent: across any number of
/// concurrent callers the SDK is configured once.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use beacon_crash::TelemetryBridge;
///
/// let bridge = Arc::new(TelemetryBridge::sentry());
/// bridge.init("https://key@sentry.example/1", env!("CARGO_PKG_VERSION"))?;
/// bridge.install_panic_hook();
///
/// bridge.add_breadcrumb("map loaded", "info");
/// bridge.capture_foreign_exception_with_trace(
///     "div by zero",
///     "ArithmeticError",
///     Some("#0 foo()\n#1 bar()"),
/// );
/// bridge.flush_default();
/// ```
pub struct TelemetryBridge {
	sdk: Box<dyn CrashSdk>,
	state: AtomicU8,
	flush_timeout_ms: AtomicU64,
}

impl TelemetryBridge {
	pub fn new(sdk: impl CrashSdk + 'static) -> Self {
		Self {
			sdk: Box::new(sdk),
			state: AtomicU8::new(UNINITIALIZED),
			flush_timeout_ms: AtomicU64::new(DEFAULT_FLUSH_TIMEOUT_MS),
		}
	}

	/// A bridge over the Sentry SDK bound to the process hub.
	pub fn sentry() -> Self {
		Self::new(SentrySdk::new())
	}

	pub fn state(&self) -> BridgeState {
		BridgeState::from_raw(self.state.load(Ordering::Acquire))
	}

	pub fn is_initialized(&self) -> bool {
		self.state() == BridgeState::Initialized
	}

	/// Initializes crash reporting with default options.
	///
	/// Returns immediately if the bridge is already initialized, without
	/// looking at the arguments.
	pub fn init(&self, dsn: &str, release: &str) -> Result<()> {
		if self.state() != BridgeState::Uninitialized {
			return self.init_with_config_skipped();
		}
		self.init_with_config(CrashConfig::new(dsn, release)?)
	}

	/// Initializes crash reporting from a full configuration.
	pub fn init_with_config(&self, config: CrashConfig) -> Result<()> {
		if self
			.state
			.compare_exchange(UNINITIALIZED, INITIALIZING, Ordering::AcqRel, Ordering::Acquire)
			.is_err()
		{
			return self.init_with_config_skipped();
		}

		let attempt = InitAttempt { state: &self.state };
		if let Err(e) = self.sdk.initialize(&config) {
			error!(error = %e, "Crash reporting initialization failed");
			return Err(e);
		}
		attempt.commit();

		self.flush_timeout_ms
			.store(config.flush_timeout_ms, Ordering::Relaxed);

		if self
			.state
			.compare_exchange(INITIALIZING, INITIALIZED, Ordering::AcqRel, Ordering::Acquire)
			.is_err()
		{
			// shut down while we were configuring
			self.sdk.close(config.flush_timeout());
			return Ok(());
		}

		info!(
			release = config.release.as_deref().unwrap_or("<none>"),
			"Crash reporting initialized"
		);
		Ok(())
	}

	fn init_with_config_skipped(&self) -> Result<()> {
		match self.state() {
			BridgeState::Closed => warn!("Crash reporting has been shut down, ignoring init"),
			_ => debug!("Crash reporting already initialized"),
		}
		Ok(())
	}

	/// Installs a panic hook that reports panics through this bridge.
	pub fn install_panic_hook(self: &Arc<Self>) {
		panic_hook::install_panic_hook(Arc::clone(self));
		info!("Panic hook installed");
	}

	/// Captures a plain message at info level.
	pub fn capture_message(&self, message: &str) -> Option<EventId> {
		if !self.ready("capture_message") {
			return None;
		}
		Some(self.sdk.capture_message(message))
	}

	/// Captures a Rust error value.
	pub fn capture_error(&self, error: &(dyn Error + 'static)) -> Option<EventId> {
		if !self.ready("capture_error") {
			return None;
		}
		Some(self.sdk.capture_error(error, &EventContext::default()))
	}

	/// Captures an exception that has no Rust error value behind it.
	pub fn capture_foreign_exception(&self, message: &str, kind: &str) -> Option<EventId> {
		self.capture_foreign_exception_with_trace(message, kind, None)
	}

	/// Captures a foreign exception. A non-empty `native_stack_trace` is
	/// attached to this event only, together with the `exception_source`
	/// tag; no other event sees either.
	pub fn capture_foreign_exception_with_trace(
		&self,
		message: &str,
		kind: &str,
		native_stack_trace: Option<&str>,
	) -> Option<EventId> {
		if !self.ready("capture_foreign_exception") {
			return None;
		}

		let exception = ForeignException::new(message, kind);
		let context = native_stack_trace
			.filter(|trace| !trace.is_empty())
			.map(EventContext::native_trace)
			.unwrap_or_default();
		let event_id = self.sdk.capture_error(&exception, &context);

		debug!(event_id = %event_id, kind, "Foreign exception captured");
		Some(event_id)
	}

	/// Adds a log breadcrumb. `level` is matched case-insensitively against
	/// debug/info/warning/error; anything else becomes info.
	pub fn add_breadcrumb(&self, message: &str, level: &str) {
		self.record_breadcrumb(Breadcrumb::log(message, level));
	}

	/// Adds a fully built breadcrumb.
	pub fn record_breadcrumb(&self, breadcrumb: Breadcrumb) {
		if !self.ready("add_breadcrumb") {
			return;
		}
		self.sdk.add_breadcrumb(breadcrumb);
	}

	/// Blocks for up to `timeout` while queued events are delivered.
	///
	/// Returns `true` if everything was delivered, `false` on timeout or when
	/// the bridge is not initialized.
	pub fn flush(&self, timeout: Duration) -> bool {
		if !self.ready("flush") {
			return false;
		}
		let drained = self.sdk.flush(timeout);
		if !drained {
			let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
			warn!(timeout_ms, "Flush timed out with events still queued");
		}
		drained
	}

	/// [`flush`](Self::flush) with the configured timeout (2000 ms by default).
	pub fn flush_default(&self) -> bool {
		self.flush(self.flush_timeout())
	}

	pub fn flush_timeout(&self) -> Duration {
		Duration::from_millis(self.flush_timeout_ms.load(Ordering::Relaxed))
	}

	/// Flushes and closes the SDK client. Idempotent; the bridge stays closed.
	pub fn shutdown(&self, timeout: Duration) -> bool {
		let previous = self.state.swap(CLOSED, Ordering::AcqRel);
		match previous {
			INITIALIZED => {
				let closed = self.sdk.close(timeout);
				info!(closed, "Crash reporting shut down");
				closed
			}
			CLOSED => true,
			_ => {
				debug!("Crash reporting closed before initialization");
				true
			}
		}
	}

	fn ready(&self, operation: &'static str) -> bool {
		match self.state() {
			BridgeState::Initialized => true,
			BridgeState::Closed => {
				warn!(operation, "Crash reporting has been shut down, skipping");
				false
			}
			BridgeState::Uninitialized | BridgeState::Initializing => {
				warn!(operation, "Crash reporting not initialized, skipping");
				false
			}
		}
	}
}

/// Returns the state to uninitialized unless committed, so a failed or
/// panicking SDK configuration can be retried.
struct InitAttempt<'a> {
	state: &'a AtomicU8,
}

impl InitAttempt<'_> {
	fn commit(self) {
		std::mem::forget(self);
	}
}

impl Drop for InitAttempt<'_> {
	fn drop(&mut self) {
		let _ = self.state.compare_exchange(
			INITIALIZING,
			UNINITIALIZED,
			Ordering::AcqRel,
			Ordering::Acquire,
		);
	}
}
