// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The seam between the bridge and the crash-reporting SDK it wraps.

use std::error::Error;
use std::time::Duration;

use beacon_crash_core::{Breadcrumb, CrashConfig, EventId, Result};

use crate::context::EventContext;

/// Operations the bridge needs from a crash-reporting SDK client.
///
/// Transport, batching, retry and persistence stay behind this trait; the
/// bridge only decides *whether* to call it. Implementations are shared
/// across threads and must not route per-event context through shared
/// mutable state.
pub trait CrashSdk: Send + Sync {
	/// Configures the client. Called at most once per bridge.
	fn initialize(&self, config: &CrashConfig) -> Result<()>;

	fn capture_message(&self, message: &str) -> EventId;

	/// Captures `error` with `context` attached to this event only.
	fn capture_error(&self, error: &(dyn Error + 'static), context: &EventContext) -> EventId;

	fn add_breadcrumb(&self, breadcrumb: Breadcrumb);

	/// Blocks until queued events are delivered or `timeout` elapses.
	/// Returns `true` if the queue drained in time.
	fn flush(&self, timeout: Duration) -> bool;

	/// Flushes, ends the session and disables the client.
	fn close(&self, timeout: Duration) -> bool;
}
