// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracing layer that forwards log events to the bridge as breadcrumbs.

use std::fmt;
use std::sync::Arc;

use beacon_crash_core::{Breadcrumb, BreadcrumbLevel, LOG_CATEGORY};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::bridge::TelemetryBridge;

/// Crates whose events never become breadcrumbs, so bridge diagnostics
/// cannot feed back into the trail.
const IGNORED_CRATES: &[&str] = &["beacon_crash", "sentry"];

/// A tracing Layer that turns every log event into a `log` breadcrumb.
///
/// Events are dropped while the bridge is not initialized, when their
/// message is empty, and when they come from this crate or the SDK.
#[derive(Clone)]
pub struct BreadcrumbLayer {
	bridge: Arc<TelemetryBridge>,
}

impl BreadcrumbLayer {
	pub fn new(bridge: Arc<TelemetryBridge>) -> Self {
		Self { bridge }
	}
}

impl<S> Layer<S> for BreadcrumbLayer
where
	S: Subscriber + for<'a> LookupSpan<'a>,
{
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		let metadata = event.metadata();
		if !self.bridge.is_initialized() || is_ignored_target(metadata.target()) {
			return;
		}

		let mut visitor = BreadcrumbVisitor::default();
		event.record(&mut visitor);

		let message = match visitor.message.take() {
			Some(message) if !message.is_empty() => message,
			_ => return,
		};

		let level = BreadcrumbLevel::from_tracing(metadata.level());
		let mut breadcrumb = Breadcrumb::new(LOG_CATEGORY, level).with_message(message);
		breadcrumb.data = visitor.into_data(metadata.target());
		self.bridge.record_breadcrumb(breadcrumb);
	}
}

/// Matches a crate root target or any of its modules, never a crate that
/// merely shares the prefix (`sentry_app`).
fn is_ignored_target(target: &str) -> bool {
	IGNORED_CRATES.iter().any(|krate| {
		target
			.strip_prefix(krate)
			.is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
	})
}

#[derive(Default)]
struct BreadcrumbVisitor {
	message: Option<String>,
	fields: serde_json::Map<String, serde_json::Value>,
}

impl BreadcrumbVisitor {
	fn into_data(mut self, target: &str) -> serde_json::Map<String, serde_json::Value> {
		self.fields
			.insert("target".to_string(), serde_json::Value::from(target));
		self.fields
	}

	fn insert(&mut self, field: &Field, value: serde_json::Value) {
		self.fields.insert(field.name().to_string(), value);
	}
}

impl Visit for BreadcrumbVisitor {
	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		let rendered = format!("{:?}", value);
		if field.name() == "message" {
			self.message = Some(rendered);
		} else {
			self.insert(field, rendered.into());
		}
	}

	fn record_str(&mut self, field: &Field, value: &str) {
		if field.name() == "message" {
			self.message = Some(value.to_string());
		} else {
			self.insert(field, value.into());
		}
	}

	fn record_i64(&mut self, field: &Field, value: i64) {
		self.insert(field, value.into());
	}

	fn record_u64(&mut self, field: &Field, value: u64) {
		self.insert(field, value.into());
	}

	fn record_bool(&mut self, field: &Field, value: bool) {
		self.insert(field, value.into());
	}

	fn record_f64(&mut self, field: &Field, value: f64) {
		self.insert(field, value.into());
	}

	fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
		self.insert(field, value.to_string().into());
	}
}
