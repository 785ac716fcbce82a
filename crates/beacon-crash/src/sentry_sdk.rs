// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! [`CrashSdk`] backed by the `sentry` crate.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use beacon_crash_core::{Breadcrumb, BreadcrumbLevel, CrashConfig, CrashError, EventId, Result};
use sentry::types::Dsn;
use sentry::protocol::Event;
use sentry::{ClientOptions, Hub, Level, TransportFactory};
use tracing::{debug, info};

use crate::context::EventContext;
use crate::sdk::CrashSdk;

/// Sentry client bound to a hub.
///
/// [`SentrySdk::new`] binds to the process hub so that events from every
/// thread reach the configured client. Events are built here and handed to
/// [`Hub::capture_event`] whole; per-event context never touches the hub's
/// shared scope. Tests and embedders that need
/// isolation pass their own hub to [`SentrySdk::with_hub`].
pub struct SentrySdk {
	hub: Arc<Hub>,
	transport: Option<Arc<dyn TransportFactory>>,
}

impl SentrySdk {
	pub fn new() -> Self {
		Self::with_hub(Hub::main())
	}

	pub fn with_hub(hub: Arc<Hub>) -> Self {
		Self {
			hub,
			transport: None,
		}
	}

	/// Replaces the default HTTP transport.
	pub fn transport(mut self, transport: Arc<dyn TransportFactory>) -> Self {
		self.transport = Some(transport);
		self
	}

	pub fn hub(&self) -> &Arc<Hub> {
		&self.hub
	}

	fn client_options(&self, config: &CrashConfig) -> Result<ClientOptions> {
		let dsn: Dsn = config
			.dsn
			.parse()
			.map_err(|e| CrashError::invalid_dsn(&config.dsn, e))?;

		let mut options = ClientOptions {
			dsn: Some(dsn),
			release: config.release.clone().map(Into::into),
			environment: config.environment.clone().map(Into::into),
			debug: config.debug,
			sample_rate: config.sample_rate as f32,
			auto_session_tracking: config.auto_session_tracking,
			attach_stacktrace: config.attach_stacktrace,
			max_breadcrumbs: config.max_breadcrumbs,
			..Default::default()
		};
		if let Some(transport) = &self.transport {
			options.transport = Some(Arc::clone(transport));
		}

		Ok(sentry::apply_defaults(options))
	}
}

impl Default for SentrySdk {
	fn default() -> Self {
		Self::new()
	}
}

impl CrashSdk for SentrySdk {
	fn initialize(&self, config: &CrashConfig) -> Result<()> {
		let options = self.client_options(config)?;
		let client = Arc::new(sentry::Client::with_options(options));
		self.hub.bind_client(Some(client));

		if config.auto_session_tracking {
			self.hub.start_session();
		}

		info!(
			release = config.release.as_deref().unwrap_or("<none>"),
			sample_rate = config.sample_rate,
			"Sentry client configured"
		);
		Ok(())
	}

	fn capture_message(&self, message: &str) -> EventId {
		self.hub.capture_event(Event {
			message: Some(message.to_string()),
			level: Level::Info,
			..Default::default()
		})
	}

	fn capture_error(&self, error: &(dyn Error + 'static), context: &EventContext) -> EventId {
		let mut event = sentry::event_from_error(error);
		for (key, value) in &context.extra {
			event.extra.insert(key.clone(), value.as_str().into());
		}
		for (key, value) in &context.tags {
			event.tags.insert(key.clone(), value.clone());
		}
		self.hub.capture_event(event)
	}

	fn add_breadcrumb(&self, breadcrumb: Breadcrumb) {
		self.hub.add_breadcrumb(to_sentry_breadcrumb(breadcrumb));
	}

	fn flush(&self, timeout: Duration) -> bool {
		match self.hub.client() {
			Some(client) => client.flush(Some(timeout)),
			None => true,
		}
	}

	fn close(&self, timeout: Duration) -> bool {
		self.hub.end_session();
		let closed = match self.hub.client() {
			Some(client) => client.close(Some(timeout)),
			None => true,
		};
		debug!(closed, "Sentry client closed");
		closed
	}
}

fn to_sentry_level(level: BreadcrumbLevel) -> Level {
	match level {
		BreadcrumbLevel::Debug => Level::Debug,
		BreadcrumbLevel::Info => Level::Info,
		BreadcrumbLevel::Warning => Level::Warning,
		BreadcrumbLevel::Error => Level::Error,
	}
}

fn to_sentry_breadcrumb(breadcrumb: Breadcrumb) -> sentry::Breadcrumb {
	sentry::Breadcrumb {
		timestamp: breadcrumb.timestamp.into(),
		category: Some(breadcrumb.category),
		message: breadcrumb.message,
		level: to_sentry_level(breadcrumb.level),
		data: breadcrumb.data.into_iter().collect(),
		..Default::default()
	}
}
