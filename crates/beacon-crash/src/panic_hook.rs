// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Panic hook that reports panics through the bridge before the previous
//! hook runs.

use std::any::Any;
use std::sync::Arc;

use crate::backtrace::capture_native_trace;
use crate::bridge::TelemetryBridge;

/// Exception kind reported for Rust panics.
pub const PANIC_KIND: &str = "panic";

/// Installs a panic hook that captures the panic as a foreign exception with
/// the native backtrace attached, flushes, then chains to the previous hook.
pub fn install_panic_hook(bridge: Arc<TelemetryBridge>) {
	let previous = std::panic::take_hook();
	std::panic::set_hook(Box::new(move |info| {
		let message = panic_message(info.payload());
		let location = info
			.location()
			.map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()));
		report_panic(&bridge, &message, location.as_deref());
		previous(info);
	}));
}

/// Reports a panic and waits for delivery. Does nothing before init.
pub fn report_panic(bridge: &TelemetryBridge, message: &str, location: Option<&str>) {
	if !bridge.is_initialized() {
		return;
	}

	let message = match location {
		Some(location) => format!("{message} at {location}"),
		None => message.to_string(),
	};
	let trace = capture_native_trace();

	bridge.capture_foreign_exception_with_trace(&message, PANIC_KIND, Some(&trace));
	bridge.flush_default();
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"panic with non-string payload".to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::MemorySdk;
	use beacon_crash_core::{CPP_STACKTRACE_EXTRA, EXCEPTION_SOURCE_TAG};

	#[test]
	fn test_panic_message_from_str() {
		let payload: Box<dyn Any + Send> = Box::new("static message");
		assert_eq!(panic_message(payload.as_ref()), "static message");
	}

	#[test]
	fn test_panic_message_from_string() {
		let payload: Box<dyn Any + Send> = Box::new(format!("formatted {}", 42));
		assert_eq!(panic_message(payload.as_ref()), "formatted 42");
	}

	#[test]
	fn test_panic_message_other_payload() {
		let payload: Box<dyn Any + Send> = Box::new(17_u32);
		assert_eq!(panic_message(payload.as_ref()), "panic with non-string payload");
	}

	#[test]
	fn test_report_panic_captures_and_flushes() {
		let sdk = MemorySdk::new();
		let bridge = TelemetryBridge::new(sdk.clone());
		bridge.init("https://key@sentry.example/1", "v1.0").unwrap();

		report_panic(&bridge, "index out of bounds", Some("src/map.rs:10:5"));

		let events = sdk.events();
		assert_eq!(events.len(), 1);
		assert!(events[0].message.contains("index out of bounds at src/map.rs:10:5"));
		assert!(events[0].message.contains(PANIC_KIND));
		assert_eq!(sdk.flushes().len(), 1);
		assert_eq!(
			events[0].tags.get(EXCEPTION_SOURCE_TAG).map(String::as_str),
			Some("cpp")
		);
		assert!(events[0].extra.contains_key(CPP_STACKTRACE_EXTRA));
	}

	#[test]
	fn test_report_panic_before_init_is_silent() {
		let sdk = MemorySdk::new();
		let bridge = TelemetryBridge::new(sdk.clone());

		report_panic(&bridge, "early", None);

		assert!(sdk.events().is_empty());
		assert!(sdk.flushes().is_empty());
	}
}
