// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: report a native exception through the bridge.
//!
//! Run with:
//!   BEACON_CRASH_DSN=https://key@o0.ingest.sentry.io/0 cargo run --example capture -p beacon-crash

use std::sync::Arc;

use beacon_crash::{Breadcrumb, BreadcrumbLayer, BreadcrumbLevel, TelemetryBridge};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
	let bridge = Arc::new(TelemetryBridge::sentry());

	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with(tracing_subscriber::fmt::layer())
		.with(BreadcrumbLayer::new(Arc::clone(&bridge)))
		.init();

	// ~/.config/beacon/crash.toml < BEACON_CRASH_* variables, built-in defaults for the rest
	let config = beacon_crash::load_config()?;
	println!("Initializing crash reporting...");
	println!("  Release: {}", config.release.as_deref().unwrap_or("<none>"));
	println!("  Environment: {}", config.environment.as_deref().unwrap_or("<none>"));

	bridge.init_with_config(config)?;
	bridge.install_panic_hook();

	tracing::info!(target: "capture_example", "Application started");
	bridge.add_breadcrumb("User opened the map view", "info");
	bridge.record_breadcrumb(
		Breadcrumb::new("http", BreadcrumbLevel::Warning)
			.with_message("GET /tiles/12/2048/1361 failed")
			.with_data("status", 504),
	);

	println!("\nCapturing native exception...");
	let event_id = bridge.capture_foreign_exception_with_trace(
		"Division by zero in tile projection",
		"ArithmeticError",
		Some("  #0 project_tile (src/projection.cpp)\n  #1 render_frame (src/render.cpp)"),
	);
	match event_id {
		Some(id) => println!("  Event ID: {}", id),
		None => println!("  Not captured"),
	}

	println!("\nFlushing...");
	let delivered = bridge.flush_default();
	println!("  Delivered: {}", delivered);

	bridge.shutdown(bridge.flush_timeout());
	println!("\nDone!");
	Ok(())
}
