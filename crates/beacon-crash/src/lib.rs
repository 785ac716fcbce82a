// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Crash reporting bridge for native hosts.
//!
//! [`TelemetryBridge`] puts an idempotent, thread-safe front on a
//! crash-reporting SDK so that Rust code and a native (C/C++) layer can
//! initialize reporting, leave breadcrumbs and report exceptions without
//! coordinating with each other.
//!
//! - [`SentrySdk`] wraps the `sentry` crate; [`MemorySdk`] records calls
//! - [`BreadcrumbLayer`] turns `tracing` events into breadcrumbs
//! - [`install_panic_hook`] reports panics with a native backtrace
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use beacon_crash::{BreadcrumbLayer, TelemetryBridge};
//! use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
//!
//! let bridge = Arc::new(TelemetryBridge::sentry());
//! bridge.init_with_config(beacon_crash::load_config()?)?;
//! bridge.install_panic_hook();
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(BreadcrumbLayer::new(bridge.clone()))
//!     .init();
//! ```

pub mod backtrace;
pub mod bridge;
pub mod context;
pub mod layer;
pub mod memory;
pub mod panic_hook;
pub mod sdk;
pub mod sentry_sdk;

pub use bridge::{BridgeState, TelemetryBridge};
pub use context::EventContext;
pub use layer::BreadcrumbLayer;
pub use memory::{CapturedEvent, CapturedKind, MemorySdk};
pub use panic_hook::{install_panic_hook, PANIC_KIND};
pub use sdk::CrashSdk;
pub use sentry_sdk::SentrySdk;

// Re-export core types for convenience
pub use beacon_crash_core::{
	load_config, load_config_with_file, Breadcrumb, BreadcrumbLevel, CrashConfig, CrashConfigLayer,
	CrashError, EventId, ForeignException, Result,
};
