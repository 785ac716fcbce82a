// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Beacon crash reporting bridge.
//!
//! This crate provides the types shared by the bridge (`beacon-crash`) and
//! its C ABI (`beacon-crash-ffi`):
//!
//! - [`BreadcrumbLevel`] and [`Breadcrumb`] for the telemetry trail
//! - [`ForeignException`] for exceptions raised outside Rust
//! - [`CrashConfig`], loaded in layers from defaults, TOML and environment
//! - [`CrashError`], the error type for configuration and SDK setup

pub mod breadcrumb;
pub mod config;
pub mod error;
pub mod exception;
pub mod sources;

pub use breadcrumb::{Breadcrumb, BreadcrumbLevel, LOG_CATEGORY};
pub use config::{CrashConfig, CrashConfigLayer, DEFAULT_FLUSH_TIMEOUT_MS};
pub use error::{CrashError, Result};
pub use exception::{ForeignException, CPP_EXCEPTION_SOURCE, CPP_STACKTRACE_EXTRA, EXCEPTION_SOURCE_TAG};
pub use sources::{load_config, load_config_with_file, ConfigSource, EnvSource, FileSource, Precedence};

/// Identifier the SDK assigns to a captured event.
pub type EventId = uuid::Uuid;
