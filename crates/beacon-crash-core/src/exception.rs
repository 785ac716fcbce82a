// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Synthetic error for exceptions raised outside the Rust runtime.

use thiserror::Error;

/// Event extra holding the native stack trace of a foreign exception.
pub const CPP_STACKTRACE_EXTRA: &str = "cpp_stacktrace";
/// Event tag naming the runtime a foreign exception came from.
pub const EXCEPTION_SOURCE_TAG: &str = "exception_source";
/// Value of [`EXCEPTION_SOURCE_TAG`] for native reports.
pub const CPP_EXCEPTION_SOURCE: &str = "cpp";

/// An exception reported by message and kind only, with no Rust error value
/// behind it (C++ exceptions, panics caught at the FFI boundary).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (native exception type: {kind})")]
pub struct ForeignException {
	pub message: String,
	pub kind: String,
}

impl ForeignException {
	pub fn new(message: impl Into<String>, kind: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			kind: kind.into(),
		}
	}
}
