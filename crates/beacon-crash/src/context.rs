// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Extra data and tags carried by a single captured event.

use std::collections::BTreeMap;

use beacon_crash_core::{CPP_EXCEPTION_SOURCE, CPP_STACKTRACE_EXTRA, EXCEPTION_SOURCE_TAG};

/// Context that travels with one event and is never written to a shared
/// scope, so concurrent captures cannot see each other's values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventContext {
	pub extra: BTreeMap<String, String>,
	pub tags: BTreeMap<String, String>,
}

impl EventContext {
	/// Native stack trace as `cpp_stacktrace` plus the `exception_source=cpp` tag.
	pub fn native_trace(stack_trace: &str) -> Self {
		Self::default()
			.with_extra(CPP_STACKTRACE_EXTRA, stack_trace)
			.with_tag(EXCEPTION_SOURCE_TAG, CPP_EXCEPTION_SOURCE)
	}

	pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra.insert(key.into(), value.into());
		self
	}

	pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.tags.insert(key.into(), value.into());
		self
	}

	pub fn is_empty(&self) -> bool {
		self.extra.is_empty() && self.tags.is_empty()
	}
}
