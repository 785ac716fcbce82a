// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Breadcrumb types for the telemetry trail (events leading up to a report).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CrashError;

/// Category stamped on breadcrumbs that originate from log output.
pub const LOG_CATEGORY: &str = "log";

/// One step of the trail that precedes a report. Data fields are attached
/// to the backend breadcrumb as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breadcrumb {
	pub timestamp: DateTime<Utc>,
	pub category: String,
	pub message: Option<String>,
	pub level: BreadcrumbLevel,
	#[serde(default)]
	pub data: serde_json::Map<String, serde_json::Value>,
}

impl Breadcrumb {
	/// Starts a breadcrumb stamped with the current time and no payload.
	pub fn new(category: impl Into<String>, level: BreadcrumbLevel) -> Self {
		Self {
			timestamp: Utc::now(),
			category: category.into(),
			message: None,
			level,
			data: serde_json::Map::new(),
		}
	}

	/// Builds a log-origin breadcrumb, resolving `level` leniently.
	pub fn log(message: impl Into<String>, level: &str) -> Self {
		Self::new(LOG_CATEGORY, BreadcrumbLevel::from_name_or_info(level)).with_message(message)
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	pub fn with_data(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.data.insert(key.into(), value.into());
		self
	}
}

/// Severity level of a breadcrumb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreadcrumbLevel {
	Debug,
	Info,
	Warning,
	Error,
}

impl BreadcrumbLevel {
	const ALL: [Self; 4] = [Self::Debug, Self::Info, Self::Warning, Self::Error];

	/// The lowercase wire name, as accepted by [`BreadcrumbLevel::from_str`].
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Debug => "debug",
			Self::Info => "info",
			Self::Warning => "warning",
			Self::Error => "error",
		}
	}

	/// Resolves a level name case-insensitively, falling back to `Info` for
	/// anything unrecognized (including the empty string).
	pub fn from_name_or_info(name: &str) -> Self {
		name.parse().unwrap_or(Self::Info)
	}

	/// Maps a `tracing` level onto the breadcrumb scale.
	///
	/// `DEBUG` and `TRACE` both collapse to [`BreadcrumbLevel::Debug`].
	pub fn from_tracing(level: &tracing::Level) -> Self {
		match *level {
			tracing::Level::ERROR => Self::Error,
			tracing::Level::WARN => Self::Warning,
			tracing::Level::INFO => Self::Info,
			_ => Self::Debug,
		}
	}
}

impl fmt::Display for BreadcrumbLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for BreadcrumbLevel {
	type Err = CrashError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|level| level.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| CrashError::InvalidBreadcrumbLevel(s.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn any_case(word: &'static str) -> impl Strategy<Value = String> {
		proptest::collection::vec(any::<bool>(), word.len()).prop_map(move |upper| {
			word
				.chars()
				.zip(upper)
				.map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
				.collect()
		})
	}

	#[test]
	fn test_known_levels() {
		assert_eq!(BreadcrumbLevel::from_name_or_info("debug"), BreadcrumbLevel::Debug);
		assert_eq!(BreadcrumbLevel::from_name_or_info("info"), BreadcrumbLevel::Info);
		assert_eq!(BreadcrumbLevel::from_name_or_info("warning"), BreadcrumbLevel::Warning);
		assert_eq!(BreadcrumbLevel::from_name_or_info("error"), BreadcrumbLevel::Error);
	}

	#[test]
	fn test_unknown_levels_fall_back_to_info() {
		assert_eq!(BreadcrumbLevel::from_name_or_info("bogus"), BreadcrumbLevel::Info);
		assert_eq!(BreadcrumbLevel::from_name_or_info(""), BreadcrumbLevel::Info);
		// "warn" is the tracing spelling, not ours
		assert_eq!(BreadcrumbLevel::from_name_or_info("warn"), BreadcrumbLevel::Info);
	}

	#[test]
	fn test_strict_parse_rejects_unknown() {
		let err = "fatal".parse::<BreadcrumbLevel>().unwrap_err();
		assert!(matches!(err, CrashError::InvalidBreadcrumbLevel(ref s) if s == "fatal"));
	}

	#[test]
	fn test_from_tracing() {
		assert_eq!(BreadcrumbLevel::from_tracing(&tracing::Level::ERROR), BreadcrumbLevel::Error);
		assert_eq!(BreadcrumbLevel::from_tracing(&tracing::Level::WARN), BreadcrumbLevel::Warning);
		assert_eq!(BreadcrumbLevel::from_tracing(&tracing::Level::INFO), BreadcrumbLevel::Info);
		assert_eq!(BreadcrumbLevel::from_tracing(&tracing::Level::DEBUG), BreadcrumbLevel::Debug);
		assert_eq!(BreadcrumbLevel::from_tracing(&tracing::Level::TRACE), BreadcrumbLevel::Debug);
	}

	#[test]
	fn test_log_breadcrumb() {
		let crumb = Breadcrumb::log("disk almost full", "WARNING");
		assert_eq!(crumb.category, LOG_CATEGORY);
		assert_eq!(crumb.message.as_deref(), Some("disk almost full"));
		assert_eq!(crumb.level, BreadcrumbLevel::Warning);
		assert!(crumb.data.is_empty());
	}

	#[test]
	fn test_builder_collects_data() {
		let crumb = Breadcrumb::new("http", BreadcrumbLevel::Error)
			.with_message("GET /tiles failed")
			.with_data("status", 503)
			.with_data("retry", true);
		assert_eq!(crumb.category, "http");
		assert_eq!(crumb.data["status"], serde_json::json!(503));
		assert_eq!(crumb.data["retry"], serde_json::json!(true));
	}

	#[test]
	fn test_level_names_parse_back() {
		for level in BreadcrumbLevel::ALL {
			assert_eq!(level.to_string().parse::<BreadcrumbLevel>().unwrap(), level);
		}
	}

	proptest! {
		#[test]
		fn level_names_match_in_any_case(
			(word, expected) in prop_oneof![
				Just(("debug", BreadcrumbLevel::Debug)),
				Just(("info", BreadcrumbLevel::Info)),
				Just(("warning", BreadcrumbLevel::Warning)),
				Just(("error", BreadcrumbLevel::Error)),
			].prop_flat_map(|(word, level)| (any_case(word), Just(level)))
		) {
			prop_assert_eq!(BreadcrumbLevel::from_name_or_info(&word), expected);
		}

		#[test]
		fn unrecognized_names_are_info(name in "[a-z]{0,12}") {
			prop_assume!(!["debug", "info", "warning", "error"].contains(&name.as_str()));
			prop_assert_eq!(BreadcrumbLevel::from_name_or_info(&name), BreadcrumbLevel::Info);
		}
	}
}
