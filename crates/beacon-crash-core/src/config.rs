// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bridge configuration: a partial layer per source, merged then finalized.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CrashError, Result};

/// Default bound for a blocking flush, in milliseconds.
pub const DEFAULT_FLUSH_TIMEOUT_MS: u64 = 2000;

const DEFAULT_SAMPLE_RATE: f64 = 1.0;
const DEFAULT_MAX_BREADCRUMBS: usize = 100;

/// One configuration source's view. Every field is optional so that layers
/// can be stacked by precedence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CrashConfigLayer {
	pub dsn: Option<String>,
	pub release: Option<String>,
	pub environment: Option<String>,
	pub debug: Option<bool>,
	pub sample_rate: Option<f64>,
	pub auto_session_tracking: Option<bool>,
	pub attach_stacktrace: Option<bool>,
	pub max_breadcrumbs: Option<usize>,
	pub flush_timeout_ms: Option<u64>,
}

impl CrashConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.dsn.is_some() {
			self.dsn = other.dsn;
		}
		if other.release.is_some() {
			self.release = other.release;
		}
		if other.environment.is_some() {
			self.environment = other.environment;
		}
		if other.debug.is_some() {
			self.debug = other.debug;
		}
		if other.sample_rate.is_some() {
			self.sample_rate = other.sample_rate;
		}
		if other.auto_session_tracking.is_some() {
			self.auto_session_tracking = other.auto_session_tracking;
		}
		if other.attach_stacktrace.is_some() {
			self.attach_stacktrace = other.attach_stacktrace;
		}
		if other.max_breadcrumbs.is_some() {
			self.max_breadcrumbs = other.max_breadcrumbs;
		}
		if other.flush_timeout_ms.is_some() {
			self.flush_timeout_ms = other.flush_timeout_ms;
		}
	}

	pub fn finalize(self) -> Result<CrashConfig> {
		let dsn = self
			.dsn
			.filter(|d| !d.trim().is_empty())
			.ok_or(CrashError::MissingDsn)?;

		let sample_rate = self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE);
		if !(0.0..=1.0).contains(&sample_rate) {
			return Err(CrashError::InvalidSampleRate(sample_rate));
		}

		Ok(CrashConfig {
			dsn,
			release: self.release,
			environment: self.environment,
			debug: self.debug.unwrap_or(false),
			sample_rate,
			auto_session_tracking: self.auto_session_tracking.unwrap_or(true),
			attach_stacktrace: self.attach_stacktrace.unwrap_or(true),
			max_breadcrumbs: self.max_breadcrumbs.unwrap_or(DEFAULT_MAX_BREADCRUMBS),
			flush_timeout_ms: self.flush_timeout_ms.unwrap_or(DEFAULT_FLUSH_TIMEOUT_MS),
		})
	}
}

/// Fully resolved bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrashConfig {
	/// Backend destination and credentials.
	pub dsn: String,
	/// Version tag attached to every event.
	pub release: Option<String>,
	pub environment: Option<String>,
	/// Enables the SDK's own diagnostic output.
	pub debug: bool,
	/// Fraction of events sent, 0.0..=1.0.
	pub sample_rate: f64,
	pub auto_session_tracking: bool,
	/// Attach a stack trace to message events as well as errors.
	pub attach_stacktrace: bool,
	pub max_breadcrumbs: usize,
	pub flush_timeout_ms: u64,
}

impl CrashConfig {
	/// Builds a configuration from a DSN and release with defaults for the rest.
	pub fn new(dsn: impl Into<String>, release: impl Into<String>) -> Result<Self> {
		CrashConfigLayer {
			dsn: Some(dsn.into()),
			release: Some(release.into()).filter(|r| !r.is_empty()),
			..Default::default()
		}
		.finalize()
	}

	pub fn flush_timeout(&self) -> Duration {
		Duration::from_millis(self.flush_timeout_ms)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_finalize_defaults() {
		let config = CrashConfig::new("https://key@sentry.example/1", "v1.0").unwrap();
		assert_eq!(config.release.as_deref(), Some("v1.0"));
		assert!(!config.debug);
		assert_eq!(config.sample_rate, 1.0);
		assert!(config.auto_session_tracking);
		assert!(config.attach_stacktrace);
		assert_eq!(config.max_breadcrumbs, 100);
		assert_eq!(config.flush_timeout(), Duration::from_millis(2000));
	}

	#[test]
	fn test_finalize_requires_dsn() {
		let result = CrashConfigLayer::default().finalize();
		assert!(matches!(result, Err(CrashError::MissingDsn)));

		let result = CrashConfigLayer {
			dsn: Some("   ".to_string()),
			..Default::default()
		}
		.finalize();
		assert!(matches!(result, Err(CrashError::MissingDsn)));
	}

	#[test]
	fn test_finalize_rejects_sample_rate_out_of_range() {
		let result = CrashConfigLayer {
			dsn: Some("https://key@sentry.example/1".to_string()),
			sample_rate: Some(1.5),
			..Default::default()
		}
		.finalize();
		assert!(matches!(result, Err(CrashError::InvalidSampleRate(r)) if r == 1.5));
	}

	#[test]
	fn test_empty_release_is_none() {
		let config = CrashConfig::new("https://key@sentry.example/1", "").unwrap();
		assert!(config.release.is_none());
	}

	#[test]
	fn test_merge_overwrites() {
		let mut base = CrashConfigLayer {
			dsn: Some("https://old@sentry.example/1".to_string()),
			debug: Some(false),
			..Default::default()
		};
		base.merge(CrashConfigLayer {
			dsn: Some("https://new@sentry.example/2".to_string()),
			..Default::default()
		});
		assert_eq!(base.dsn.as_deref(), Some("https://new@sentry.example/2"));
		assert_eq!(base.debug, Some(false));
	}

	#[test]
	fn test_merge_preserves_base_when_none() {
		let mut base = CrashConfigLayer {
			release: Some("1.2.3".to_string()),
			sample_rate: Some(0.25),
			..Default::default()
		};
		base.merge(CrashConfigLayer::default());
		assert_eq!(base.release.as_deref(), Some("1.2.3"));
		assert_eq!(base.sample_rate, Some(0.25));
	}
}
