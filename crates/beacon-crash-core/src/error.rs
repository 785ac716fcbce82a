// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the crash reporting bridge.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring the bridge or the underlying SDK.
#[derive(Debug, Error)]
pub enum CrashError {
	#[error("DSN is required")]
	MissingDsn,

	#[error("invalid DSN '{dsn}': {message}")]
	InvalidDsn { dsn: String, message: String },

	#[error("sample rate must be within 0.0..=1.0, got {0}")]
	InvalidSampleRate(f64),

	#[error("invalid breadcrumb level: {0}")]
	InvalidBreadcrumbLevel(String),

	#[error("invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },

	#[error("failed to read config file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("TOML parse error in {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},
}

impl CrashError {
	pub fn invalid_dsn(dsn: impl Into<String>, message: impl ToString) -> Self {
		Self::InvalidDsn {
			dsn: dsn.into(),
			message: message.to_string(),
		}
	}
}

/// Result type for bridge configuration.
pub type Result<T> = std::result::Result<T, CrashError>;
