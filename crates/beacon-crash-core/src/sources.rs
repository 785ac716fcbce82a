// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: TOML files and environment variables. Built-in
//! defaults are applied by [`CrashConfigLayer::finalize`].

use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, trace};

use crate::config::{CrashConfig, CrashConfigLayer};
use crate::error::CrashError;

/// Prefix for environment variables read by [`EnvSource`].
pub const ENV_PREFIX: &str = "BEACON_CRASH";

/// Where a layer came from. Later variants override earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	ConfigFile,
	Environment,
}

/// Produces one partial configuration layer.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<CrashConfigLayer, CrashError>;
}

/// A `crash.toml` file. A file that does not exist contributes nothing.
pub struct FileSource {
	path: PathBuf,
}

impl FileSource {
	pub fn at(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// `$XDG_CONFIG_HOME/beacon/crash.toml`, if the platform has a config directory.
	pub fn user_config() -> Option<Self> {
		let dir = dirs::config_dir()?;
		Some(Self::at(dir.join("beacon").join("crash.toml")))
	}
}

impl ConfigSource for FileSource {
	fn name(&self) -> &'static str {
		"crash-toml"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<CrashConfigLayer, CrashError> {
		let content = match std::fs::read_to_string(&self.path) {
			Ok(content) => content,
			Err(e) if e.kind() == ErrorKind::NotFound => {
				debug!(path = %self.path.display(), "no crash config file");
				return Ok(CrashConfigLayer::default());
			}
			Err(source) => {
				return Err(CrashError::FileRead {
					path: self.path.clone(),
					source,
				})
			}
		};

		let layer = toml::from_str::<CrashConfigLayer>(&content).map_err(|source| {
			CrashError::TomlParse {
				path: self.path.clone(),
				source,
			}
		})?;
		trace!(path = %self.path.display(), dsn_set = layer.dsn.is_some(), "read crash config file");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `<PREFIX>_<FIELD>`, e.g. `BEACON_CRASH_DSN`.
pub struct EnvSource {
	prefix: String,
}

impl EnvSource {
	pub fn with_prefix(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}

	fn var(&self, field: &str) -> Option<String> {
		env_var(&format!("{}_{}", self.prefix, field))
	}

	fn flag(&self, field: &str) -> Option<bool> {
		self.var(field)
			.map(|v| v.eq_ignore_ascii_case("true") || v == "1")
	}

	fn parsed<T: std::str::FromStr>(&self, field: &str, kind: &str) -> Result<Option<T>, CrashError> {
		let key = format!("{}_{}", self.prefix, field);
		match env_var(&key) {
			Some(v) => v.parse().map(Some).map_err(|_| CrashError::InvalidValue {
				key,
				message: format!("invalid {kind} value '{v}'"),
			}),
			None => Ok(None),
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::with_prefix(ENV_PREFIX)
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<CrashConfigLayer, CrashError> {
		debug!(prefix = %self.prefix, "loading environment variables");
		Ok(CrashConfigLayer {
			dsn: self.var("DSN"),
			release: self.var("RELEASE"),
			environment: self.var("ENVIRONMENT"),
			debug: self.flag("DEBUG"),
			sample_rate: self.parsed("SAMPLE_RATE", "f64")?,
			auto_session_tracking: self.flag("AUTO_SESSION_TRACKING"),
			attach_stacktrace: self.flag("ATTACH_STACKTRACE"),
			max_breadcrumbs: self.parsed("MAX_BREADCRUMBS", "usize")?,
			flush_timeout_ms: self.parsed("FLUSH_TIMEOUT_MS", "u64")?,
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn load_from(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<CrashConfig, CrashError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = CrashConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	merged.finalize()
}

/// Resolves the configuration from the user's `crash.toml` and `BEACON_CRASH_*`
/// variables. Environment variables win, and fields neither sets take the
/// built-in defaults.
pub fn load_config() -> Result<CrashConfig, CrashError> {
	let mut sources: Vec<Box<dyn ConfigSource>> = vec![Box::new(EnvSource::default())];
	sources.extend(
		FileSource::user_config().map(|file| Box::new(file) as Box<dyn ConfigSource>),
	);
	load_from(sources)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<CrashConfig, CrashError> {
	load_from(vec![
		Box::new(FileSource::at(config_path)),
		Box::new(EnvSource::default()),
	])
}
