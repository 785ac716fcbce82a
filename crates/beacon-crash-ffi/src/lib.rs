// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! # beacon-crash-ffi
//!
//! C ABI over the process-wide [`TelemetryBridge`], so native (C/C++) code
//! can report exceptions and leave breadcrumbs through the same SDK client
//! as the Rust side of the process.
//!
//! Building produces `libbeacon_crash_ffi.so` / `libbeacon_crash_ffi.a`;
//! the declarations live in `include/beacon_crash.h`.
//!
//! ## Usage from C
//!
//! ```c
//! #include <beacon_crash.h>
//!
//! int main() {
//!     beacon_crash_init("https://key@o0.ingest.sentry.io/0", "1.4.2");
//!     beacon_crash_add_breadcrumb("map loaded", "info");
//!
//!     beacon_crash_capture_exception("div by zero", "ArithmeticError",
//!                                    "#0 foo()\n#1 bar()");
//!
//!     beacon_crash_flush(2000);
//!     beacon_crash_shutdown(2000);
//! }
//! ```
//!
//! No entry point lets a panic unwind into the caller; a panic is reported
//! as [`BeaconStatus::Panicked`].

use std::ffi::{c_char, c_int, CStr};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use beacon_crash::TelemetryBridge;
use tracing::error;

static BRIDGE: OnceLock<Arc<TelemetryBridge>> = OnceLock::new();

/// Status codes returned by the C entry points.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeaconStatus {
	/// Success, including calls skipped because reporting is not running
	Ok = 0,
	/// A required pointer argument was NULL
	NullPointer = 1,
	/// A string argument was not valid UTF-8
	InvalidUtf8 = 2,
	/// The SDK rejected its configuration
	InitFailed = 3,
	/// The call panicked inside the library
	Panicked = 4,
}

/// The process-wide bridge, created over the Sentry SDK on first use.
pub fn bridge() -> &'static Arc<TelemetryBridge> {
	BRIDGE.get_or_init(|| Arc::new(TelemetryBridge::sentry()))
}

/// Makes `bridge` the process-wide bridge. Fails with the given bridge if
/// one is already in place.
///
/// Rust hosts call this before any C code runs when they want to share a
/// bridge they built themselves.
pub fn install_bridge(bridge: Arc<TelemetryBridge>) -> Result<(), Arc<TelemetryBridge>> {
	BRIDGE.set(bridge)
}

/// Library version as a static NUL-terminated string, e.g. "0.1.0".
#[no_mangle]
pub extern "C" fn beacon_crash_version() -> *const c_char {
	concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

/// Initializes crash reporting. Later calls return `Ok` without effect.
///
/// An empty `release` means no release is reported.
///
/// # Safety
///
/// `dsn` and `release` must be NULL or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn beacon_crash_init(
	dsn: *const c_char,
	release: *const c_char,
) -> BeaconStatus {
	guarded(|| {
		let dsn = read_str(dsn)?;
		let release = read_str(release)?;
		match bridge().init(dsn, release) {
			Ok(()) => Ok(BeaconStatus::Ok),
			Err(e) => {
				error!(error = %e, "Native init rejected");
				Ok(BeaconStatus::InitFailed)
			}
		}
	})
}

/// Captures a plain message.
///
/// # Safety
///
/// `message` must be NULL or point to a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn beacon_crash_capture_message(message: *const c_char) -> BeaconStatus {
	guarded(|| {
		let message = read_str(message)?;
		bridge().capture_message(message);
		Ok(BeaconStatus::Ok)
	})
}

/// Captures a native exception. `stacktrace` may be NULL; when non-empty it
/// is attached to this event only.
///
/// # Safety
///
/// `message`, `kind` and `stacktrace` must each be NULL or point to a
/// NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn beacon_crash_capture_exception(
	message: *const c_char,
	kind: *const c_char,
	stacktrace: *const c_char,
) -> BeaconStatus {
	guarded(|| {
		let message = read_str(message)?;
		let kind = read_str(kind)?;
		let stacktrace = if stacktrace.is_null() {
			None
		} else {
			Some(read_str(stacktrace)?)
		};
		bridge().capture_foreign_exception_with_trace(message, kind, stacktrace);
		Ok(BeaconStatus::Ok)
	})
}

/// Adds a log breadcrumb. `level` is one of debug/info/warning/error in any
/// case; anything else is recorded as info.
///
/// # Safety
///
/// `message` and `level` must be NULL or point to NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn beacon_crash_add_breadcrumb(
	message: *const c_char,
	level: *const c_char,
) -> BeaconStatus {
	guarded(|| {
		let message = read_str(message)?;
		let level = read_str(level)?;
		bridge().add_breadcrumb(message, level);
		Ok(BeaconStatus::Ok)
	})
}

/// Waits up to `timeout_ms` for queued events. Returns 1 when everything was
/// delivered, 0 otherwise.
#[no_mangle]
pub extern "C" fn beacon_crash_flush(timeout_ms: u32) -> c_int {
	let drained = panic::catch_unwind(|| {
		bridge().flush(Duration::from_millis(u64::from(timeout_ms)))
	})
	.unwrap_or(false);
	c_int::from(drained)
}

/// Flushes and closes the SDK client. Reporting stays off afterwards.
#[no_mangle]
pub extern "C" fn beacon_crash_shutdown(timeout_ms: u32) -> BeaconStatus {
	guarded(|| {
		bridge().shutdown(Duration::from_millis(u64::from(timeout_ms)));
		Ok(BeaconStatus::Ok)
	})
}

fn guarded(f: impl FnOnce() -> Result<BeaconStatus, BeaconStatus>) -> BeaconStatus {
	match panic::catch_unwind(AssertUnwindSafe(f)) {
		Ok(Ok(status)) | Ok(Err(status)) => status,
		Err(_) => BeaconStatus::Panicked,
	}
}

/// # Safety
///
/// `ptr` must be NULL or point to a NUL-terminated string that outlives `'a`.
unsafe fn read_str<'a>(ptr: *const c_char) -> Result<&'a str, BeaconStatus> {
	if ptr.is_null() {
		return Err(BeaconStatus::NullPointer);
	}
	CStr::from_ptr(ptr)
		.to_str()
		.map_err(|_| BeaconStatus::InvalidUtf8)
}
