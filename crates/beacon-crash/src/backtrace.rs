// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Native backtrace capture and formatting for panic reports.

use std::fmt::Write as _;

/// One resolved stack frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeFrame {
	pub symbol: Option<String>,
	pub file: Option<String>,
	pub line: Option<u32>,
	pub address: usize,
	pub in_app: bool,
}

impl NativeFrame {
	fn new(symbol: Option<String>, file: Option<String>, line: Option<u32>, address: usize) -> Self {
		let in_app = symbol.as_deref().map(is_in_app_frame).unwrap_or(false);
		Self {
			symbol,
			file,
			line,
			address,
			in_app,
		}
	}
}

/// Capture the current thread's stack, resolved and trimmed of capture and
/// panic machinery.
pub fn capture_frames() -> Vec<NativeFrame> {
	let backtrace = ::backtrace::Backtrace::new();
	let mut frames = Vec::new();

	for frame in backtrace.frames() {
		let address = frame.ip() as usize;
		match frame.symbols().first() {
			Some(symbol) => frames.push(NativeFrame::new(
				symbol.name().map(|name| name.to_string()),
				symbol.filename().map(|path| path.display().to_string()),
				symbol.lineno(),
				address,
			)),
			None => frames.push(NativeFrame::new(None, None, None, address)),
		}
	}

	trim_leading_machinery(frames)
}

/// Capture the current stack formatted one frame per line.
pub fn capture_native_trace() -> String {
	format_frames(&capture_frames())
}

/// Format frames as `  #<i> <symbol> (<file>:<line>)`, falling back to the
/// instruction address when no symbol resolved.
pub fn format_frames(frames: &[NativeFrame]) -> String {
	let mut out = String::new();
	for (i, frame) in frames.iter().enumerate() {
		let _ = match (&frame.symbol, &frame.file) {
			(Some(symbol), Some(file)) => match frame.line {
				Some(line) => writeln!(out, "  #{i} {symbol} ({file}:{line})"),
				None => writeln!(out, "  #{i} {symbol} ({file})"),
			},
			(Some(symbol), None) => writeln!(out, "  #{i} {symbol}"),
			(None, _) => writeln!(out, "  #{i} <unknown> ({:#x})", frame.address),
		};
	}
	out
}

fn trim_leading_machinery(frames: Vec<NativeFrame>) -> Vec<NativeFrame> {
	let first_app_frame = frames
		.iter()
		.position(|frame| frame.in_app && !is_capture_frame(frame));

	match first_app_frame {
		Some(start) => frames.into_iter().skip(start).collect(),
		// nothing recognizable (stripped binary); keep everything
		None => frames,
	}
}

fn is_capture_frame(frame: &NativeFrame) -> bool {
	const CAPTURE_PREFIXES: &[&str] = &[
		"beacon_crash::backtrace::",
		"beacon_crash::panic_hook::",
		"<alloc::boxed::Box<F,A> as core::ops::function::Fn",
	];

	frame
		.symbol
		.as_deref()
		.map(|symbol| CAPTURE_PREFIXES.iter().any(|prefix| symbol.starts_with(prefix)))
		.unwrap_or(false)
}

/// Determine if a frame is from application code vs standard library.
fn is_in_app_frame(function: &str) -> bool {
	const SYSTEM_PREFIXES: &[&str] = &[
		"std::",
		"core::",
		"alloc::",
		"<std::",
		"<core::",
		"<alloc::",
		"backtrace::",
		"<backtrace::",
		"panic_unwind::",
		"<panic_unwind::",
		"rust_begin_unwind",
		"rust_panic",
		"__rust_",
		"_rust_",
	];

	const SYSTEM_CONTAINS: &[&str] = &[
		"::panic::",
		"::panicking::",
		"::rt::",
		"::sys_common::",
	];

	if SYSTEM_PREFIXES.iter().any(|prefix| function.starts_with(prefix)) {
		return false;
	}

	!SYSTEM_CONTAINS.iter().any(|needle| function.contains(needle))
}
