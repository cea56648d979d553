//! The library's trace-log facility.
//!
//! Messages below the configured level are dropped, the rest are forwarded to
//! the [`log`] crate under the `raywrap::native` target.

use std::cell::Cell;

use crate::sys::types::TraceLogLevel;

const TARGET: &str = "raywrap::native";

thread_local! {
    static LEVEL: Cell<TraceLogLevel> = const { Cell::new(TraceLogLevel::Info) };
}

pub fn set_trace_log_level(level: TraceLogLevel) {
    LEVEL.with(|l| l.set(level));
}

#[must_use]
pub fn get_trace_log_level() -> TraceLogLevel {
    LEVEL.with(Cell::get)
}

pub fn trace_log(level: TraceLogLevel, message: impl AsRef<str>) {
    if level < get_trace_log_level() || level == TraceLogLevel::None {
        return;
    }

    let message = message.as_ref();
    match level {
        TraceLogLevel::All | TraceLogLevel::Trace => log::trace!(target: TARGET, "{message}"),
        TraceLogLevel::Debug => log::debug!(target: TARGET, "{message}"),
        TraceLogLevel::Info => log::info!(target: TARGET, "{message}"),
        TraceLogLevel::Warning => log::warn!(target: TARGET, "{message}"),
        TraceLogLevel::Error | TraceLogLevel::Fatal => log::error!(target: TARGET, "{message}"),
        TraceLogLevel::None => {}
    }
}

macro_rules! trace_info {
    ($($arg:tt)*) => {
        $crate::sys::trace::trace_log($crate::sys::TraceLogLevel::Info, format!($($arg)*))
    };
}

macro_rules! trace_warn {
    ($($arg:tt)*) => {
        $crate::sys::trace::trace_log($crate::sys::TraceLogLevel::Warning, format!($($arg)*))
    };
}

macro_rules! trace_debug {
    ($($arg:tt)*) => {
        $crate::sys::trace::trace_log($crate::sys::TraceLogLevel::Debug, format!($($arg)*))
    };
}

pub(crate) use {trace_debug, trace_info, trace_warn};
