/*!
 * Syscall Tracing
 * Structured tracing for descriptor syscalls using the tracing crate
 *
 * Features:
 * - Per-syscall trace ID for log correlation
 * - JSON-formatted logs for structured parsing
 * - Result, error and duration recorded on every span
 */

use std::fmt;
use std::time::Instant;
use tracing::{debug, info, span, warn, Level, Span};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Syscalls slower than this are reported at warn level
const SLOW_SYSCALL_MS: u128 = 10;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - KERNEL_TRACE_JSON: Enable JSON output (default: false)
///
/// Safe to call more than once; later calls leave the installed subscriber alone.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("KERNEL_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Generate a unique trace ID for request correlation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one syscall invocation
///
/// Logs the duration when dropped, so it should live for the whole call.
pub struct SyscallSpan {
    span: Span,
    start: Instant,
    syscall: &'static str,
    trace_id: String,
}

impl SyscallSpan {
    pub fn new(syscall: &'static str, pid: u32) -> Self {
        let trace_id = generate_trace_id();

        let span = span!(
            Level::DEBUG,
            "syscall",
            trace_id = %trace_id,
            syscall = syscall,
            pid = pid,
            fd = tracing::field::Empty,
            target_fd = tracing::field::Empty,
            duration_us = tracing::field::Empty,
            result = tracing::field::Empty,
            error = tracing::field::Empty,
            return_value = tracing::field::Empty,
        );

        span.in_scope(|| debug!(syscall, pid, "syscall started"));

        Self {
            span,
            start: Instant::now(),
            syscall,
            trace_id,
        }
    }

    /// Trace ID for this syscall
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Record the descriptor the call operates on
    pub fn record_fd(&self, fd: i32) {
        self.span.record("fd", fd);
    }

    /// Record the second descriptor of a two-descriptor call (dup2 target)
    pub fn record_target_fd(&self, fd: i32) {
        self.span.record("target_fd", fd);
    }

    /// Record the outcome of the call: return value on success, error text otherwise
    pub fn record_outcome<T: fmt::Debug, E: fmt::Display>(&self, outcome: &Result<T, E>) {
        match outcome {
            Ok(value) => {
                self.span.record("return_value", format!("{:?}", value).as_str());
                self.span.record("result", "success");
            }
            Err(e) => {
                self.span.record("error", e.to_string().as_str());
                self.span.record("result", "error");
            }
        }
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for SyscallSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);
        let _entered = self.span.enter();

        if duration.as_millis() > SLOW_SYSCALL_MS {
            warn!(
                trace_id = %self.trace_id,
                syscall = self.syscall,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow syscall detected"
            );
        } else {
            debug!(
                trace_id = %self.trace_id,
                syscall = self.syscall,
                duration_us = duration.as_micros() as u64,
                "syscall completed"
            );
        }
    }
}
