/*!
 * Tracing
 * Structured tracing for signal waits using the tracing crate
 *
 * Features:
 * - Trace IDs for correlating a wait with the registry it ran against
 * - JSON-formatted logs for structured parsing
 * - Slow-wait warnings with the elapsed time embedded
 */

use crate::core::errors::SignalError;
use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};
use uuid::Uuid;

/// Waits longer than this are reported as slow
const SLOW_WAIT: Duration = Duration::from_secs(1);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - HARNESS_TRACE_JSON: Enable JSON output (default: false)
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("HARNESS_TRACE_JSON")
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
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!(json = use_json, "Structured tracing initialized");
    }
    installed
}

/// Generate a unique trace ID for wait correlation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span around one blocking wait on a signal
pub struct WaitSpan {
    span: tracing::Span,
    start: Instant,
    signal: &'static str,
    trace_id: String,
}

impl WaitSpan {
    pub fn new(signal: &'static str, registry_id: Uuid) -> Self {
        let trace_id = generate_trace_id();

        let span = span!(
            Level::DEBUG,
            "signal_wait",
            trace_id = %trace_id,
            registry_id = %registry_id,
            signal = signal,
            duration_ms = tracing::field::Empty,
            result = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            signal,
            trace_id,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    /// Record the outcome of the wait
    pub fn record_result<T>(&self, result: &Result<T, SignalError>) {
        match result {
            Ok(_) => {
                self.span.record("result", "completed");
            }
            Err(err) => {
                self.span.record("result", "error");
                self.span.record("error", err.to_string().as_str());
            }
        }
    }
}

impl Drop for WaitSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_ms", duration.as_millis() as u64);

        if duration > SLOW_WAIT {
            warn!(
                trace_id = %self.trace_id,
                signal = self.signal,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow signal wait"
            );
        } else {
            debug!(
                trace_id = %self.trace_id,
                signal = self.signal,
                duration_us = duration.as_micros() as u64,
                "signal wait finished"
            );
        }
    }
}
