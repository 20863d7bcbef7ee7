//! Diagnostic events.
//!
//! Each submission produces exactly one `DispatchEvent`, handed to an injected
//! `EventSink`. Sinks observe; they never influence the outcome.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::Method;

use crate::config::MAX_EVENT_BODY_CHARS;
use crate::error_handling::OutcomeKind;

/// Record of one submission and its terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchEvent {
    /// Per-dispatcher sequence number, starting at 1
    pub sequence: u64,
    /// HTTP method of the request
    pub method: Method,
    /// Target URL of the request
    pub target: String,
    /// Response status, if a response was received
    pub status: Option<u16>,
    /// Response body (lossy UTF-8, truncated), if a response was received
    pub body: Option<String>,
    /// Terminal state
    pub outcome: OutcomeKind,
    /// Time from submission to outcome, including the permit wait
    pub elapsed: Duration,
}

/// Receives dispatch events.
pub trait EventSink: Send + Sync {
    /// Called once per submission, after its outcome is known.
    fn record(&self, event: &DispatchEvent);
}

/// Writes events to the `log` facade.
///
/// Successes are logged at info level, failures at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&self, event: &DispatchEvent) {
        match (event.status, &event.body) {
            (Some(status), Some(body)) if event.outcome.is_success() => log::info!(
                "Request #{}: {} {}, Response: {} {} ({:.3}s)",
                event.sequence,
                event.method,
                event.target,
                status,
                body,
                event.elapsed.as_secs_f64()
            ),
            (Some(status), body) => log::warn!(
                "Request #{}: {} {}, Response: {} {} ({})",
                event.sequence,
                event.method,
                event.target,
                status,
                body.as_deref().unwrap_or(""),
                event.outcome.as_str()
            ),
            (None, _) => log::warn!(
                "Request #{}: {} {}, no response ({}, after {:.3}s)",
                event.sequence,
                event.method,
                event.target,
                event.outcome.as_str(),
                event.elapsed.as_secs_f64()
            ),
        }
    }
}

/// Keeps every event in memory, in the order recorded.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DispatchEvent>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<DispatchEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of events recorded so far.
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no event has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &DispatchEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Renders a response body for an event: lossy UTF-8, at most
/// `MAX_EVENT_BODY_CHARS` characters.
pub(crate) fn render_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let char_count = text.chars().count();
    if char_count <= MAX_EVENT_BODY_CHARS {
        return text.into_owned();
    }
    let truncated: String = text.chars().take(MAX_EVENT_BODY_CHARS).collect();
    format!("{truncated}... (truncated, {char_count} chars)")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(outcome: OutcomeKind, status: Option<u16>) -> DispatchEvent {
        DispatchEvent {
            sequence: 1,
            method: Method::POST,
            target: "https://example.com/create".to_string(),
            status,
            body: status.map(|_| "{}".to_string()),
            outcome,
            elapsed: Duration::from_millis(12),
        }
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.record(&sample_event(OutcomeKind::Succeeded, Some(200)));
        sink.record(&sample_event(OutcomeKind::Cancelled, None));

        let events = sink.events();
        assert_eq!(sink.len(), 2);
        assert_eq!(events[0].outcome, OutcomeKind::Succeeded);
        assert_eq!(events[1].outcome, OutcomeKind::Cancelled);
        assert_eq!(events[1].status, None);
    }

    #[test]
    fn test_log_sink_handles_every_shape() {
        // No logger installed: records must still be accepted without panicking
        let sink = LogSink;
        sink.record(&sample_event(OutcomeKind::Succeeded, Some(201)));
        sink.record(&sample_event(OutcomeKind::ApiError, Some(400)));
        sink.record(&sample_event(OutcomeKind::TransportFailure, None));
    }

    #[test]
    fn test_render_body_short() {
        assert_eq!(render_body(br#"{"id":"1"}"#), r#"{"id":"1"}"#);
        assert_eq!(render_body(&[0x66, 0xff, 0x6f]), "f\u{fffd}o");
    }

    #[test]
    fn test_render_body_truncates() {
        let long = "x".repeat(MAX_EVENT_BODY_CHARS + 10);
        let rendered = render_body(long.as_bytes());
        assert!(rendered.starts_with(&"x".repeat(MAX_EVENT_BODY_CHARS)));
        assert!(rendered.ends_with(&format!("(truncated, {} chars)", MAX_EVENT_BODY_CHARS + 10)));
    }
}
