//! Event types for the DFD event system
//!
//! Provides shared event definitions and EventBus for dashboard state changes.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::verdict::Verdict;

/// Dashboard event types
///
/// Events are broadcast via EventBus and can be serialized for SSE transmission.
/// Every view mutation in the dashboard engine publishes one of these, so a
/// front end can mirror the engine state without polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DashEvent {
    /// Overlay (busy indicator or boot splash) shown, re-labelled or hidden
    OverlayChanged {
        /// Which overlay changed ("busy" or "splash")
        overlay: String,
        /// Visible after the change
        visible: bool,
        /// Message shown (None when hidden)
        message: Option<String>,
        /// When overlay changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Top-level panel switched
    PanelActivated {
        /// Panel token now active (results/analytics/logs/features)
        panel: String,
        /// When panel became active
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Classification request issued
    DetectionStarted {
        /// Per-request identifier
        request_id: Uuid,
        /// Image identifier the request belongs to
        image_id: String,
        /// When request was issued
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Classification completed and all views were refreshed
    DetectionCompleted {
        /// Per-request identifier
        request_id: Uuid,
        /// Image identifier
        image_id: String,
        /// Verdict written to the result store
        verdict: Verdict,
        /// When views finished updating
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Classification failed (transport, parse, backend, timeout or cancel)
    DetectionFailed {
        /// Per-request identifier
        request_id: Uuid,
        /// Image identifier
        image_id: String,
        /// Failure message as logged to the console
        message: String,
        /// When failure was handled
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Line appended to the log console
    LogAppended {
        /// Fully formatted line ("[HH:MM:SS] message")
        line: String,
        /// When line was appended
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Chart instance on a surface was disposed and recreated
    ChartReplaced {
        /// Surface name (e.g. "analyticsBarChart")
        surface: String,
        /// Chart kind ("pie", "bar", "line")
        kind: String,
        /// Number of data points in the new dataset
        points: usize,
        /// When chart was recreated
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Analytics aggregate and table updated
    AnalyticsUpdated {
        /// Image identifier that triggered the update
        image_id: String,
        /// Rows in the analytics table after the update
        rows: usize,
        /// Completed detections recorded so far (audit trail length)
        total_detections: usize,
        /// When analytics updated
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl DashEvent {
    /// Event type name, used as the SSE `event:` field
    pub fn event_type(&self) -> &str {
        match self {
            DashEvent::OverlayChanged { .. } => "OverlayChanged",
            DashEvent::PanelActivated { .. } => "PanelActivated",
            DashEvent::DetectionStarted { .. } => "DetectionStarted",
            DashEvent::DetectionCompleted { .. } => "DetectionCompleted",
            DashEvent::DetectionFailed { .. } => "DetectionFailed",
            DashEvent::LogAppended { .. } => "LogAppended",
            DashEvent::ChartReplaced { .. } => "ChartReplaced",
            DashEvent::AnalyticsUpdated { .. } => "AnalyticsUpdated",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus for dashboard events
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use dfd_common::events::{DashEvent, EventBus};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(DashEvent::PanelActivated {
///     panel: "analytics".to_string(),
///     timestamp: chrono::Utc::now(),
/// });
///
/// let event = rx.try_recv().unwrap();
/// assert_eq!(event.event_type(), "PanelActivated");
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DashEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// * `capacity` - Number of events to buffer before lagging subscribers drop old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<DashEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: DashEvent,
    ) -> Result<usize, broadcast::error::SendError<DashEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Dashboard view updates are never blocked on an observer being present.
    pub fn emit_lossy(&self, event: DashEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_event(line: &str) -> DashEvent {
        DashEvent::LogAppended {
            line: line.to_string(),
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_emit_without_subscribers_errors() {
        let bus = EventBus::new(10);
        assert!(bus.emit(log_event("x")).is_err());
        // Lossy variant must not panic
        bus.emit_lossy(log_event("y"));
    }

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.emit(log_event("first")).unwrap();
        bus.emit(log_event("second")).unwrap();

        match rx.recv().await.unwrap() {
            DashEvent::LogAppended { line, .. } => assert_eq!(line, "first"),
            other => panic!("unexpected event {:?}", other),
        }
        match rx.recv().await.unwrap() {
            DashEvent::LogAppended { line, .. } => assert_eq!(line, "second"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_serialized_event_is_tagged() {
        let event = DashEvent::OverlayChanged {
            overlay: "busy".to_string(),
            visible: true,
            message: Some("Analyzing a...".to_string()),
            timestamp: chrono::Utc::now(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "OverlayChanged");
        assert_eq!(json["overlay"], "busy");
        assert_eq!(json["visible"], true);
        assert_eq!(event.event_type(), "OverlayChanged");
    }

    #[test]
    fn test_capacity_reported() {
        assert_eq!(EventBus::new(42).capacity(), 42);
    }
}
