//! Time-stamped log console
//!
//! Append-only during the session. Every append scrolls the console to the
//! newest line.

use dfd_common::events::{DashEvent, EventBus};
use dfd_common::Verdict;
use serde::Serialize;
use tracing::debug;

use crate::charts::{surface, ChartKind, ChartRegistry, ChartSpec};
use crate::format;

/// Console contents as seen by a front end
#[derive(Debug, Clone, Serialize)]
pub struct LogSnapshot {
    pub lines: Vec<String>,
    /// Index of the line scrolled into view (None when empty)
    pub scroll_position: Option<usize>,
}

pub struct LogConsole {
    lines: Vec<String>,
    scroll_position: Option<usize>,
    event_bus: EventBus,
}

impl LogConsole {
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            lines: Vec::new(),
            scroll_position: None,
            event_bus,
        }
    }

    /// Append `"[HH:MM:SS] message"` stamped with local wall-clock time
    pub fn append_log(&mut self, message: &str) {
        let stamp = dfd_common::time::local_clock_stamp();
        self.push_line(format!("[{}] {}", stamp, message));
    }

    fn push_line(&mut self, line: String) {
        debug!(line = %line, "Log console line appended");
        self.lines.push(line.clone());
        self.scroll_position = Some(self.lines.len() - 1);
        self.event_bus.emit_lossy(DashEvent::LogAppended {
            line,
            timestamp: dfd_common::time::now(),
        });
    }

    /// Log a completed detection and redraw the probability pie
    pub fn update_logs(&mut self, image_id: &str, verdict: &Verdict, charts: &mut ChartRegistry) {
        self.append_log(&format!(
            "Detection complete for {}: {} (confidence {})",
            image_id,
            verdict.label_text(),
            format::probability(verdict.confidence)
        ));

        charts.replace(
            surface::LOGS_PIE_CHART,
            ChartSpec {
                kind: ChartKind::Pie,
                title: format!("Probabilities for {}", image_id),
                labels: vec!["Fake".to_string(), "Real".to_string()],
                values: vec![
                    verdict.fake_probability.map(|p| p * 100.0),
                    verdict.real_probability.map(|p| p * 100.0),
                ],
            },
        );
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn scroll_position(&self) -> Option<usize> {
        self.scroll_position
    }

    pub fn snapshot(&self) -> LogSnapshot {
        LogSnapshot {
            lines: self.lines.clone(),
            scroll_position: self.scroll_position,
        }
    }
}
