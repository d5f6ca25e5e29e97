//! Cross-image analytics aggregator
//!
//! Two collections are kept:
//! - the aggregate, one entry per image identifier in first-completion
//!   order; a repeated detection replaces the entry in place
//! - the audit trail, one entry per completed detection, append-only
//!
//! The analytics table and the bar chart are drawn from the aggregate, the
//! confidence trend line from the audit trail.

use dfd_common::events::{DashEvent, EventBus};
use dfd_common::{Verdict, VerdictLabel};
use serde::Serialize;
use tracing::debug;

use crate::charts::{surface, ChartKind, ChartRegistry, ChartSpec};
use crate::format;

/// One completed detection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEntry {
    pub image_id: String,
    pub label: Option<String>,
    pub confidence: Option<f64>,
    pub fake_probability: Option<f64>,
    pub real_probability: Option<f64>,
}

impl AnalyticsEntry {
    fn from_verdict(image_id: &str, verdict: &Verdict) -> Self {
        Self {
            image_id: image_id.to_string(),
            label: verdict.predicted_label.clone(),
            confidence: verdict.confidence,
            fake_probability: verdict.fake_probability,
            real_probability: verdict.real_probability,
        }
    }
}

/// Rendered row of the analytics table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub image_id: String,
    pub label: String,
    pub confidence: String,
    pub fake: String,
    pub real: String,
}

impl TableRow {
    fn from_entry(entry: &AnalyticsEntry) -> Self {
        Self {
            image_id: entry.image_id.clone(),
            label: entry.label.clone().unwrap_or_else(|| "Unknown".to_string()),
            confidence: format::percent(entry.confidence),
            fake: format::percent(entry.fake_probability),
            real: format::percent(entry.real_probability),
        }
    }
}

/// Header counters for the analytics panel, over the aggregate
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total: usize,
    pub fake: usize,
    pub real: usize,
    pub unknown: usize,
    /// Mean over entries with a confidence; None when there are none
    pub mean_confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSnapshot {
    pub summary: AnalyticsSummary,
    pub rows: Vec<TableRow>,
    pub total_detections: usize,
}

pub struct AnalyticsAggregator {
    entries: Vec<AnalyticsEntry>,
    history: Vec<AnalyticsEntry>,
    rows: Vec<TableRow>,
    event_bus: EventBus,
}

impl AnalyticsAggregator {
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            entries: Vec::new(),
            history: Vec::new(),
            rows: Vec::new(),
            event_bus,
        }
    }

    /// Record one completed detection and redraw the analytics views
    pub fn update_analytics(&mut self, image_id: &str, verdict: &Verdict, charts: &mut ChartRegistry) {
        let entry = AnalyticsEntry::from_verdict(image_id, verdict);
        self.history.push(entry.clone());

        let row = TableRow::from_entry(&entry);
        match self.entries.iter().position(|e| e.image_id == image_id) {
            Some(index) => {
                self.entries[index] = entry;
                self.rows[index] = row;
            }
            None => {
                self.entries.push(entry);
                self.rows.push(row);
            }
        }

        charts.replace(surface::ANALYTICS_BAR_CHART, self.confidence_bars());
        charts.replace(surface::ACCURACY_CHART, self.confidence_trend());

        debug!(
            image_id = %image_id,
            rows = self.rows.len(),
            total_detections = self.history.len(),
            "Analytics updated"
        );
        self.event_bus.emit_lossy(DashEvent::AnalyticsUpdated {
            image_id: image_id.to_string(),
            rows: self.rows.len(),
            total_detections: self.history.len(),
            timestamp: dfd_common::time::now(),
        });
    }

    /// Per-image confidence (×100) over the aggregate
    fn confidence_bars(&self) -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Bar,
            title: "Confidence by Image".to_string(),
            labels: self.entries.iter().map(|e| e.image_id.clone()).collect(),
            values: self
                .entries
                .iter()
                .map(|e| e.confidence.map(|c| c * 100.0))
                .collect(),
        }
    }

    /// Confidence (×100) in completion order over the audit trail
    fn confidence_trend(&self) -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Line,
            title: "Confidence Trend".to_string(),
            labels: (1..=self.history.len()).map(|n| format!("#{}", n)).collect(),
            values: self
                .history
                .iter()
                .map(|e| e.confidence.map(|c| c * 100.0))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[AnalyticsEntry] {
        &self.entries
    }

    pub fn history(&self) -> &[AnalyticsEntry] {
        &self.history
    }

    /// Rows of `analyticsGrid`
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn summary(&self) -> AnalyticsSummary {
        let mut summary = AnalyticsSummary {
            total: self.entries.len(),
            ..AnalyticsSummary::default()
        };
        let mut confidence_sum = 0.0;
        let mut with_confidence = 0usize;

        for entry in &self.entries {
            let label = entry.label.as_deref().and_then(VerdictLabel::parse);
            match label {
                Some(VerdictLabel::Fake) => summary.fake += 1,
                Some(VerdictLabel::Real) => summary.real += 1,
                None => summary.unknown += 1,
            }
            if let Some(c) = entry.confidence {
                confidence_sum += c;
                with_confidence += 1;
            }
        }

        if with_confidence > 0 {
            summary.mean_confidence = Some(confidence_sum / with_confidence as f64);
        }
        summary
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            summary: self.summary(),
            rows: self.rows.clone(),
            total_detections: self.history.len(),
        }
    }
}
