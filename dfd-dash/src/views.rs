//! Shared view state
//!
//! Everything a completed detection touches lives here and sits behind one
//! lock in the dashboard, so a fan-out is never observed half-applied.

use dfd_common::events::EventBus;
use dfd_common::Verdict;

use crate::analytics::AnalyticsAggregator;
use crate::charts::{ChartBackend, ChartRegistry};
use crate::detail;
use crate::log_console::LogConsole;
use crate::store::ResultStore;
use crate::targets::RenderTargets;

pub struct Views {
    pub store: ResultStore,
    pub targets: RenderTargets,
    pub log: LogConsole,
    pub analytics: AnalyticsAggregator,
    pub charts: ChartRegistry,
}

impl Views {
    pub fn new(chart_backend: Box<dyn ChartBackend>, event_bus: EventBus) -> Self {
        Self {
            store: ResultStore::new(),
            targets: RenderTargets::new(),
            log: LogConsole::new(event_bus.clone()),
            analytics: AnalyticsAggregator::new(event_bus.clone()),
            charts: ChartRegistry::new(chart_backend, event_bus),
        }
    }

    /// Store `verdict` and refresh every dependent view, in order:
    /// detail panel, log console, analytics
    pub fn apply_verdict(&mut self, image_id: &str, verdict: &Verdict) {
        self.store.insert(image_id, verdict.clone());
        detail::render(&mut self.targets, image_id, verdict);
        self.log.update_logs(image_id, verdict, &mut self.charts);
        self.analytics.update_analytics(image_id, verdict, &mut self.charts);
    }
}
