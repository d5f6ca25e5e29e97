//! Chart instances bound to surfaces
//!
//! The charting library is behind [`ChartBackend`]. [`ChartRegistry`] keeps at
//! most one live instance per surface: `replace` destroys the bound instance
//! before creating the new one.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dfd_common::events::{DashEvent, EventBus};
use serde::Serialize;
use tracing::debug;

/// Surface names
pub mod surface {
    /// Cross-image confidence trend (line)
    pub const ACCURACY_CHART: &str = "accuracyChart";
    /// Per-image probability breakdown (pie)
    pub const LOGS_PIE_CHART: &str = "logsPieChart";
    /// Cross-image confidence comparison (bar)
    pub const ANALYTICS_BAR_CHART: &str = "analyticsBarChart";
    /// Analytics table
    pub const ANALYTICS_GRID: &str = "analyticsGrid";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
    Line,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Pie => "pie",
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
        };
        f.write_str(name)
    }
}

/// Dataset handed to the chart library
///
/// `None` values are gaps (absent data), never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
}

impl ChartSpec {
    pub fn points(&self) -> usize {
        self.values.len()
    }
}

/// Opaque handle to a live chart instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChartHandle(pub u64);

/// Charting library seam
pub trait ChartBackend: Send + Sync {
    /// Draw a new chart on `surface`
    fn create(&mut self, surface: &str, spec: &ChartSpec) -> ChartHandle;

    /// Dispose a chart instance
    fn destroy(&mut self, handle: ChartHandle);
}

/// In-memory chart backend
///
/// Keeps live instances so the service can report them and tests can assert
/// the one-instance-per-surface invariant. Clones share bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct HeadlessChartBackend {
    state: Arc<Mutex<HeadlessState>>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_id: u64,
    live: HashMap<ChartHandle, (String, ChartSpec)>,
    created: usize,
    destroyed: usize,
}

impl HeadlessChartBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }

    /// Live instances drawn on `surface`
    pub fn live_on(&self, surface: &str) -> Vec<ChartSpec> {
        self.lock()
            .live
            .values()
            .filter(|(s, _)| s == surface)
            .map(|(_, spec)| spec.clone())
            .collect()
    }

    pub fn created(&self) -> usize {
        self.lock().created
    }

    pub fn destroyed(&self) -> usize {
        self.lock().destroyed
    }
}

impl ChartBackend for HeadlessChartBackend {
    fn create(&mut self, surface: &str, spec: &ChartSpec) -> ChartHandle {
        let mut state = self.lock();
        state.next_id += 1;
        let handle = ChartHandle(state.next_id);
        state.live.insert(handle, (surface.to_string(), spec.clone()));
        state.created += 1;
        handle
    }

    fn destroy(&mut self, handle: ChartHandle) {
        let mut state = self.lock();
        if state.live.remove(&handle).is_some() {
            state.destroyed += 1;
        }
    }
}

/// Surface → bound chart instance
pub struct ChartRegistry {
    backend: Box<dyn ChartBackend>,
    bound: HashMap<String, (ChartHandle, ChartSpec)>,
    event_bus: EventBus,
}

impl ChartRegistry {
    pub fn new(backend: Box<dyn ChartBackend>, event_bus: EventBus) -> Self {
        Self {
            backend,
            bound: HashMap::new(),
            event_bus,
        }
    }

    /// Dispose whatever is bound to `surface`, then create `spec` there
    pub fn replace(&mut self, surface: &str, spec: ChartSpec) -> ChartHandle {
        if let Some((previous, _)) = self.bound.remove(surface) {
            self.backend.destroy(previous);
            debug!(surface = %surface, handle = previous.0, "Chart disposed");
        }
        let handle = self.backend.create(surface, &spec);
        debug!(surface = %surface, handle = handle.0, kind = %spec.kind, "Chart created");
        self.event_bus.emit_lossy(DashEvent::ChartReplaced {
            surface: surface.to_string(),
            kind: spec.kind.to_string(),
            points: spec.points(),
            timestamp: dfd_common::time::now(),
        });
        self.bound.insert(surface.to_string(), (handle, spec));
        handle
    }

    pub fn handle(&self, surface: &str) -> Option<ChartHandle> {
        self.bound.get(surface).map(|(h, _)| *h)
    }

    /// Dataset currently drawn on `surface`
    pub fn spec(&self, surface: &str) -> Option<&ChartSpec> {
        self.bound.get(surface).map(|(_, s)| s)
    }

    /// Bound surfaces and their datasets
    pub fn snapshot(&self) -> HashMap<String, ChartSpec> {
        self.bound
            .iter()
            .map(|(surface, (_, spec))| (surface.clone(), spec.clone()))
            .collect()
    }
}
