//! Dashboard context
//!
//! Owns all shared state: the two overlays, the navigator, the detection
//! coordinator and the locked view state. Handlers and the binary receive a
//! `Dashboard` instead of reaching for globals. Clones share state.

use std::sync::Arc;
use std::time::Duration;

use dfd_common::config::TomlConfig;
use dfd_common::events::EventBus;
use dfd_common::Verdict;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

use crate::analytics::AnalyticsSnapshot;
use crate::charts::{ChartBackend, ChartSpec};
use crate::classifier::Classifier;
use crate::coordinator::{DetectionCoordinator, DetectionOutcome};
use crate::log_console::LogSnapshot;
use crate::navigation::{NavigationOutcome, Navigator, Panel};
use crate::overlay::{Overlay, OverlayState};
use crate::targets::Element;
use crate::views::Views;

/// Boot splash message
pub const SPLASH_MESSAGE: &str = "Initializing Detection Grid...";

/// Overlay and panel state
#[derive(Debug, Clone, Serialize)]
pub struct DashboardState {
    pub overlay: OverlayState,
    pub splash: OverlayState,
    pub active_panel: Panel,
    pub in_flight: usize,
}

/// One result store entry
#[derive(Debug, Clone, Serialize)]
pub struct ResultEntry {
    pub image_id: String,
    pub verdict: Verdict,
}

#[derive(Clone)]
pub struct Dashboard {
    busy: Overlay,
    splash: Overlay,
    splash_delay: Duration,
    navigator: Navigator,
    coordinator: DetectionCoordinator,
    views: Arc<Mutex<Views>>,
    event_bus: EventBus,
}

impl Dashboard {
    pub fn new(
        config: &TomlConfig,
        classifier: Arc<dyn Classifier>,
        chart_backend: Box<dyn ChartBackend>,
    ) -> Self {
        let timing = &config.timing;
        let event_bus = EventBus::new(config.event_capacity);

        let busy = Overlay::new("busy", timing.overlay_hide_delay(), event_bus.clone());
        let splash = Overlay::new("splash", timing.overlay_hide_delay(), event_bus.clone());
        let navigator = Navigator::new(busy.clone(), timing.transition_delay(), event_bus.clone());
        let views = Arc::new(Mutex::new(Views::new(chart_backend, event_bus.clone())));
        let coordinator = DetectionCoordinator::new(
            classifier,
            Arc::clone(&views),
            busy.clone(),
            config.show_busy_overlay,
            timing.request_timeout(),
            event_bus.clone(),
        );

        Self {
            busy,
            splash,
            splash_delay: timing.splash_delay(),
            navigator,
            coordinator,
            views,
            event_bus,
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Show the boot splash; it hides itself after the splash delay
    pub async fn boot(&self) {
        info!(delay_ms = self.splash_delay.as_millis() as u64, "Dashboard booting");
        self.splash.show(SPLASH_MESSAGE).await;
        self.splash.hide_after(self.splash_delay).await;
    }

    /// Create the detail targets for an image
    pub async fn register_image(&self, image_id: &str) {
        self.views.lock().await.targets.register_image(image_id);
    }

    pub async fn navigate(&self, target: &str) -> NavigationOutcome {
        self.navigator.navigate(target).await
    }

    pub async fn check_image(&self, full_path: &str, image_id: &str) -> DetectionOutcome {
        self.coordinator.check_image(full_path, image_id).await
    }

    /// Run `check_image` on a background task
    pub fn spawn_check(&self, full_path: String, image_id: String) -> JoinHandle<DetectionOutcome> {
        let coordinator = self.coordinator.clone();
        tokio::spawn(async move { coordinator.check_image(&full_path, &image_id).await })
    }

    /// Run `navigate` on a background task
    pub fn spawn_navigate(&self, target: String) -> JoinHandle<NavigationOutcome> {
        let navigator = self.navigator.clone();
        tokio::spawn(async move { navigator.navigate(&target).await })
    }

    pub async fn cancel(&self, image_id: &str) -> usize {
        self.coordinator.cancel(image_id).await
    }

    pub async fn cancel_all(&self) -> usize {
        self.coordinator.cancel_all().await
    }

    pub async fn state(&self) -> DashboardState {
        DashboardState {
            overlay: self.busy.state().await,
            splash: self.splash.state().await,
            active_panel: self.navigator.active().await,
            in_flight: self.coordinator.in_flight().await,
        }
    }

    /// Most recent detection failure, for health diagnostics
    pub async fn last_error(&self) -> Option<String> {
        self.coordinator.last_error().await
    }

    pub async fn active_panel(&self) -> Panel {
        self.navigator.active().await
    }

    pub async fn overlay_state(&self) -> OverlayState {
        self.busy.state().await
    }

    pub async fn splash_state(&self) -> OverlayState {
        self.splash.state().await
    }

    pub async fn verdict(&self, image_id: &str) -> Option<Verdict> {
        self.views.lock().await.store.get(image_id).cloned()
    }

    pub async fn results(&self) -> Vec<ResultEntry> {
        self.views
            .lock()
            .await
            .store
            .snapshot()
            .into_iter()
            .map(|(image_id, verdict)| ResultEntry { image_id, verdict })
            .collect()
    }

    pub async fn analytics(&self) -> AnalyticsSnapshot {
        self.views.lock().await.analytics.snapshot()
    }

    pub async fn logs(&self) -> LogSnapshot {
        self.views.lock().await.log.snapshot()
    }

    /// Render target at `key`, if registered
    pub async fn element(&self, key: &str) -> Option<Element> {
        self.views.lock().await.targets.get(key).cloned()
    }

    /// Dataset drawn on `surface`, if any
    pub async fn chart(&self, surface: &str) -> Option<ChartSpec> {
        self.views.lock().await.charts.spec(surface).cloned()
    }
}
