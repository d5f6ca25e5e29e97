//! Panel navigation controller
//!
//! Exactly one of the four top-level panels is active at a time. `navigate`
//! shows the overlay, waits the transition delay, swaps the active panel in
//! one locked step and hides the overlay with a closing message.
//!
//! A later `navigate` supersedes an earlier one still inside its delay
//! window: the earlier call neither activates its panel nor hides the overlay.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dfd_common::events::{DashEvent, EventBus};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::overlay::Overlay;

/// Top-level dashboard panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Results,
    Analytics,
    Logs,
    Features,
}

/// Overlay messages for targets that resolve to no panel
pub const FALLBACK_MESSAGES: (&str, &str) = ("Switching Module...", "Module Ready");

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::Results, Panel::Analytics, Panel::Logs, Panel::Features];

    pub fn token(&self) -> &'static str {
        match self {
            Panel::Results => "results",
            Panel::Analytics => "analytics",
            Panel::Logs => "logs",
            Panel::Features => "features",
        }
    }

    /// Resolve a navigation trigger
    ///
    /// Accepts the target token or a legacy free-text label; both are matched
    /// case-insensitively after trimming.
    pub fn resolve(target: &str) -> Option<Panel> {
        let normalized = target.trim().to_lowercase();
        Panel::ALL.into_iter().find(|p| p.token() == normalized)
    }

    /// (start, end) overlay messages for a transition to this panel
    pub fn transition_messages(&self) -> (&'static str, &'static str) {
        match self {
            Panel::Results => ("Loading Detection Core...", "Results Ready"),
            Panel::Analytics => ("Compiling Analytics...", "Analytics Ready"),
            Panel::Logs => ("Fetching System Logs...", "Logs Ready"),
            Panel::Features => ("Loading Feature Maps...", "Features Ready"),
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Result of one `navigate` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Target panel became active
    Activated(Panel),
    /// Target did not resolve to a panel; overlay cycled, panels untouched
    UnknownTarget,
    /// A later navigation started before this one's delay elapsed
    Superseded,
}

struct NavigatorInner {
    active: Panel,
    generation: u64,
}

/// Navigation controller; clones share state
#[derive(Clone)]
pub struct Navigator {
    inner: Arc<RwLock<NavigatorInner>>,
    overlay: Overlay,
    transition_delay: Duration,
    event_bus: EventBus,
}

impl Navigator {
    /// Create a controller with `Results` active
    pub fn new(overlay: Overlay, transition_delay: Duration, event_bus: EventBus) -> Self {
        Self {
            inner: Arc::new(RwLock::new(NavigatorInner {
                active: Panel::Results,
                generation: 0,
            })),
            overlay,
            transition_delay,
            event_bus,
        }
    }

    /// Currently active panel
    pub async fn active(&self) -> Panel {
        self.inner.read().await.active
    }

    /// Switch to `target` after the transition delay
    pub async fn navigate(&self, target: &str) -> NavigationOutcome {
        let panel = Panel::resolve(target);
        let (start, end) = panel
            .map(|p| p.transition_messages())
            .unwrap_or(FALLBACK_MESSAGES);

        if panel.is_none() {
            warn!(nav_target = %target, "Unknown navigation target");
        }

        let ticket = {
            let mut inner = self.inner.write().await;
            inner.generation += 1;
            inner.generation
        };

        self.overlay.show(start).await;
        tokio::time::sleep(self.transition_delay).await;

        {
            let mut inner = self.inner.write().await;
            if inner.generation != ticket {
                debug!(nav_target = %target, "Navigation superseded by a later call");
                return NavigationOutcome::Superseded;
            }
            if let Some(panel) = panel {
                inner.active = panel;
            }
        }

        if let Some(panel) = panel {
            info!(panel = %panel, "Panel activated");
            self.event_bus.emit_lossy(DashEvent::PanelActivated {
                panel: panel.token().to_string(),
                timestamp: dfd_common::time::now(),
            });
        }

        self.overlay.hide(Some(end.to_string())).await;

        match panel {
            Some(panel) => NavigationOutcome::Activated(panel),
            None => NavigationOutcome::UnknownTarget,
        }
    }
}
