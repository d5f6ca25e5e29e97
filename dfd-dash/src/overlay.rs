//! Full-screen overlay state machine
//!
//! States are `Hidden` and `Visible(message)`. `show` replaces the message
//! immediately. `hide(Some(final))` shows the closing message and hides after
//! the display delay; `hide(None)` hides at once.
//!
//! Every call advances a generation counter. A delayed hide only lands if no
//! other call happened after it was scheduled, so a `show` during the delay
//! window keeps the overlay visible with the newer message.

use std::sync::Arc;
use std::time::Duration;

use dfd_common::events::{DashEvent, EventBus};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

/// Observable overlay state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message")]
pub enum OverlayState {
    Hidden,
    Visible(String),
}

impl OverlayState {
    pub fn is_visible(&self) -> bool {
        matches!(self, OverlayState::Visible(_))
    }

    /// Current message; hidden overlays have none
    pub fn message(&self) -> Option<&str> {
        match self {
            OverlayState::Visible(message) => Some(message),
            OverlayState::Hidden => None,
        }
    }
}

struct OverlayInner {
    state: OverlayState,
    generation: u64,
}

/// Overlay handle; clones share state
#[derive(Clone)]
pub struct Overlay {
    name: &'static str,
    inner: Arc<RwLock<OverlayInner>>,
    hide_delay: Duration,
    event_bus: EventBus,
}

impl Overlay {
    /// Create a hidden overlay
    ///
    /// * `name` - overlay identity in published events ("busy", "splash")
    /// * `hide_delay` - how long a closing message stays visible
    pub fn new(name: &'static str, hide_delay: Duration, event_bus: EventBus) -> Self {
        Self {
            name,
            inner: Arc::new(RwLock::new(OverlayInner {
                state: OverlayState::Hidden,
                generation: 0,
            })),
            hide_delay,
            event_bus,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn state(&self) -> OverlayState {
        self.inner.read().await.state.clone()
    }

    /// Show (or re-label) the overlay
    pub async fn show(&self, message: impl Into<String>) {
        let message = message.into();
        {
            let mut inner = self.inner.write().await;
            inner.generation += 1;
            inner.state = OverlayState::Visible(message.clone());
        }
        debug!(overlay = self.name, text = %message, "Overlay shown");
        self.publish(true, Some(message));
    }

    /// Hide the overlay, optionally after showing a closing message
    ///
    /// With a final message the hide is scheduled on a background task and
    /// the call returns immediately.
    pub async fn hide(&self, final_message: Option<String>) {
        match final_message {
            None => {
                {
                    let mut inner = self.inner.write().await;
                    inner.generation += 1;
                    inner.state = OverlayState::Hidden;
                }
                debug!(overlay = self.name, "Overlay hidden");
                self.publish(false, None);
            }
            Some(message) => {
                let scheduled = {
                    let mut inner = self.inner.write().await;
                    inner.generation += 1;
                    inner.state = OverlayState::Visible(message.clone());
                    inner.generation
                };
                self.publish(true, Some(message));
                self.schedule_hide(scheduled, self.hide_delay);
            }
        }
    }

    /// Hide after `delay` unless another call supersedes it first
    ///
    /// Used for the boot splash, which has its own fixed delay.
    pub async fn hide_after(&self, delay: Duration) {
        let scheduled = self.inner.read().await.generation;
        self.schedule_hide(scheduled, delay);
    }

    fn schedule_hide(&self, scheduled: u64, delay: Duration) {
        let overlay = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let applied = {
                let mut inner = overlay.inner.write().await;
                if inner.generation == scheduled {
                    inner.state = OverlayState::Hidden;
                    true
                } else {
                    false
                }
            };
            if applied {
                debug!(overlay = overlay.name, "Overlay hidden after delay");
                overlay.publish(false, None);
            } else {
                debug!(overlay = overlay.name, "Delayed hide superseded");
            }
        });
    }

    fn publish(&self, visible: bool, message: Option<String>) {
        self.event_bus.emit_lossy(DashEvent::OverlayChanged {
            overlay: self.name.to_string(),
            visible,
            message,
            timestamp: dfd_common::time::now(),
        });
    }
}
