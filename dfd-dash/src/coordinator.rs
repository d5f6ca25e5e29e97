//! Detection request coordinator
//!
//! One `check_image` call issues one classification request. On success the
//! verdict is written to the result store and fanned out to every view under
//! the views lock; on failure a single error line is logged and nothing else
//! changes. Failures never propagate to the caller as errors.
//!
//! Each request runs under the configured timeout and its own
//! `CancellationToken`. Completions are applied in arrival order, so for two
//! concurrent requests on the same image the later completion wins.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dfd_common::events::{DashEvent, EventBus};
use dfd_common::Verdict;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classifier::{Classifier, ClassifyError};
use crate::overlay::Overlay;
use crate::views::Views;

/// Closing overlay message after a successful detection
pub const COMPLETE_MESSAGE: &str = "Analysis Complete";
/// Closing overlay message after a failed detection
pub const FAILED_MESSAGE: &str = "Analysis Failed";

/// Result of one `check_image` call
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    /// Verdict stored and all views refreshed
    Completed(Verdict),
    /// Request failed; message as logged to the console
    Failed(String),
}

impl DetectionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, DetectionOutcome::Completed(_))
    }
}

struct InFlight {
    image_id: String,
    cancel_token: CancellationToken,
}

/// Coordinator handle; clones share in-flight bookkeeping
#[derive(Clone)]
pub struct DetectionCoordinator {
    classifier: Arc<dyn Classifier>,
    views: Arc<Mutex<Views>>,
    overlay: Overlay,
    show_busy_overlay: bool,
    request_timeout: Duration,
    in_flight: Arc<Mutex<HashMap<Uuid, InFlight>>>,
    last_error: Arc<RwLock<Option<String>>>,
    event_bus: EventBus,
}

impl DetectionCoordinator {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        views: Arc<Mutex<Views>>,
        overlay: Overlay,
        show_busy_overlay: bool,
        request_timeout: Duration,
        event_bus: EventBus,
    ) -> Self {
        Self {
            classifier,
            views,
            overlay,
            show_busy_overlay,
            request_timeout,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            last_error: Arc::new(RwLock::new(None)),
            event_bus,
        }
    }

    /// Classify `full_path` and propagate the verdict for `image_id`
    pub async fn check_image(&self, full_path: &str, image_id: &str) -> DetectionOutcome {
        let request_id = Uuid::new_v4();
        let cancel_token = CancellationToken::new();
        self.in_flight.lock().await.insert(
            request_id,
            InFlight {
                image_id: image_id.to_string(),
                cancel_token: cancel_token.clone(),
            },
        );

        info!(request_id = %request_id, image_id = %image_id, image = %full_path, "Detection started");
        self.event_bus.emit_lossy(DashEvent::DetectionStarted {
            request_id,
            image_id: image_id.to_string(),
            timestamp: dfd_common::time::now(),
        });

        if self.show_busy_overlay {
            self.overlay.show(format!("Analyzing {}...", image_id)).await;
        }

        let result = tokio::select! {
            _ = cancel_token.cancelled() => Err(ClassifyError::Cancelled),
            response = tokio::time::timeout(self.request_timeout, self.classifier.classify(full_path)) => {
                match response {
                    Ok(result) => result,
                    Err(_) => Err(ClassifyError::Timeout(self.request_timeout)),
                }
            }
        };

        self.in_flight.lock().await.remove(&request_id);

        match result {
            Ok(verdict) => self.complete(request_id, image_id, verdict).await,
            Err(e) => self.fail(request_id, image_id, e).await,
        }
    }

    async fn complete(&self, request_id: Uuid, image_id: &str, verdict: Verdict) -> DetectionOutcome {
        if self.show_busy_overlay {
            self.overlay.hide(Some(COMPLETE_MESSAGE.to_string())).await;
        }

        self.views.lock().await.apply_verdict(image_id, &verdict);

        info!(
            request_id = %request_id,
            image_id = %image_id,
            label = verdict.label_text(),
            "Detection complete"
        );
        self.event_bus.emit_lossy(DashEvent::DetectionCompleted {
            request_id,
            image_id: image_id.to_string(),
            verdict: verdict.clone(),
            timestamp: dfd_common::time::now(),
        });

        DetectionOutcome::Completed(verdict)
    }

    async fn fail(&self, request_id: Uuid, image_id: &str, error: ClassifyError) -> DetectionOutcome {
        let message = error.to_string();
        warn!(request_id = %request_id, image_id = %image_id, error = %message, "Detection failed");

        let line = format!("Error checking {}: {}", image_id, message);
        self.views.lock().await.log.append_log(&line);
        *self.last_error.write().await = Some(line);

        if self.show_busy_overlay {
            self.overlay.hide(Some(FAILED_MESSAGE.to_string())).await;
        }

        self.event_bus.emit_lossy(DashEvent::DetectionFailed {
            request_id,
            image_id: image_id.to_string(),
            message: message.clone(),
            timestamp: dfd_common::time::now(),
        });

        DetectionOutcome::Failed(message)
    }

    /// Cancel every in-flight request for `image_id`; returns how many
    pub async fn cancel(&self, image_id: &str) -> usize {
        let in_flight = self.in_flight.lock().await;
        let mut cancelled = 0;
        for request in in_flight.values().filter(|r| r.image_id == image_id) {
            request.cancel_token.cancel();
            cancelled += 1;
        }
        debug!(image_id = %image_id, cancelled, "Cancel requested");
        cancelled
    }

    /// Cancel every in-flight request; returns how many
    pub async fn cancel_all(&self) -> usize {
        let in_flight = self.in_flight.lock().await;
        for request in in_flight.values() {
            request.cancel_token.cancel();
        }
        debug!(cancelled = in_flight.len(), "Cancel all requested");
        in_flight.len()
    }

    /// Most recent detection failure, as logged
    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    /// Requests issued and not yet completed
    pub async fn in_flight(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}
