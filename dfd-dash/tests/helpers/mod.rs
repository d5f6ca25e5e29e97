//! Test Helper Utilities
//!
//! Shared utilities for testing dfd-dash

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dfd_common::config::TomlConfig;
use dfd_common::Verdict;
use dfd_dash::charts::HeadlessChartBackend;
use dfd_dash::classifier::{check_backend_error, Classifier, ClassifyError};
use dfd_dash::Dashboard;

/// Scripted reply for one image path
#[derive(Debug, Clone)]
pub enum Reply {
    Verdict(Verdict),
    /// Transport failure with this message
    Fail(String),
}

/// Classifier answering from a per-path script after a per-path delay
#[derive(Default)]
pub struct MockClassifier {
    replies: Mutex<HashMap<String, (Duration, Reply)>>,
    calls: AtomicUsize,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, path: &str, delay: Duration, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(path.to_string(), (delay, reply));
        self
    }

    pub fn verdict(self, path: &str, verdict: Verdict) -> Self {
        self.reply(path, Duration::ZERO, Reply::Verdict(verdict))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, image_path: &str) -> Result<Verdict, ClassifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.replies.lock().unwrap().get(image_path).cloned();
        let (delay, reply) = scripted
            .unwrap_or_else(|| (Duration::ZERO, Reply::Fail(format!("no script for {}", image_path))));

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match reply {
            Reply::Verdict(verdict) => check_backend_error(verdict),
            Reply::Fail(message) => Err(ClassifyError::Network(message)),
        }
    }
}

/// Dashboard over `classifier` with default timing and a shared chart backend
pub fn create_dashboard(classifier: MockClassifier) -> (Dashboard, HeadlessChartBackend) {
    create_dashboard_with(TomlConfig::default(), Arc::new(classifier))
}

pub fn create_dashboard_with(
    config: TomlConfig,
    classifier: Arc<MockClassifier>,
) -> (Dashboard, HeadlessChartBackend) {
    let backend = HeadlessChartBackend::new();
    let dashboard = Dashboard::new(&config, classifier, Box::new(backend.clone()));
    (dashboard, backend)
}
