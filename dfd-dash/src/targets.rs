//! Addressable render targets
//!
//! Per-image regions are keyed `"<field>-<imageId>"`. Only registered keys
//! exist; writing to an unregistered key is a silent no-op because not every
//! view renders every image's detail region.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// Per-image field names
pub mod field {
    pub const LABEL: &str = "predicted-label";
    pub const CONFIDENCE: &str = "confidence";
    pub const FAKE_PROB: &str = "fake-prob";
    pub const REAL_PROB: &str = "real-prob";
    pub const CONFIDENCE_FILL: &str = "confidence-fill";
    pub const CONFIDENCE_CIRCLE: &str = "confidence-circle";
    pub const CHECK_ICON: &str = "check";
    pub const CROSS_ICON: &str = "cross";
    pub const OUTER: &str = "outer";
    pub const PREDICTION_INFO: &str = "prediction-info";

    pub const ALL: [&str; 10] = [
        LABEL,
        CONFIDENCE,
        FAKE_PROB,
        REAL_PROB,
        CONFIDENCE_FILL,
        CONFIDENCE_CIRCLE,
        CHECK_ICON,
        CROSS_ICON,
        OUTER,
        PREDICTION_INFO,
    ];
}

/// Build the key for a per-image field
pub fn key(field: &str, image_id: &str) -> String {
    format!("{}-{}", field, image_id)
}

/// One addressable element: text content, styling class and inline styles
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Element {
    pub text: Option<String>,
    pub class: Option<String>,
    pub styles: BTreeMap<String, String>,
}

impl Element {
    pub fn style(&self, name: &str) -> Option<&str> {
        self.styles.get(name).map(String::as_str)
    }
}

#[derive(Debug, Default)]
pub struct RenderTargets {
    elements: HashMap<String, Element>,
}

impl RenderTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty element under `key` (no-op if present)
    pub fn register(&mut self, key: impl Into<String>) {
        self.elements.entry(key.into()).or_default();
    }

    /// Register every per-image field for `image_id`
    pub fn register_image(&mut self, image_id: &str) {
        for f in field::ALL {
            self.register(key(f, image_id));
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.elements.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Element> {
        self.elements.get(key)
    }

    /// Element at `key` (text, class, styles) for one image field
    pub fn field(&self, field: &str, image_id: &str) -> Option<&Element> {
        self.get(&key(field, image_id))
    }

    /// Apply `update` if `key` exists; returns whether it did
    pub fn update(&mut self, key: &str, update: impl FnOnce(&mut Element)) -> bool {
        match self.elements.get_mut(key) {
            Some(element) => {
                update(element);
                true
            }
            None => false,
        }
    }

    pub fn set_text(&mut self, key: &str, text: impl Into<String>) -> bool {
        let text = text.into();
        self.update(key, |e| e.text = Some(text))
    }

    pub fn set_class(&mut self, key: &str, class: &str) -> bool {
        self.update(key, |e| e.class = Some(class.to_string()))
    }

    pub fn set_style(&mut self, key: &str, name: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update(key, |e| {
            e.styles.insert(name.to_string(), value);
        })
    }

    /// All elements, sorted by key
    pub fn snapshot(&self) -> BTreeMap<String, Element> {
        self.elements
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
