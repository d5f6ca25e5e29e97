//! Classification verdict wire type
//!
//! The backend answers each `{ "image": <path> }` request with a JSON object
//! in this shape. Every field is optional: a missing field (or JSON `null`)
//! is "not available", which is distinct from a present `0.0`.

use serde::{Deserialize, Serialize};

/// Classification result for one image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Predicted class label ("fake" or "real")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_label: Option<String>,

    /// Probability of the predicted class (0.0-1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Probability of the "fake" class (0.0-1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fake_probability: Option<f64>,

    /// Probability of the "real" class (0.0-1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_probability: Option<f64>,

    /// Legacy boolean verdict flag (true for fake)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_fake: Option<bool>,

    /// Backend-reported failure (e.g. "File not found")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Recognized verdict labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictLabel {
    Fake,
    Real,
}

impl VerdictLabel {
    /// Exact match on the backend's lowercase label
    pub fn parse(label: &str) -> Option<VerdictLabel> {
        match label {
            "fake" => Some(VerdictLabel::Fake),
            "real" => Some(VerdictLabel::Real),
            _ => None,
        }
    }
}

impl Verdict {
    /// Convenience constructor for a fully-populated verdict
    pub fn new(label: &str, confidence: f64, fake_probability: f64, real_probability: f64) -> Self {
        Self {
            predicted_label: Some(label.to_string()),
            confidence: Some(confidence),
            fake_probability: Some(fake_probability),
            real_probability: Some(real_probability),
            is_fake: None,
            error: None,
        }
    }

    /// Recognized label, if the backend sent exactly "fake" or "real"
    ///
    /// Any other value (including absent) yields `None`.
    pub fn label(&self) -> Option<VerdictLabel> {
        self.predicted_label.as_deref().and_then(VerdictLabel::parse)
    }

    /// Label text for display, `"Unknown"` when absent
    pub fn label_text(&self) -> &str {
        self.predicted_label.as_deref().unwrap_or("Unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_response_parses() {
        let json = r#"{"predicted_label":"fake","confidence":0.97,"fake_probability":0.97,"real_probability":0.03}"#;
        let verdict: Verdict = serde_json::from_str(json).unwrap();
        assert_eq!(verdict.label(), Some(VerdictLabel::Fake));
        assert_eq!(verdict.confidence, Some(0.97));
        assert_eq!(verdict.real_probability, Some(0.03));
        assert!(verdict.error.is_none());
    }

    #[test]
    fn test_empty_object_is_all_absent() {
        let verdict: Verdict = serde_json::from_str("{}").unwrap();
        assert_eq!(verdict, Verdict::default());
        assert_eq!(verdict.label_text(), "Unknown");
    }

    #[test]
    fn test_null_is_absent_but_zero_is_present() {
        let verdict: Verdict =
            serde_json::from_str(r#"{"confidence":null,"fake_probability":0}"#).unwrap();
        assert_eq!(verdict.confidence, None);
        assert_eq!(verdict.fake_probability, Some(0.0));
    }

    #[test]
    fn test_legacy_error_response() {
        let verdict: Verdict =
            serde_json::from_str(r#"{"is_fake":false,"error":"File not found"}"#).unwrap();
        assert_eq!(verdict.is_fake, Some(false));
        assert_eq!(verdict.error.as_deref(), Some("File not found"));
        assert_eq!(verdict.label(), None);
    }

    #[test]
    fn test_unrecognized_label_keeps_text() {
        let verdict: Verdict = serde_json::from_str(r#"{"predicted_label":"Unknown"}"#).unwrap();
        assert_eq!(verdict.label(), None);
        assert_eq!(verdict.label_text(), "Unknown");
    }

    #[test]
    fn test_absent_fields_not_serialized() {
        let json = serde_json::to_string(&Verdict::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
