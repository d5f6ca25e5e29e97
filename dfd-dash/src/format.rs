//! Display formatting for verdict values
//!
//! Absence is checked explicitly: `None` renders as [`NOT_AVAILABLE`] while a
//! present `0.0` renders as digits.

/// Sentinel shown for absent values
pub const NOT_AVAILABLE: &str = "N/A";

/// Probability with 4 decimals (`0.97` -> `"0.9700"`), or `"N/A"`
pub fn probability(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.4}", v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Percentage with 2 decimals (`0.97` -> `"97.00"`), or `"N/A"`
pub fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v * 100.0),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// CSS-style width for a proportional fill (`0.97` -> `"97.00%"`)
pub fn fill_width(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}
