//! Per-image detail view renderer
//!
//! Writes label, probabilities, confidence fill and verdict iconography for
//! one image into its `"<field>-<imageId>"` targets.

use dfd_common::{Verdict, VerdictLabel};

use crate::format;
use crate::targets::{field, key, RenderTargets};

/// Styling class applied for a fake verdict
pub const FAKE_CLASS: &str = "verdict-fake";
/// Styling class applied for a real verdict
pub const REAL_CLASS: &str = "verdict-real";

/// Render `verdict` into the detail targets of `image_id`
///
/// Unrecognized or absent labels leave prior styling untouched; absent
/// confidence leaves the fill and circle untouched.
pub fn render(targets: &mut RenderTargets, image_id: &str, verdict: &Verdict) {
    targets.set_text(&key(field::LABEL, image_id), verdict.label_text());
    targets.set_text(
        &key(field::CONFIDENCE, image_id),
        format::probability(verdict.confidence),
    );
    targets.set_text(
        &key(field::FAKE_PROB, image_id),
        format::probability(verdict.fake_probability),
    );
    targets.set_text(
        &key(field::REAL_PROB, image_id),
        format::probability(verdict.real_probability),
    );

    let outer = key(field::OUTER, image_id);
    targets.set_style(&outer, "visibility", "visible");
    targets.set_style(&outer, "display", "flex");
    targets.set_style(&key(field::PREDICTION_INFO, image_id), "display", "block");

    if let Some(label) = verdict.label() {
        let class = match label {
            VerdictLabel::Fake => FAKE_CLASS,
            VerdictLabel::Real => REAL_CLASS,
        };
        targets.set_class(&key(field::LABEL, image_id), class);
        targets.set_class(&outer, class);
    }

    // Legacy responses may only carry `is_fake`
    let fake = match verdict.label() {
        Some(label) => Some(label == VerdictLabel::Fake),
        None => verdict.is_fake,
    };
    if let Some(fake) = fake {
        let (check, cross) = if fake { ("none", "inline") } else { ("inline", "none") };
        targets.set_style(&key(field::CHECK_ICON, image_id), "display", check);
        targets.set_style(&key(field::CROSS_ICON, image_id), "display", cross);
    }

    if let Some(confidence) = verdict.confidence {
        let width = format::fill_width(confidence);
        targets.set_style(&key(field::CONFIDENCE_FILL, image_id), "width", width.clone());
        targets.set_style(&key(field::CONFIDENCE_CIRCLE, image_id), "--progress", width);
    }
}
