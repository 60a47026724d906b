//! Presentation helpers for prediction results.
//!
//! The gateway returns a raw scalar; everything about showing it lives
//! here. No rounding or clamping happens upstream, so a caller that wants a
//! non-negative display applies its own floor before formatting.

use crate::error::{Error, Stage};
use crate::features::{FeatureRecord, FEATURE_COLUMNS};

/// Formats a predicted sales value as currency: two decimals, thousands
/// grouping, sign ahead of the symbol (`-$12.34`, never `$-12.34`). A
/// negative that rounds to zero drops its sign and renders `$0.00`.
#[must_use]
pub fn format_currency(value: f32) -> String {
    let rendered = format!("{:.2}", value.abs());
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((rendered.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && rendered != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{frac_part}")
}

/// Headline line for a successful prediction.
#[must_use]
pub fn headline(value: f32) -> String {
    format!("Predicted Sales: {}", format_currency(value))
}

/// Feature/value pairs for the input summary, in column order.
///
/// Weights and prices show two decimals, visibility four, labels verbatim.
#[must_use]
pub fn summary(record: &FeatureRecord) -> Vec<(&'static str, String)> {
    vec![
        (FEATURE_COLUMNS[0], record.item_identifier.to_string()),
        (FEATURE_COLUMNS[1], format!("{:.2}", record.item_weight)),
        (FEATURE_COLUMNS[2], record.item_fat_content.clone()),
        (FEATURE_COLUMNS[3], format!("{:.4}", record.item_visibility)),
        (FEATURE_COLUMNS[4], record.item_type.to_string()),
        (FEATURE_COLUMNS[5], format!("{:.2}", record.item_mrp)),
        (FEATURE_COLUMNS[6], record.outlet_identifier.to_string()),
        (
            FEATURE_COLUMNS[7],
            record.outlet_establishment_year.to_string(),
        ),
        (FEATURE_COLUMNS[8], record.outlet_size.clone()),
        (FEATURE_COLUMNS[9], record.outlet_location_type.clone()),
        (FEATURE_COLUMNS[10], record.outlet_type.to_string()),
    ]
}

/// Operator-facing line for a failure, routed by tier.
///
/// Load-tier failures mean nothing can be predicted until the artifact is
/// fixed; request-tier failures fault only the request at hand.
#[must_use]
pub fn failure_line(error: &Error) -> String {
    match error.stage() {
        Stage::Load => format!("Prediction unavailable: {error}"),
        Stage::Request => format!("Request rejected: {error}"),
    }
}
