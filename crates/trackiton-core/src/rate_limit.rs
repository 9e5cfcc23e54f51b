//! Detection of upstream throttling notices inside decoded payloads.
//!
//! The API reports quota problems with HTTP 200 and a diagnostic field instead
//! of data, so throttling has to be recognised from the body.

use serde_json::Value;

/// Payload fields that carry upstream diagnostics.
pub const DIAGNOSTIC_KEYS: [&str; 2] = ["Note", "Information"];

const CALL_FREQUENCY_MARKER: &str = "API call frequency";
const PREMIUM_MARKER: &str = "premium";

/// Returns the first diagnostic text present in the payload.
pub fn diagnostic(payload: &Value) -> Option<&str> {
    DIAGNOSTIC_KEYS
        .iter()
        .find_map(|key| payload.get(key).and_then(Value::as_str))
}

/// True iff a diagnostic field reports a call-frequency or premium-tier limit.
pub fn is_limited(payload: &Value) -> bool {
    DIAGNOSTIC_KEYS
        .iter()
        .filter_map(|key| payload.get(key).and_then(Value::as_str))
        .any(|text| text.contains(CALL_FREQUENCY_MARKER) || text.contains(PREMIUM_MARKER))
}
