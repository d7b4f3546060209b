//! Grading-result validation
//!
//! The grading endpoint returns free-form text that is only purportedly
//! JSON. This module coerces that blob into a strict [`GradingRecord`] or
//! fails with [`GraderError::MalformedResponse`]. It performs no score-range
//! clamping: a score above `max_score` passes through untouched and is a
//! model-quality issue, not a validation failure.

use serde_json::Value;

use crate::error::GraderError;
use crate::types::{Correctness, GradingRecord};

/// Parse and normalize a raw endpoint payload.
///
/// Fails when the payload is not valid JSON, not an object, is missing
/// `correctness` or holds one outside the enumerated values, or carries a
/// `score`/`max_score` that cannot be coerced to a number. `max_score`
/// defaults to `fallback_max_score` when absent; `matched_points` /
/// `missing_points` default to empty and scalars are wrapped into singleton
/// lists; `feedback` defaults to the empty string.
pub fn validate(raw: &str, fallback_max_score: f64) -> Result<GradingRecord, GraderError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| {
        GraderError::MalformedResponse(format!("invalid JSON: {e}; raw: {}", excerpt(raw)))
    })?;

    let object = value
        .as_object()
        .ok_or_else(|| GraderError::MalformedResponse("payload is not a JSON object".into()))?;

    let correctness = object
        .get("correctness")
        .ok_or_else(|| GraderError::MalformedResponse("missing 'correctness'".into()))?;
    let correctness = correctness
        .as_str()
        .and_then(Correctness::from_wire)
        .ok_or_else(|| {
            GraderError::MalformedResponse(format!("invalid 'correctness' value: {correctness}"))
        })?;

    let score = match object.get("score") {
        Some(value) => coerce_number(value, "score")?,
        None => 0.0,
    };
    let max_score = match object.get("max_score") {
        Some(value) => coerce_number(value, "max_score")?,
        None => fallback_max_score,
    };

    Ok(GradingRecord {
        score,
        max_score,
        correctness,
        matched_points: string_list(object.get("matched_points")),
        missing_points: string_list(object.get("missing_points")),
        feedback: object.get("feedback").map(stringify).unwrap_or_default(),
    })
}

/// Coerce a JSON number or numeric string into an f64.
fn coerce_number(value: &Value, field: &str) -> Result<f64, GraderError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        GraderError::MalformedResponse(format!("field '{field}' must be a number, got {value}"))
    })
}

/// Absent/null becomes empty; a non-list scalar becomes a singleton list;
/// every element is stringified.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(stringify).collect(),
        Some(other) => vec![stringify(other)],
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn excerpt(raw: &str) -> &str {
    if raw.len() <= 500 {
        return raw;
    }
    let mut end = 500;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    &raw[..end]
}
