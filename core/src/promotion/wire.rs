//! Scalar coercions shared by the promotion wire DTOs.
//!
//! The API is loose about scalars: amounts and ids arrive as JSON numbers or
//! as numeric strings depending on the endpoint. Wire structs keep them as
//! raw `serde_json::Value` and these helpers narrow them to the declared
//! type of the variant being built.

use serde_json::Value;

use crate::error::PromotionError;

pub(crate) fn required<T>(value: Option<T>, field: &'static str) -> Result<T, PromotionError> {
    value.ok_or(PromotionError::MissingField { field })
}

fn invalid(field: &'static str, value: &Value) -> PromotionError {
    PromotionError::InvalidField {
        field,
        value: value.to_string(),
    }
}

pub(crate) fn decimal(value: &Value, field: &'static str) -> Result<f64, PromotionError> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| invalid(field, value))
}

pub(crate) fn unsigned(value: &Value, field: &'static str) -> Result<u64, PromotionError> {
    let parsed = match value {
        Value::Number(number) => number.as_u64().or_else(|| number.as_f64().and_then(whole)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<u64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(whole))
        }
        _ => None,
    };

    parsed.ok_or_else(|| invalid(field, value))
}

pub(crate) fn count(value: &Value, field: &'static str) -> Result<u32, PromotionError> {
    let wide = unsigned(value, field)?;
    u32::try_from(wide).map_err(|_| invalid(field, value))
}

pub(crate) fn id_list(values: &[Value], field: &'static str) -> Result<Vec<u64>, PromotionError> {
    values.iter().map(|value| unsigned(value, field)).collect()
}

pub(crate) fn string_list(
    values: &[Value],
    field: &'static str,
) -> Result<Vec<String>, PromotionError> {
    values
        .iter()
        .map(|value| match value {
            Value::String(text) => Ok(text.clone()),
            Value::Number(number) => Ok(number.to_string()),
            other => Err(invalid(field, other)),
        })
        .collect()
}

/// The string value of a `type` discriminant, if it is one.
pub(crate) fn tag(kind: Option<&Value>) -> Option<&str> {
    kind.and_then(Value::as_str)
}

/// A discriminant as reported in errors: strings verbatim, other values as
/// JSON, `None` when absent or `null`.
pub(crate) fn tag_text(kind: Option<&Value>) -> Option<String> {
    match kind {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// Accepts floats that hold an exact non-negative integer, e.g. `3.0`.
fn whole(amount: f64) -> Option<u64> {
    if amount.is_finite() && amount >= 0.0 && amount.fract() == 0.0 && amount <= u64::MAX as f64 {
        Some(amount as u64)
    } else {
        None
    }
}
