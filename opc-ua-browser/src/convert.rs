use crate::tag::TypeTag;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use opc_ua_client::Value;
use thiserror::Error;

/// Locale-independent datetime display form, also accepted by
/// [`parse_value`]. Interpreted as UTC.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A user-supplied string could not be converted to the target type.
///
/// Recoverable: the caller reports it and keeps going; a failed conversion
/// never aborts the surrounding write flow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConvertError {
    /// The text does not parse as the target type.
    #[error("cannot convert {text:?} to {target}: {reason}")]
    Invalid {
        text: String,
        target: TypeTag,
        reason: String,
    },

    /// The target tag has no write representation (`Unknown`, array forms).
    #[error("unsupported target type {target} for write (input {text:?})")]
    UnsupportedTarget { text: String, target: TypeTag },
}

impl ConvertError {
    fn invalid(text: &str, target: &TypeTag, reason: impl std::fmt::Display) -> Self {
        Self::Invalid {
            text: text.to_string(),
            target: target.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Parse a user-supplied string into a typed value for the given target tag.
///
/// # Errors
/// Returns [`ConvertError`] when the text does not parse as the target type
/// or the target type is not writable (`Unknown` and array tags).
pub fn parse_value(text: &str, target: &TypeTag) -> Result<Value, ConvertError> {
    match target {
        TypeTag::Boolean => match text.trim() {
            t if t.eq_ignore_ascii_case("true") => Ok(Value::Boolean(true)),
            t if t.eq_ignore_ascii_case("false") => Ok(Value::Boolean(false)),
            _ => Err(ConvertError::invalid(text, target, "expected true or false")),
        },
        TypeTag::Int32 => text
            .trim()
            .parse::<i32>()
            .map(Value::Int32)
            .map_err(|e| ConvertError::invalid(text, target, e)),
        TypeTag::Double => text
            .trim()
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|e| ConvertError::invalid(text, target, e)),
        TypeTag::String => Ok(Value::Text(text.to_string())),
        TypeTag::DateTime => parse_datetime(text.trim())
            .map(Value::DateTime)
            .ok_or_else(|| ConvertError::invalid(text, target, "unrecognized date/time form")),
        TypeTag::ByteArray => BASE64
            .decode(text.trim())
            .map(Value::Bytes)
            .map_err(|e| ConvertError::invalid(text, target, e)),
        TypeTag::Array(_) | TypeTag::Unknown => Err(ConvertError::UnsupportedTarget {
            text: text.to_string(),
            target: target.clone(),
        }),
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, or a bare `YYYY-MM-DD`
/// (midnight). Naive forms are interpreted as UTC.
fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, DATETIME_FORMAT) {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Render a value for display.
///
/// Scalars use their natural string form (bytes as Base64, datetimes in
/// [`DATETIME_FORMAT`]); arrays become a count summary followed by one
/// indented line per element, newline-joined.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Array(_) => render_lines(value).join("\n"),
        _ => render_scalar(value),
    }
}

/// Render a value as display lines: one line for scalars, a
/// `"Array (<n> items)"` summary plus `"    <index>: <element>"` per element
/// for arrays.
pub fn render_lines(value: &Value) -> Vec<String> {
    match value {
        Value::Array(elements) => {
            let mut lines = Vec::with_capacity(elements.len() + 1);
            lines.push(format!("Array ({} items)", elements.len()));
            for (index, element) in elements.iter().enumerate() {
                lines.push(format!("    {index}: {}", render_scalar(element)));
            }
            lines
        }
        _ => vec![render_scalar(value)],
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::Boolean(b) => b.to_string(),
        Value::Int32(i) => i.to_string(),
        Value::Double(d) => d.to_string(),
        Value::Text(s) => s.clone(),
        Value::Bytes(b) => BASE64.encode(b),
        Value::DateTime(ts) => ts.format(DATETIME_FORMAT).to_string(),
        // Nested arrays inside an array render as their summary line.
        Value::Array(elements) => format!("Array ({} items)", elements.len()),
    }
}
