// Trace metadata block
// Parses the key-value header as pure data; nothing in it is ever evaluated

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("metadata is not a data literal: {0}")]
    Syntax(serde_json::Error),

    #[error("metadata must be a key-value object, found {0}")]
    NotAnObject(&'static str),

    #[error("metadata field has the wrong type: {0}")]
    InvalidField(serde_json::Error),

    #[error("metadata field `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Acquisition settings stored at the head of a trace file
///
/// The block is an open key-value map. Fields this crate does not interpret
/// are kept in `extra` so that re-encoding a file preserves them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceMetadata {
    /// Enabled hardware channels, 0-based, in record order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<u32>>,

    /// Width of one time bin in microseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_width_micros: Option<f64>,

    /// Planned acquisition duration in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition_time_millis: Option<f64>,

    /// Laser pulse period in nanoseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laser_period_ns: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TraceMetadata {
    /// Declared channels, empty when the field is absent or null
    pub fn channels(&self) -> &[u32] {
        self.channels.as_deref().unwrap_or(&[])
    }

    pub fn channel_count(&self) -> usize {
        self.channels().len()
    }

    /// User-facing channel labels ("Channel 1" for stored index 0)
    pub fn channel_labels(&self) -> Vec<String> {
        self.channels()
            .iter()
            .map(|ch| channel_label(*ch))
            .collect()
    }

    /// Get acquisition time in seconds
    pub fn acquisition_time_secs(&self) -> Option<f64> {
        self.acquisition_time_millis.map(|ms| ms / 1000.0)
    }

    /// Check the numeric fields against their allowed ranges
    pub fn validate(&self) -> Result<(), MetadataError> {
        check_range("bin_width_micros", self.bin_width_micros, |v| v > 0.0)?;
        check_range("acquisition_time_millis", self.acquisition_time_millis, |v| v >= 0.0)?;
        check_range("laser_period_ns", self.laser_period_ns, |v| v > 0.0)?;
        Ok(())
    }
}

/// Label for a stored (0-based) channel index
pub fn channel_label(channel: u32) -> String {
    format!("Channel {}", u64::from(channel) + 1)
}

fn check_range(
    field: &'static str,
    value: Option<f64>,
    allowed: impl Fn(f64) -> bool,
) -> Result<(), MetadataError> {
    match value {
        Some(v) if !v.is_finite() || !allowed(v) => Err(MetadataError::OutOfRange { field, value: v }),
        _ => Ok(()),
    }
}

/// Parse a metadata block from its raw bytes
///
/// Accepts JSON, plus the `None`/`True`/`False` keywords some producers
/// write in place of `null`/`true`/`false`. Anything else that is not a
/// data literal (identifiers, calls, operators) is rejected.
pub fn parse_metadata(bytes: &[u8]) -> Result<TraceMetadata, MetadataError> {
    let text = std::str::from_utf8(bytes)?;
    let text = normalize_literals(text);

    let value: Value = serde_json::from_str(&text).map_err(MetadataError::Syntax)?;
    if !value.is_object() {
        return Err(MetadataError::NotAnObject(value_kind(&value)));
    }

    let metadata: TraceMetadata =
        serde_json::from_value(value).map_err(MetadataError::InvalidField)?;
    metadata.validate()?;

    Ok(metadata)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Rewrite the keyword literals `None`, `True` and `False` to their JSON
/// spelling. String contents are copied untouched; other words are left as
/// they are so the JSON parser rejects them.
fn normalize_literals(text: &str) -> Cow<'_, str> {
    let mut out: Option<String> = None;
    let mut in_string = false;
    let mut escaped = false;
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if c.is_ascii_alphabetic() || c == '_' {
            let mut end = start + c.len_utf8();
            while let Some(&(idx, next)) = chars.peek() {
                if !(next.is_ascii_alphanumeric() || next == '_') {
                    break;
                }
                end = idx + next.len_utf8();
                chars.next();
            }

            let word = &text[start..end];
            let literal = match word {
                "None" => Some("null"),
                "True" => Some("true"),
                "False" => Some("false"),
                _ => None,
            };

            if let Some(literal) = literal {
                out.get_or_insert_with(|| text[..start].to_string())
                    .push_str(literal);
            } else if let Some(out) = out.as_mut() {
                out.push_str(word);
            }
            continue;
        }

        if let Some(out) = out.as_mut() {
            out.push(c);
        }
    }

    match out {
        Some(normalized) => Cow::Owned(normalized),
        None => Cow::Borrowed(text),
    }
}
