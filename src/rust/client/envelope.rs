use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::ClientError;

/// Status string the backend uses for successful responses.
pub const STATUS_SUCCESS: &str = "success";
/// Envelope code the backend uses for successful responses.
pub const CODE_SUCCESS: i64 = 200;

/// The `{code, status, data}` wrapper shared by the backend's GET responses.
///
/// Fields are lenient: a missing or malformed `code`/`status` simply makes the
/// envelope invalid instead of failing the decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default, deserialize_with = "deserialize_code")]
    pub code: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ResponseEnvelope {
    /// Parses a response body.
    ///
    /// Bodies that are valid JSON but not an object (an array, `null`, a bare
    /// string) yield an empty, invalid envelope. Only bodies that are not JSON
    /// at all are an error.
    pub fn parse(body: &str) -> Result<Self, ClientError> {
        let value: Value = serde_json::from_str(body)?;
        if !value.is_object() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// True iff `code == 200` and `status == "success"`.
    pub fn is_valid(&self) -> bool {
        self.code == Some(CODE_SUCCESS) && self.status.as_deref() == Some(STATUS_SUCCESS)
    }

    /// Returns `data` when the envelope is valid.
    ///
    /// A valid envelope whose `data` is absent or `null` also yields `None`.
    pub fn into_data(self) -> Option<Value> {
        if !self.is_valid() {
            return None;
        }
        match self.data {
            Some(Value::Null) | None => None,
            data => data,
        }
    }
}

// The backend is not consistent about the type of `code`. It is read the way
// an integer cast reads it: floats truncate, strings use their leading
// numeric prefix ("200.0", " 200", "200abc" are all 200) and anything
// non-numeric is 0.
fn deserialize_code<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_code(&value))
}

fn coerce_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => Some(leading_number(s).map_or(0, |f| f.trunc() as i64)),
        _ => None,
    }
}

/// Longest numeric prefix of `s` after leading whitespace:
/// `[+-]?digits[.digits][(e|E)[+-]?digits]`.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits(end);
    let mut mantissa_end = int_end;
    if bytes.get(int_end) == Some(&b'.') {
        let frac_end = digits(int_end + 1);
        if frac_end > int_end + 1 || int_end > end {
            mantissa_end = frac_end;
        }
    }
    if mantissa_end == end {
        return None;
    }

    end = mantissa_end;
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_start = end + 1;
        if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
            exp_start += 1;
        }
        let exp_end = digits(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }
    s[..end].parse().ok()
}
