//! JSON response decoding.

use serde_json::{Map, Value};
use syrup_domain::{Result, SyrupError};

/// Decode a response body into JSON.
///
/// An empty body or a literal `null` decodes to an empty object, never to
/// `null`.
///
/// # Errors
/// Returns `SyrupError::Decode` if the body is not valid JSON.
pub fn decode_json(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| SyrupError::Decode(e.to_string()))?;

    Ok(match value {
        Value::Null => Value::Object(Map::new()),
        other => other,
    })
}
