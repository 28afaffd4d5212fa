//! Helpers for unwrapping the OData response envelope.
//!
//! List and entity payloads arrive wrapped in a `d` node
//! (`{"d":{"results":[...]}}` or `{"d":{...}}`). These helpers strip the
//! envelope and pull the continuation cursor out of paged responses; entity
//! materialization itself lives downstream.

use crate::core::ExactError;
use serde_json::Value;

/// Extract the JSON object inside the `d` envelope, serialized compactly.
pub fn json_object(response: &str) -> Result<String, ExactError> {
    let value = parse(response)?;
    let inner = envelope(&value)?;
    Ok(inner.to_string())
}

/// Extract the JSON array inside `d.results`, or `d` itself when it is
/// already an array.
pub fn json_array(response: &str) -> Result<String, ExactError> {
    let value = parse(response)?;
    let inner = envelope(&value)?;
    if inner.is_array() {
        return Ok(inner.to_string());
    }
    let results = inner
        .get("results")
        .ok_or_else(|| ExactError::Data("response is missing 'd.results'".into()))?;
    Ok(results.to_string())
}

/// Extract the `$skiptoken` value from the `__next` link of a paged
/// response.
///
/// Returns `Ok(None)` when the response has no further pages.
pub fn skip_token(response: &str) -> Result<Option<String>, ExactError> {
    let value = parse(response)?;
    let Some(inner) = value.get("d") else {
        return Ok(None);
    };
    let Some(next) = inner.get("__next").and_then(Value::as_str) else {
        return Ok(None);
    };
    let Some((_, rest)) = next.split_once("$skiptoken=") else {
        return Ok(None);
    };
    let token = rest.split(['&', '#']).next().unwrap_or("");
    Ok(Some(token.to_string()))
}

fn parse(response: &str) -> Result<Value, ExactError> {
    serde_json::from_str(response).map_err(|e| ExactError::Data(format!("response parse: {e}")))
}

fn envelope(value: &Value) -> Result<&Value, ExactError> {
    value
        .get("d")
        .ok_or_else(|| ExactError::Data("response is missing the 'd' envelope".into()))
}
