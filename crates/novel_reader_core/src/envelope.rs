//! crates/novel_reader_core/src/envelope.rs
//!
//! One response-envelope decoder shared by every service.
//!
//! The backend answers in several shapes: a bare record, `{data: record}`,
//! `{success, data, message}`, and occasionally an envelope nested inside another
//! envelope. Every layer is peeled here, so services only name the payload type.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::Page;

/// Keys that may appear on an envelope object. An object carrying `data` and only
/// these keys is treated as a wrapper rather than as the payload itself.
const ENVELOPE_KEYS: &[&str] = &[
    "success",
    "data",
    "message",
    "error",
    "status",
    "meta",
    "pagination",
    "nextCursor",
    "hasMore",
    "total",
    "count",
];

/// Collection keys a paginated payload object may hold its items under.
const COLLECTION_KEYS: &[&str] = &["items", "novels", "chapters", "comments", "bookmarks", "results"];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnvelopeError {
    /// The envelope said `success: false`.
    #[error("{0}")]
    Rejected(String),
    /// The payload did not have the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Parses a raw response body. An empty body decodes as JSON `null`.
pub fn parse_body(body: &str) -> Result<Value, EnvelopeError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| EnvelopeError::Malformed(e.to_string()))
}

/// Decodes the payload of a single-record or list response.
pub fn decode_data<T: DeserializeOwned>(body: &Value) -> Result<T, EnvelopeError> {
    let (payload, _) = peel(body)?;
    from_payload(payload)
}

/// Decodes a cursor-paginated listing.
pub fn decode_page<T: DeserializeOwned>(body: &Value) -> Result<Page<T>, EnvelopeError> {
    let (payload, layers) = peel(body)?;

    let items: Vec<T> = match payload {
        Value::Null => Vec::new(),
        Value::Array(_) => from_payload(payload)?,
        Value::Object(map) => {
            let items = COLLECTION_KEYS
                .iter()
                .find_map(|key| map.get(*key).filter(|v| v.is_array()))
                .ok_or_else(|| EnvelopeError::Malformed("listing has no item array".to_string()))?;
            from_payload(items)?
        }
        other => {
            return Err(EnvelopeError::Malformed(format!(
                "expected a listing, found {}",
                kind_of(other)
            )))
        }
    };

    // Pagination metadata may sit on any envelope layer or next to the items.
    let mut scopes: Vec<&Map<String, Value>> = layers;
    if let Value::Object(map) = payload {
        scopes.push(map);
    }

    let next_cursor = scopes.iter().find_map(|scope| cursor_in(scope));
    let has_more = scopes
        .iter()
        .find_map(|scope| has_more_in(scope))
        .unwrap_or(next_cursor.is_some());

    Ok(Page {
        items,
        next_cursor,
        has_more,
    })
}

/// Extracts a human-readable message from an error response, trying the known shapes
/// in order and falling back to a message derived from the status code.
pub fn extract_error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = message_in(&value) {
            return message;
        }
    } else {
        let text = body.trim();
        if !text.is_empty() && text.len() <= 200 && !text.starts_with('<') {
            return text.to_string();
        }
    }

    default_message(status)
}

fn from_payload<T: DeserializeOwned>(payload: &Value) -> Result<T, EnvelopeError> {
    serde_json::from_value(payload.clone()).map_err(|e| EnvelopeError::Malformed(e.to_string()))
}

fn peel(body: &Value) -> Result<(&Value, Vec<&Map<String, Value>>), EnvelopeError> {
    let mut layers = Vec::new();
    let mut current = body;

    while let Value::Object(map) = current {
        if map.get("success") == Some(&Value::Bool(false)) {
            let message = message_in(current).unwrap_or_else(|| "Request was rejected".to_string());
            return Err(EnvelopeError::Rejected(message));
        }
        if !is_envelope(map) {
            break;
        }
        layers.push(map);
        current = &map["data"];
    }

    Ok((current, layers))
}

fn is_envelope(map: &Map<String, Value>) -> bool {
    map.contains_key("data") && map.keys().all(|k| ENVELOPE_KEYS.contains(&k.as_str()))
}

fn cursor_in(scope: &Map<String, Value>) -> Option<String> {
    let direct = scope.get("nextCursor");
    let nested = scope.get("pagination").and_then(|p| p.get("nextCursor"));
    direct.or(nested).and_then(|v| match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn has_more_in(scope: &Map<String, Value>) -> Option<bool> {
    scope
        .get("hasMore")
        .or_else(|| scope.get("pagination").and_then(|p| p.get("hasMore")))
        .and_then(Value::as_bool)
}

fn message_in(value: &Value) -> Option<String> {
    let non_empty = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    non_empty(value.get("error"))
        .or_else(|| non_empty(value.get("error").and_then(|e| e.get("message"))))
        .or_else(|| non_empty(value.get("message")))
        .or_else(|| {
            let first = value.get("errors").and_then(|e| e.get(0))?;
            non_empty(first.get("msg")).or_else(|| non_empty(first.get("message")))
        })
        .or_else(|| value.get("data").and_then(|d| if d.is_object() { message_in(d) } else { None }))
}

fn default_message(status: u16) -> String {
    match status {
        400 => "Bad request".to_string(),
        401 => "Authentication required".to_string(),
        403 => "You do not have permission to do that".to_string(),
        404 => "Not found".to_string(),
        500..=599 => "Server error, please try again later".to_string(),
        _ => format!("Request failed with status {}", status),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Novel;
    use serde_json::json;

    #[test]
    fn bare_wrapped_and_double_wrapped_records_decode_alike() {
        let record = json!({"_id": "n1", "title": "Sivagamiyin Sabatham"});
        let shapes = [
            record.clone(),
            json!({"data": record.clone()}),
            json!({"success": true, "data": {"data": record.clone()}, "message": "ok"}),
        ];

        for shape in shapes {
            let novel: Novel = decode_data(&shape).unwrap();
            assert_eq!(novel.id, "n1");
        }
    }

    #[test]
    fn records_with_a_data_field_are_not_mistaken_for_envelopes() {
        #[derive(serde::Deserialize)]
        struct Upload {
            name: String,
            data: String,
        }
        let upload: Upload = decode_data(&json!({"name": "cover.jpg", "data": "AAAA"})).unwrap();
        assert_eq!(upload.name, "cover.jpg");
        assert_eq!(upload.data, "AAAA");
    }

    #[test]
    fn unsuccessful_envelope_is_rejected_with_its_message() {
        let err = decode_data::<Novel>(&json!({"success": false, "message": "Novel not found"}))
            .unwrap_err();
        assert_eq!(err, EnvelopeError::Rejected("Novel not found".to_string()));
    }

    #[test]
    fn page_reads_cursor_from_any_layer() {
        let body = json!({
            "success": true,
            "data": {"novels": [{"_id": "a", "title": "A"}, {"_id": "b", "title": "B"}]},
            "pagination": {"nextCursor": "b", "hasMore": true}
        });
        let page: Page<Novel> = decode_page(&body).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_cursor.as_deref(), Some("b"));
        assert!(page.has_more);

        let last: Page<Novel> = decode_page(&json!([{"_id": "c", "title": "C"}])).unwrap();
        assert_eq!(last.next_cursor, None);
        assert!(!last.has_more);
    }

    #[test]
    fn error_message_chain() {
        assert_eq!(extract_error_message(400, r#"{"error":"Email taken"}"#), "Email taken");
        assert_eq!(
            extract_error_message(422, r#"{"error":{"message":"Too short"}}"#),
            "Too short"
        );
        assert_eq!(
            extract_error_message(422, r#"{"errors":[{"msg":"Invalid email"}]}"#),
            "Invalid email"
        );
        assert_eq!(extract_error_message(502, "Bad Gateway"), "Bad Gateway");
        assert_eq!(
            extract_error_message(500, "<html>oops</html>"),
            "Server error, please try again later"
        );
        assert_eq!(extract_error_message(404, "{}"), "Not found");
    }
}
