//! Ordered-candidate lookups over loosely shaped JSON bodies.
//!
//! The chat and model services do not agree on field names, so callers name
//! the fields they accept in priority order and take the first usable one.

use serde_json::Value;

use crate::models::Model;

/// Reply fields of a chat response, highest priority first.
pub const REPLY_FIELDS: &[&str] = &["response", "text", "result"];
/// Fields that may carry a model identifier.
pub const MODEL_ID_FIELDS: &[&str] = &["modelId", "id", "name"];
/// Fields that may carry a model display name.
pub const MODEL_NAME_FIELDS: &[&str] = &["name", "modelName"];

/// How a candidate field has to look before it is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Any value other than `null`.
    Defined,
    /// Not `null`, `false`, `0`, or `""`.
    Truthy,
}

/// Returns the first candidate field of `body` that satisfies `presence`.
pub fn first_present<'a>(body: &'a Value, candidates: &[&str], presence: Presence) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|field| body.get(field))
        .find(|value| match presence {
            Presence::Defined => !value.is_null(),
            Presence::Truthy => is_truthy(value),
        })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strings are taken verbatim; everything else is serialized.
pub fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text to show for a chat response body. Falls back to the whole body
/// serialized as JSON when none of [`REPLY_FIELDS`] is usable.
pub fn reply_text(body: &Value) -> String {
    first_present(body, REPLY_FIELDS, Presence::Truthy)
        .map(as_text)
        .unwrap_or_else(|| body.to_string())
}

/// Normalizes one model listing entry. The name falls back to the id.
/// Entries with no usable identifier are dropped.
pub fn normalize_model(entry: &Value) -> Option<Model> {
    let id = first_present(entry, MODEL_ID_FIELDS, Presence::Defined).map(as_text)?;
    let name = first_present(entry, MODEL_NAME_FIELDS, Presence::Defined)
        .map(as_text)
        .unwrap_or_else(|| id.clone());
    Some(Model { id, name })
}

/// Accepts either a bare array of models or an object with a `data` array.
pub fn normalize_models(body: &Value) -> Vec<Model> {
    let entries: &[Value] = match body {
        Value::Array(items) => items.as_slice(),
        other => match other.get("data") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
    };
    entries.iter().filter_map(normalize_model).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reply_prefers_response_then_text_then_result() {
        assert_eq!(reply_text(&json!({ "response": "hi" })), "hi");
        assert_eq!(reply_text(&json!({ "text": "t", "result": "r" })), "t");
        assert_eq!(reply_text(&json!({ "result": "r" })), "r");
        assert_eq!(reply_text(&json!({ "response": "", "text": "t" })), "t");
    }

    #[test]
    fn reply_falls_back_to_serialized_body() {
        assert_eq!(reply_text(&json!({ "foo": 1 })), r#"{"foo":1}"#);
        assert_eq!(reply_text(&json!("plain")), r#""plain""#);
    }

    #[test]
    fn non_string_reply_is_serialized() {
        assert_eq!(reply_text(&json!({ "result": 42 })), "42");
    }

    #[test]
    fn model_name_falls_back_to_id() {
        let models = normalize_models(&json!([{ "modelId": "m1" }]));
        assert_eq!(models, vec![Model { id: "m1".into(), name: "m1".into() }]);
    }

    #[test]
    fn models_accept_data_wrapper_and_alternate_fields() {
        let models = normalize_models(&json!({
            "data": [
                { "id": "a", "modelName": "Alpha" },
                { "name": "beta" },
                { "modelId": 7, "name": "Seven" },
                { "description": "no id" }
            ]
        }));
        assert_eq!(
            models,
            vec![
                Model { id: "a".into(), name: "Alpha".into() },
                Model { id: "beta".into(), name: "beta".into() },
                Model { id: "7".into(), name: "Seven".into() },
            ]
        );
    }

    #[test]
    fn unexpected_model_shape_is_empty() {
        assert!(normalize_models(&json!({ "items": [] })).is_empty());
        assert!(normalize_models(&Value::Null).is_empty());
    }
}
