use crate::error::StoreError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Maps a domain error onto the wire envelope, keeping field/line context.
pub fn store_err(id: &str, e: &StoreError) -> serde_json::Value {
    let details = match e {
        StoreError::Input { field, line_no, .. } => Some(json!({
            "field": field,
            "lineNo": line_no,
        })),
        StoreError::Format {
            line_no: Some(n), ..
        } => Some(json!({ "lineNo": n })),
        StoreError::NotFound(key) | StoreError::DuplicateCode(key) => {
            Some(json!({ "code": key }))
        }
        _ => None,
    };
    err(id, e.code(), e.to_string(), details)
}
