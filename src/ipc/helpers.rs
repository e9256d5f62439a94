use crate::error::StoreError;
use crate::ipc::error::{err, store_err};
use crate::ipc::types::Request;
use crate::record::parse_score;

/// `Err` holds a ready-to-send error response.
pub type ParamResult<T> = Result<T, serde_json::Value>;

pub fn required_str(req: &Request, key: &str) -> ParamResult<String> {
    match req.params.get(key).and_then(|v| v.as_str()) {
        Some(v) => Ok(v.to_string()),
        None => Err(err(&req.id, "bad_params", format!("missing {key}"), None)),
    }
}

pub fn optional_str(req: &Request, key: &str) -> ParamResult<Option<String>> {
    match req.params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(err(
            &req.id,
            "bad_params",
            format!("{key} must be a string"),
            None,
        )),
    }
}

/// Student codes may arrive as JSON numbers from callers that treat them as ids.
pub fn required_code(req: &Request, key: &str) -> ParamResult<String> {
    match req.params.get(key) {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        _ => Err(err(&req.id, "bad_params", format!("missing {key}"), None)),
    }
}

/// Accepts a JSON integer or a string holding one; anything else is an input error.
pub fn optional_int(req: &Request, key: &str) -> ParamResult<Option<i64>> {
    let parsed = match req.params.get(key) {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| StoreError::input(key, format!("expected an integer, got {n}"))),
        Some(serde_json::Value::String(s)) => parse_score(key, s),
        Some(other) => Err(StoreError::input(
            key,
            format!("expected an integer, got {other}"),
        )),
    };
    parsed.map(Some).map_err(|e| store_err(&req.id, &e))
}

pub fn required_int(req: &Request, key: &str) -> ParamResult<i64> {
    match optional_int(req, key)? {
        Some(v) => Ok(v),
        None => Err(err(&req.id, "bad_params", format!("missing {key}"), None)),
    }
}

pub fn optional_bool(req: &Request, key: &str) -> Option<bool> {
    req.params.get(key).and_then(|v| v.as_bool())
}

pub fn no_store(id: &str) -> serde_json::Value {
    err(id, "no_store", "open a marks file first", None)
}
