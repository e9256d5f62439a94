use crate::ipc::error::ok;
use crate::ipc::helpers::no_store;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return no_store(&req.id);
    };
    ok(&req.id, json!(store.summary()))
}

fn handle_text(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return no_store(&req.id);
    };
    ok(&req.id, json!({ "text": store.text_report() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.summary" => Some(handle_summary(state, req)),
        "reports.text" => Some(handle_text(state, req)),
        _ => None,
    }
}
