use crate::backup;
use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{no_store, required_str};
use crate::ipc::handlers::core::load_result;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return no_store(&req.id);
    };
    let out_path = match required_str(req, "outPath") {
        Ok(v) => PathBuf::from(v),
        Err(resp) => return resp,
    };

    match backup::export_marks_bundle(store.path(), &out_path) {
        Ok(summary) => {
            tracing::info!(out = %out_path.display(), "exported marks bundle");
            ok(
                &req.id,
                json!({
                    "outPath": out_path.to_string_lossy(),
                    "bundleFormat": summary.bundle_format,
                    "entryCount": summary.entry_count,
                    "sha256": summary.sha256,
                }),
            )
        }
        Err(e) => err(&req.id, "backup_failed", format!("{e:#}"), None),
    }
}

fn handle_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return no_store(&req.id);
    };
    let in_path = match required_str(req, "inPath") {
        Ok(v) => PathBuf::from(v),
        Err(resp) => return resp,
    };

    let summary = match backup::import_marks_bundle(&in_path, store.path()) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "backup_failed", format!("{e:#}"), None),
    };
    tracing::info!(from = %in_path.display(), bundle_format = %summary.bundle_format_detected, "imported marks bundle");

    match store.reload() {
        Ok(report) => {
            let mut result = load_result(store.path(), &report);
            result["bundleFormatDetected"] = json!(summary.bundle_format_detected);
            ok(&req.id, result)
        }
        Err(e) => store_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.export" => Some(handle_export(state, req)),
        "backup.import" => Some(handle_import(state, req)),
        _ => None,
    }
}
