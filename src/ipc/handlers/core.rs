use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{no_store, optional_bool, required_str};
use crate::ipc::types::{AppState, Request};
use crate::marks_file::DEFAULT_FILE_NAME;
use crate::store::{LoadReport, StoreOptions, StudentStore};
use serde_json::json;
use std::path::{Path, PathBuf};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "dataFile": state.store.as_ref().map(|s| s.path().to_string_lossy().to_string())
        }),
    )
}

pub fn load_result(path: &Path, report: &LoadReport) -> serde_json::Value {
    json!({
        "dataFile": path.to_string_lossy(),
        "count": report.count,
        "declaredCount": report.declared_count,
        "skipped": report.skipped,
        "warnings": report.warnings,
    })
}

fn handle_store_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let mut path = match required_str(req, "path") {
        Ok(v) => PathBuf::from(v.trim()),
        Err(resp) => return resp,
    };
    if path.as_os_str().is_empty() {
        return err(&req.id, "bad_params", "path must not be empty", None);
    }
    // A folder means the conventional file inside it.
    if path.is_dir() {
        path = path.join(DEFAULT_FILE_NAME);
    }

    let defaults = state.defaults;
    let options = StoreOptions {
        create_if_missing: optional_bool(req, "createIfMissing")
            .unwrap_or(defaults.create_if_missing),
        enforce_unique_codes: optional_bool(req, "enforceUniqueCodes")
            .unwrap_or(defaults.enforce_unique_codes),
        strict_ranges: optional_bool(req, "strictRanges").unwrap_or(defaults.strict_ranges),
    };

    match StudentStore::open(&path, options) {
        Ok((store, report)) => {
            let result = load_result(store.path(), &report);
            state.store = Some(store);
            ok(&req.id, result)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to open marks file");
            store_err(&req.id, &e)
        }
    }
}

fn handle_store_reload(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_mut() else {
        return no_store(&req.id);
    };
    match store.reload() {
        Ok(report) => ok(&req.id, load_result(store.path(), &report)),
        Err(e) => store_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "store.open" => Some(handle_store_open(state, req)),
        "store.reload" => Some(handle_store_reload(state, req)),
        _ => None,
    }
}
