use crate::store::{StoreOptions, StudentStore};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub store: Option<StudentStore>,
    /// Applied by `store.open` unless the request overrides them.
    pub defaults: StoreOptions,
}

impl AppState {
    pub fn new(defaults: StoreOptions) -> Self {
        Self {
            store: None,
            defaults,
        }
    }
}
