//! Orienter Web - settings dialog bridge for the browser
//!
//! The HTML dialog calls [`SettingsDialog::ready`] once loaded and
//! [`SettingsDialog::user_settings`] whenever the user edits a value. Both
//! answer with a JSON response; settings persist in `localStorage`.
use std::io;

use orienter_core::channel::{self, SettingsRequest, SettingsResponse};
use orienter_core::settings::{SettingsBackend, SettingsError, SettingsResult};
use orienter_core::SettingsStore;
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;

/// `localStorage` key holding the settings JSON
pub const STORAGE_KEY: &str = "orienter.settings";

fn storage_error(context: &str, error: JsValue) -> SettingsError {
    SettingsError::Io(io::Error::other(format!("{context}: {error:?}")))
}

/// Settings backend over the browser's `localStorage`
pub struct LocalStorageBackend {
    storage: web_sys::Storage,
}

impl LocalStorageBackend {
    pub fn open() -> SettingsResult<Self> {
        let window = web_sys::window().ok_or(SettingsError::NoConfigDir)?;
        let storage = window
            .local_storage()
            .map_err(|e| storage_error("localStorage unavailable", e))?
            .ok_or(SettingsError::NoConfigDir)?;
        Ok(Self { storage })
    }
}

impl SettingsBackend for LocalStorageBackend {
    fn read(&self) -> SettingsResult<Option<String>> {
        self.storage
            .get_item(STORAGE_KEY)
            .map_err(|e| storage_error("failed to read settings", e))
    }

    fn write(&mut self, contents: &str) -> SettingsResult<()> {
        self.storage
            .set_item(STORAGE_KEY, contents)
            .map_err(|e| storage_error("failed to write settings", e))
    }
}

/// Apply the dialog's edited values, given as a JSON object
fn apply_user_settings<B: SettingsBackend>(store: &mut SettingsStore<B>, settings: &str) -> String {
    let response = match serde_json::from_str::<Map<String, Value>>(settings) {
        Ok(settings) => channel::handle(store, SettingsRequest::Change { settings }),
        Err(e) => SettingsResponse::Error {
            message: format!("expected a settings object: {e}"),
        },
    };
    serde_json::to_string(&response).unwrap_or_else(|e| {
        log::error!("could not encode settings response: {e}");
        String::from(r#"{"type":"error","message":"could not encode response"}"#)
    })
}

fn load_request() -> String {
    String::from(r#"{"type":"load"}"#)
}

#[wasm_bindgen]
pub struct SettingsDialog {
    store: SettingsStore<LocalStorageBackend>,
}

#[wasm_bindgen]
impl SettingsDialog {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<SettingsDialog, JsValue> {
        let backend = LocalStorageBackend::open().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let store = SettingsStore::load(backend).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(SettingsDialog { store })
    }

    /// Current settings and product information
    pub fn ready(&mut self) -> String {
        channel::handle_json(&mut self.store, &load_request())
    }

    /// Persist edited values, answering with the entries that changed
    pub fn user_settings(&mut self, settings: &str) -> String {
        apply_user_settings(&mut self.store, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orienter_core::settings::MemoryBackend;
    use serde_json::json;

    fn store() -> SettingsStore<MemoryBackend> {
        SettingsStore::load(MemoryBackend::default()).unwrap()
    }

    #[test]
    fn test_ready_returns_snapshot() {
        let mut store = store();
        let raw = channel::handle_json(&mut store, &load_request());
        let response: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(response["type"], "snapshot");
        assert_eq!(response["config"]["language"], "eng");
        assert_eq!(response["info"]["name"], "Orienter");
    }

    #[test]
    fn test_user_settings_persists_delta() {
        let mut store = store();
        let raw = apply_user_settings(&mut store, r#"{"context_menu": true, "language": "eng"}"#);
        let response: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(response, json!({"type": "applied", "changed": {"context_menu": true}}));
        assert!(store.config().context_menu);
        assert_eq!(store.backend().writes(), 1);
    }

    #[test]
    fn test_user_settings_rejects_non_object() {
        let mut store = store();
        let raw = apply_user_settings(&mut store, "[1, 2]");
        let response: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(response["type"], "error");
        assert_eq!(store.backend().writes(), 0);
    }
}
