//! Message channel between the settings store and a settings dialog.
//!
//! The dialog sends JSON requests and receives JSON responses, so any
//! presentation surface (an HTML dialog, a terminal prompt) can drive it.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::settings::{Config, SettingsBackend, SettingsStore};

/// Product metadata shown in the settings dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub copyright: String,
}

impl PluginInfo {
    pub fn current() -> Self {
        Self {
            name: "Orienter".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Align group/component copies along multiple selected edges.".to_string(),
            copyright: "Orienter Contributors".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettingsRequest {
    /// The dialog is ready and wants the current values.
    Load,
    /// The user edited some values.
    Change { settings: Map<String, Value> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettingsResponse {
    Snapshot { config: Config, info: PluginInfo },
    /// Entries that differed and were persisted
    Applied { changed: Map<String, Value> },
    Error { message: String },
}

/// Answer one request against `store`
pub fn handle<B: SettingsBackend>(
    store: &mut SettingsStore<B>,
    request: SettingsRequest,
) -> SettingsResponse {
    match request {
        SettingsRequest::Load => SettingsResponse::Snapshot {
            config: store.config().clone(),
            info: PluginInfo::current(),
        },
        SettingsRequest::Change { settings } => match store.apply_changes(&settings) {
            Ok(delta) => SettingsResponse::Applied {
                changed: delta.into_iter().collect(),
            },
            Err(e) => {
                log::error!("failed to apply settings: {e}");
                SettingsResponse::Error { message: e.to_string() }
            }
        },
    }
}

/// [`handle`] over JSON text; malformed requests produce an error response
pub fn handle_json<B: SettingsBackend>(store: &mut SettingsStore<B>, request: &str) -> String {
    let response = match serde_json::from_str::<SettingsRequest>(request) {
        Ok(request) => handle(store, request),
        Err(e) => SettingsResponse::Error {
            message: format!("malformed request: {e}"),
        },
    };
    serde_json::to_string(&response).unwrap_or_else(|e| {
        format!(r#"{{"type":"error","message":"could not encode response: {e}"}}"#)
    })
}
