//! Persisted user settings
//!
//! The [`SettingsStore`] owns the in-memory [`Config`] and writes it through
//! a [`SettingsBackend`]. Changes arrive as a JSON object; only keys whose
//! value actually differs are persisted, and the file is always rewritten as
//! a whole.
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use thiserror::Error;

const APP_DIR: &str = "orienter";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown setting '{0}'")]
    UnknownKey(String),
    #[error("invalid setting value: {0}")]
    InvalidValue(String),
    #[error("no configuration directory available")]
    NoConfigDir,
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// User-facing options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// UI language code
    pub language: String,
    /// Offer the commands in the context menu
    pub context_menu: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            context_menu: false,
        }
    }
}

impl Config {
    pub const KEYS: &'static [&'static str] = &["language", "context_menu"];

    fn to_map(&self) -> SettingsResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(SettingsError::InvalidValue(format!("expected an object, got {other}"))),
        }
    }

    /// This config with `changes` applied, type-checked
    fn merged(&self, changes: &[(String, Value)]) -> SettingsResult<Config> {
        let mut map = self.to_map()?;
        for (key, value) in changes {
            map.insert(key.clone(), value.clone());
        }
        serde_json::from_value(Value::Object(map))
            .map_err(|e| SettingsError::InvalidValue(e.to_string()))
    }
}

/// Durable storage for the serialized config
pub trait SettingsBackend {
    /// Stored text, `None` when nothing has been saved yet
    fn read(&self) -> SettingsResult<Option<String>>;

    /// Replace the stored text in one step
    fn write(&mut self, contents: &str) -> SettingsResult<()>;
}

/// A JSON file, replaced atomically on every write
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/orienter/settings.json` for the current user
    pub fn user_default() -> SettingsResult<Self> {
        let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(Self::new(dir.join(APP_DIR).join(SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsBackend for FileBackend {
    fn read(&self) -> SettingsResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, contents: &str) -> SettingsResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut file = NamedTempFile::new_in(&dir)?;
        file.write_all(contents.as_bytes())?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Settings held in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    contents: Option<String>,
    writes: usize,
}

impl MemoryBackend {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
            writes: 0,
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    /// Number of writes performed so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SettingsBackend for MemoryBackend {
    fn read(&self) -> SettingsResult<Option<String>> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, contents: &str) -> SettingsResult<()> {
        self.contents = Some(contents.to_owned());
        self.writes += 1;
        Ok(())
    }
}

/// Owner of the current config and its storage
#[derive(Debug)]
pub struct SettingsStore<B> {
    backend: B,
    config: Config,
}

impl<B: SettingsBackend> SettingsStore<B> {
    /// Read the stored config, falling back to defaults for missing keys
    pub fn load(backend: B) -> SettingsResult<Self> {
        let config = read_config(&backend)?;
        Ok(Self { backend, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Apply a change set and persist whatever actually changed.
    ///
    /// Unknown keys are ignored. A value of the wrong type rejects the whole
    /// change set before anything is written. Returns the changed entries.
    pub fn apply_changes(
        &mut self,
        changes: &Map<String, Value>,
    ) -> SettingsResult<Vec<(String, Value)>> {
        let current = self.config.to_map()?;
        let mut delta = Vec::new();
        for (key, value) in changes {
            match current.get(key) {
                None => log::warn!("ignoring unknown setting '{key}'"),
                Some(old) if old == value => {}
                Some(_) => delta.push((key.clone(), value.clone())),
            }
        }

        if delta.is_empty() {
            log::debug!("all settings already up to date");
            return Ok(delta);
        }

        let updated = self.config.merged(&delta)?;
        let persisted = read_config(&self.backend)?.merged(&delta)?;
        self.backend.write(&serde_json::to_string_pretty(&persisted)?)?;
        self.config = updated;

        for (key, value) in &delta {
            log::info!("setting updated: {key}: {value}");
        }
        Ok(delta)
    }

    /// Change a single setting, rejecting unknown keys. Returns whether it changed.
    pub fn set(&mut self, key: &str, value: Value) -> SettingsResult<bool> {
        if !Config::KEYS.contains(&key) {
            return Err(SettingsError::UnknownKey(key.to_owned()));
        }
        let mut changes = Map::new();
        changes.insert(key.to_owned(), value);
        Ok(!self.apply_changes(&changes)?.is_empty())
    }
}

fn read_config<B: SettingsBackend>(backend: &B) -> SettingsResult<Config> {
    match backend.read()? {
        Some(contents) => Ok(serde_json::from_str(&contents)?),
        None => Ok(Config::default()),
    }
}
