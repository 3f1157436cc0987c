use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tauri::AppHandle;
use tokio::fs;
use ts_rs::TS;

use crate::config;
use crate::shared::emit::emit_event;
use crate::shared::events::AppEvent;

/// Persisted user settings, loaded at startup and written on every change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../src/types/settings.ts")]
pub struct AppSettings {
    pub input_language: String,
    pub output_language: String,
    pub api_key: String,
    pub api_base_url: String,
    pub model: String,
    /// Ordered; duplicates are allowed unless `dedupe_models` is set.
    pub available_models: Vec<String>,
    #[serde(default)]
    pub dedupe_models: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            input_language: config::AUTO_LANG.to_string(),
            output_language: config::DEFAULT_OUTPUT_LANG.to_string(),
            api_key: String::new(),
            api_base_url: config::DEFAULT_API_BASE_URL.to_string(),
            model: config::DEFAULT_MODEL.to_string(),
            available_models: config::DEFAULT_AVAILABLE_MODELS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            dedupe_models: false,
        }
    }
}

impl AppSettings {
    pub fn get_settings_path() -> Result<PathBuf, String> {
        ProjectDirs::from("com", "lingua", "lingua-widget")
            .map(|dirs| dirs.config_dir().join("settings.json"))
            .ok_or_else(|| "Failed to determine config directory".to_string())
    }

    pub async fn load() -> Result<Self, String> {
        Self::load_from(&Self::get_settings_path()?).await
    }

    async fn load_from(path: &PathBuf) -> Result<Self, String> {
        if !path.exists() {
            let settings = Self::default();
            settings.save_to(path).await?;
            return Ok(settings);
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read settings file: {}", e))?;

        serde_json::from_str(&content).map_err(|e| format!("Failed to parse settings: {}", e))
    }

    async fn save_to(&self, path: &PathBuf) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| format!("Failed to write settings file: {}", e))
    }

    /// Save settings to disk and emit update event
    pub async fn save(&self, app: &AppHandle) -> Result<(), String> {
        self.save_to(&Self::get_settings_path()?).await?;

        emit_event(app, AppEvent::SettingsUpdated(self.clone()));

        Ok(())
    }

    /// Append a model to the list. Whitespace-only names are ignored;
    /// duplicates are kept unless `dedupe_models` is set.
    pub fn add_model(&mut self, model: &str) {
        let trimmed = model.trim();
        if trimmed.is_empty() {
            return;
        }
        if self.dedupe_models && self.available_models.iter().any(|m| m == trimmed) {
            return;
        }
        self.available_models.push(trimmed.to_string());
    }

    /// Remove the first occurrence of a model. If the active model was
    /// removed, fall back to the first remaining one (or empty).
    pub fn remove_model(&mut self, model: &str) {
        if let Some(idx) = self.available_models.iter().position(|m| m == model) {
            self.available_models.remove(idx);
            if self.model == model {
                self.model = self
                    .available_models
                    .first()
                    .cloned()
                    .unwrap_or_default();
            }
        }
    }
}
