use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::settings::AppSettings;
use super::types::TranslationState;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "event", content = "payload")] // Tagged enum for easier frontend parsing
#[ts(export, export_to = "../../src/types/events.ts")] // Separate file for events
pub enum AppEvent {
    #[serde(rename = "translation://updated")]
    TranslationUpdated(TranslationState),

    #[serde(rename = "settings://updated")]
    SettingsUpdated(AppSettings),

    #[serde(rename = "clipboard://captured")]
    ClipboardCaptured(String),
}
