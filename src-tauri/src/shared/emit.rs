use super::events::AppEvent;
use tauri::{AppHandle, Emitter};

/// Emit an application event to all windows
pub fn emit_event(app: &AppHandle, event: AppEvent) {
    match &event {
        AppEvent::TranslationUpdated(state) => {
            if let Err(e) = app.emit("translation://updated", state) {
                eprintln!("Failed to emit translation update: {}", e);
            }
        }
        AppEvent::SettingsUpdated(settings) => {
            if let Err(e) = app.emit("settings://updated", settings) {
                eprintln!("Failed to emit settings update: {}", e);
            }
        }
        AppEvent::ClipboardCaptured(text) => {
            if let Err(e) = app.emit("clipboard://captured", text) {
                eprintln!("Failed to emit clipboard capture: {}", e);
            }
        }
    }
}
