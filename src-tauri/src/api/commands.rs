//! Tauri command surface
//!
//! The presentation boundary: every inbound trigger (text edits, language and
//! model changes, settings edits, clipboard injection) enters the pipeline
//! through one of these commands.

use std::sync::MutexGuard;

use tauri::{AppHandle, Manager, State};
use tauri_plugin_clipboard_manager::ClipboardExt;

use crate::shared::emit::emit_event;
use crate::shared::events::AppEvent;
use crate::shared::settings::AppSettings;
use crate::shared::types::TranslationState;
use crate::AppState;

fn lock_settings(state: &AppState) -> MutexGuard<'_, AppSettings> {
    match state.settings.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            eprintln!("[Commands] Settings mutex poisoned, recovering...");
            poisoned.into_inner()
        }
    }
}

#[tauri::command]
pub async fn get_settings(state: State<'_, AppState>) -> Result<AppSettings, String> {
    Ok(lock_settings(&state).clone())
}

#[tauri::command]
pub async fn save_settings(
    app: AppHandle,
    state: State<'_, AppState>,
    settings: AppSettings,
) -> Result<(), String> {
    let (snapshot, previous) = {
        let mut guard = lock_settings(&state);
        let previous = guard.clone();
        *guard = settings;
        (guard.clone(), previous)
    };

    let pipeline = &state.pipeline;
    pipeline.set_endpoint(snapshot.api_key.clone(), snapshot.api_base_url.clone());
    if snapshot.model != previous.model {
        pipeline.set_model(snapshot.model.clone());
    }
    if snapshot.input_language != previous.input_language {
        pipeline.set_source_language(snapshot.input_language.clone());
    }
    if snapshot.output_language != previous.output_language {
        pipeline.set_target_language(snapshot.output_language.clone());
    }

    snapshot.save(&app).await
}

#[tauri::command]
pub async fn add_model(
    app: AppHandle,
    state: State<'_, AppState>,
    model: String,
) -> Result<AppSettings, String> {
    let snapshot = {
        let mut guard = lock_settings(&state);
        guard.add_model(&model);
        guard.clone()
    };
    snapshot.save(&app).await?;
    Ok(snapshot)
}

#[tauri::command]
pub async fn remove_model(
    app: AppHandle,
    state: State<'_, AppState>,
    model: String,
) -> Result<AppSettings, String> {
    let (snapshot, active_changed) = {
        let mut guard = lock_settings(&state);
        let was_active = guard.model == model;
        guard.remove_model(&model);
        let active_changed = was_active && guard.model != model;
        (guard.clone(), active_changed)
    };
    if active_changed {
        state.pipeline.set_model(snapshot.model.clone());
    }
    snapshot.save(&app).await?;
    Ok(snapshot)
}

#[tauri::command]
pub async fn set_input_text(state: State<'_, AppState>, text: String) -> Result<(), String> {
    state.pipeline.set_source_text(text);
    Ok(())
}

#[tauri::command]
pub async fn set_input_language(
    app: AppHandle,
    state: State<'_, AppState>,
    language: String,
) -> Result<(), String> {
    state.pipeline.set_source_language(language.clone());
    let snapshot = {
        let mut guard = lock_settings(&state);
        guard.input_language = language;
        guard.clone()
    };
    snapshot.save(&app).await
}

#[tauri::command]
pub async fn set_output_language(
    app: AppHandle,
    state: State<'_, AppState>,
    language: String,
) -> Result<(), String> {
    state.pipeline.set_target_language(language.clone());
    let snapshot = {
        let mut guard = lock_settings(&state);
        guard.output_language = language;
        guard.clone()
    };
    snapshot.save(&app).await
}

#[tauri::command]
pub async fn set_model(
    app: AppHandle,
    state: State<'_, AppState>,
    model: String,
) -> Result<(), String> {
    state.pipeline.set_model(model.clone());
    let snapshot = {
        let mut guard = lock_settings(&state);
        guard.model = model;
        guard.clone()
    };
    snapshot.save(&app).await
}

/// Swap input/output language selectors and re-translate immediately.
#[tauri::command]
pub async fn swap_languages(
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<(String, String), String> {
    let (input, output) = state.pipeline.swap_languages();
    let snapshot = {
        let mut guard = lock_settings(&state);
        guard.input_language = input.clone();
        guard.output_language = output.clone();
        guard.clone()
    };
    snapshot.save(&app).await?;
    Ok((input, output))
}

#[tauri::command]
pub async fn translate_now(state: State<'_, AppState>) -> Result<(), String> {
    state.pipeline.translate_now();
    Ok(())
}

/// Inject clipboard text into the input and force immediate evaluation.
/// Whitespace-only clipboard content is ignored.
#[tauri::command]
pub async fn translate_clipboard(app: AppHandle) -> Result<Option<String>, String> {
    inject_clipboard(&app)
}

#[tauri::command]
pub async fn get_translation_state(
    state: State<'_, AppState>,
) -> Result<TranslationState, String> {
    Ok(TranslationState::capture(&state.pipeline))
}

pub(crate) fn inject_clipboard(app: &AppHandle) -> Result<Option<String>, String> {
    let text = app
        .clipboard()
        .read_text()
        .map_err(|e| format!("Failed to read clipboard: {}", e))?;
    if text.trim().is_empty() {
        return Ok(None);
    }

    let state = app.state::<AppState>();
    state.pipeline.set_source_text(text.clone());
    state.pipeline.translate_now();
    emit_event(app, AppEvent::ClipboardCaptured(text.clone()));
    println!("[Clipboard] Injected {} bytes into translator", text.len());
    Ok(Some(text))
}
