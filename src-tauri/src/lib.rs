mod api;
mod config;
mod core;
mod shared;

use std::sync::{Arc, Mutex};

use tauri::{Manager, WebviewUrl, WebviewWindowBuilder};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut};

use crate::core::language::ScriptDetector;
use crate::core::pipeline::{RequestState, TranslationPipeline};
use crate::core::transport::HttpTransport;
use crate::shared::emit::emit_event;
use crate::shared::events::AppEvent;
use crate::shared::settings::AppSettings;
use crate::shared::types::TranslationState;

/// Shared application state managed by Tauri.
pub struct AppState {
    pub pipeline: TranslationPipeline,
    pub settings: Mutex<AppSettings>,
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_global_shortcut::Builder::new().build())
        .plugin(tauri_plugin_clipboard_manager::init())
        .setup(|app| {
            // Load settings with fallback defaults
            let settings = tauri::async_runtime::block_on(AppSettings::load()).unwrap_or_else(|e| {
                eprintln!("Failed to load settings: {}", e);
                AppSettings::default()
            });

            let transport = Arc::new(HttpTransport::new()?);
            let pipeline = TranslationPipeline::new(
                transport,
                Arc::new(ScriptDetector),
                RequestState {
                    source_text: String::new(),
                    source_language: settings.input_language.clone(),
                    target_language: settings.output_language.clone(),
                    model: settings.model.clone(),
                    api_key: settings.api_key.clone(),
                    api_base_url: settings.api_base_url.clone(),
                },
                config::DEBOUNCE_INTERVAL,
            );

            // Forward pipeline output changes to the frontend
            spawn_state_forwarder(app.handle().clone(), pipeline.clone());

            app.manage(AppState {
                pipeline,
                settings: Mutex::new(settings),
            });

            register_translate_shortcut(app)?;

            show_main_window(app.handle())?;

            println!("✅ Lingua widget initialized");
            println!("📋 Global Shortcut: {}", config::TRANSLATE_SHORTCUT);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            api::commands::get_settings,
            api::commands::save_settings,
            api::commands::add_model,
            api::commands::remove_model,
            api::commands::set_input_text,
            api::commands::set_input_language,
            api::commands::set_output_language,
            api::commands::set_model,
            api::commands::swap_languages,
            api::commands::translate_now,
            api::commands::translate_clipboard,
            api::commands::get_translation_state,
        ])
        .run(tauri::generate_context!())
        .unwrap_or_else(|e| {
            eprintln!("FATAL: Failed to start Tauri application: {}", e);
            std::process::exit(1);
        });
}

/// Subscribe to the pipeline observables and emit a fresh state snapshot to
/// all windows whenever any of them changes.
fn spawn_state_forwarder(app: tauri::AppHandle, pipeline: TranslationPipeline) {
    tauri::async_runtime::spawn(async move {
        let mut text_rx = pipeline.current_text.subscribe();
        let mut loading_rx = pipeline.is_loading.subscribe();
        let mut error_rx = pipeline.last_error.subscribe();
        loop {
            let changed = tokio::select! {
                r = text_rx.changed() => r,
                r = loading_rx.changed() => r,
                r = error_rx.changed() => r,
            };
            if changed.is_err() {
                break;
            }
            emit_event(
                &app,
                AppEvent::TranslationUpdated(TranslationState::capture(&pipeline)),
            );
        }
    });
}

/// Register the clipboard-capture shortcut: reads the clipboard, injects it
/// into the translator, and brings the window up.
fn register_translate_shortcut(app: &tauri::App) -> Result<(), Box<dyn std::error::Error>> {
    let shortcut: Shortcut = config::TRANSLATE_SHORTCUT.parse().map_err(|e| {
        format!(
            "Failed to parse shortcut '{}': {}",
            config::TRANSLATE_SHORTCUT,
            e
        )
    })?;

    // Clean slate; unregister is expected to fail on first run
    if let Err(e) = app.global_shortcut().unregister(shortcut) {
        println!("ℹ️  Unregister attempt (expected on first run): {}", e);
    }

    let handle = app.handle().clone();
    app.global_shortcut()
        .on_shortcut(shortcut, move |_app, _shortcut, _event| {
            let handle = handle.clone();
            // Spawn so the shortcut handler never blocks
            tauri::async_runtime::spawn(async move {
                match api::commands::inject_clipboard(&handle) {
                    Ok(Some(_)) => {
                        if let Err(e) = show_main_window(&handle) {
                            eprintln!("[Shortcut] Failed to show window: {}", e);
                        }
                    }
                    Ok(None) => {
                        println!("[Shortcut] Clipboard empty, nothing to translate");
                    }
                    Err(e) => eprintln!("[Shortcut] {}", e),
                }
            });
        })?;
    app.global_shortcut().register(shortcut)?;
    println!("✅ Registered global shortcut: {}", config::TRANSLATE_SHORTCUT);

    Ok(())
}

fn show_main_window(app: &tauri::AppHandle) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(window) = app.get_webview_window("main") {
        window.show()?;
        window.set_focus()?;
        return Ok(());
    }

    let window = WebviewWindowBuilder::new(app, "main", WebviewUrl::App("index.html".into()))
        .title("Lingua")
        .inner_size(760.0, 520.0)
        .resizable(true)
        .focused(true)
        .build()?;
    window.set_focus()?;

    Ok(())
}
