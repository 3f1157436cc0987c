//! Tuning constants
//!
//! Centralized configuration values to eliminate hardcoded literals.

use std::time::Duration;

/// Delay after the last qualifying change before a translation is evaluated.
/// Earlier builds shipped with 0.5s and 1s windows; 300ms tested best.
pub const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(300);

/// Hard cap on a single chat-completion request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Source language used when auto-detection yields nothing confident.
pub const FALLBACK_SOURCE_LANG: &str = "en";

/// Selector value meaning "detect the source language from the text".
pub const AUTO_LANG: &str = "auto";

pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_AVAILABLE_MODELS: &[&str] = &["gpt-3.5-turbo", "gpt-4", "gpt-4o-mini"];
pub const DEFAULT_OUTPUT_LANG: &str = "en";

/// Global shortcut that captures the clipboard into the translator.
pub const TRANSLATE_SHORTCUT: &str = "Control+Shift+T";
