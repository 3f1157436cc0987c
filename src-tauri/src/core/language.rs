//! Source language resolution
//!
//! Maps the user's language selector ("auto" or an explicit code) plus the
//! input text to a concrete source language code. Explicit codes pass through
//! verbatim with no validation against a known-language set - the endpoint
//! sees whatever the user picked.

use crate::config::{AUTO_LANG, FALLBACK_SOURCE_LANG};

/// On-device language detection capability.
///
/// `None` means "no confident result"; the resolver falls back to a default.
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> Option<String>;
}

/// Character-script heuristic detector.
///
/// Good enough for routing a translation request; scripts that map to a
/// single dominant language are recognized, Latin text yields no result.
pub struct ScriptDetector;

impl LanguageDetector for ScriptDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let has_chinese = text.chars().any(|c| {
            ('\u{4E00}'..='\u{9FFF}').contains(&c) || // CJK Unified Ideographs
            ('\u{3400}'..='\u{4DBF}').contains(&c) // CJK Extension A
        });

        let has_japanese = text.chars().any(|c| {
            ('\u{3040}'..='\u{309F}').contains(&c) || // Hiragana
            ('\u{30A0}'..='\u{30FF}').contains(&c) // Katakana
        });

        let has_korean = text.chars().any(|c| {
            ('\u{AC00}'..='\u{D7AF}').contains(&c) // Hangul Syllables
        });

        let has_arabic = text.chars().any(|c| {
            ('\u{0600}'..='\u{06FF}').contains(&c) || // Arabic
            ('\u{0750}'..='\u{077F}').contains(&c) // Arabic Supplement
        });

        let has_cyrillic = text.chars().any(|c| {
            ('\u{0400}'..='\u{04FF}').contains(&c) // Cyrillic
        });

        if has_chinese && !has_japanese {
            Some("zh".to_string())
        } else if has_japanese {
            Some("ja".to_string())
        } else if has_korean {
            Some("ko".to_string())
        } else if has_arabic {
            Some("ar".to_string())
        } else if has_cyrillic {
            Some("ru".to_string())
        } else {
            None
        }
    }
}

/// Resolve the effective source language for a request.
pub fn resolve_source_language(
    selector: &str,
    text: &str,
    detector: &dyn LanguageDetector,
) -> String {
    if selector != AUTO_LANG {
        return selector.to_string();
    }
    detector
        .detect(text)
        .unwrap_or_else(|| FALLBACK_SOURCE_LANG.to_string())
}
