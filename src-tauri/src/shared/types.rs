use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::core::pipeline::{RequestState, TranslationPipeline};
use crate::shared::error::AppError;

/// Snapshot of the translator state the frontend renders.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../src/types/translation.ts")]
pub struct TranslationState {
    pub input_text: String,
    pub translated_text: String,
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub input_language: String,
    pub output_language: String,
    pub model: String,
}

impl TranslationState {
    pub fn capture(pipeline: &TranslationPipeline) -> Self {
        let request: RequestState = pipeline.snapshot();
        Self {
            input_text: request.source_text,
            translated_text: pipeline.current_text.get(),
            is_loading: pipeline.is_loading.get(),
            last_error: pipeline.last_error.get().map(|e: AppError| e.to_string()),
            input_language: request.source_language,
            output_language: request.target_language,
            model: request.model,
        }
    }
}
