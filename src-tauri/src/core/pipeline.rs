//! Translation pipeline
//!
//! Converts a rapidly-changing input cell (text, languages, model) into a
//! correctly-sequenced set of network calls. Edits restart a debounce window;
//! when the window elapses the current state is captured, a generation number
//! is issued, and the call runs in a spawned task. A response is applied only
//! if its generation is still the latest, so a slow call can never overwrite
//! the result of a newer one.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::core::language::{resolve_source_language, LanguageDetector};
use crate::core::request::{self, ChatCompletionResponse};
use crate::core::transport::Transport;
use crate::shared::error::{AppError, AppResult};
use crate::shared::observable::Observable;

/// The input cell the pipeline reads when a translation is evaluated.
///
/// Mutated at arbitrary rate by the UI; a clone is captured the instant a
/// generation is issued so later edits cannot affect an in-flight payload.
#[derive(Debug, Clone)]
pub struct RequestState {
    pub source_text: String,
    /// "auto" or an explicit language code.
    pub source_language: String,
    pub target_language: String,
    pub model: String,
    pub api_key: String,
    pub api_base_url: String,
}

impl Default for RequestState {
    fn default() -> Self {
        Self {
            source_text: String::new(),
            source_language: crate::config::AUTO_LANG.to_string(),
            target_language: crate::config::DEFAULT_OUTPUT_LANG.to_string(),
            model: crate::config::DEFAULT_MODEL.to_string(),
            api_key: String::new(),
            api_base_url: crate::config::DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

struct PipelineInner {
    request: RequestState,
    /// Bumped on every qualifying change; a sleeping debounce task only
    /// evaluates if its epoch is still current when it wakes.
    debounce_epoch: u64,
    /// Strictly increasing; one issued network call at most per value.
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct TranslationPipeline {
    inner: Arc<Mutex<PipelineInner>>,
    transport: Arc<dyn Transport>,
    detector: Arc<dyn LanguageDetector>,
    debounce: Duration,
    pub current_text: Observable<String>,
    pub is_loading: Observable<bool>,
    pub last_error: Observable<Option<AppError>>,
}

impl TranslationPipeline {
    pub fn new(
        transport: Arc<dyn Transport>,
        detector: Arc<dyn LanguageDetector>,
        initial: RequestState,
        debounce: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PipelineInner {
                request: initial,
                debounce_epoch: 0,
                generation: 0,
                in_flight: None,
            })),
            transport,
            detector,
            debounce,
            current_text: Observable::new(String::new()),
            is_loading: Observable::new(false),
            last_error: Observable::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PipelineInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                eprintln!("[Pipeline] State mutex poisoned, recovering...");
                poisoned.into_inner()
            }
        }
    }

    pub fn set_source_text(&self, text: impl Into<String>) {
        self.lock().request.source_text = text.into();
        self.schedule();
    }

    pub fn set_source_language(&self, selector: impl Into<String>) {
        self.lock().request.source_language = selector.into();
        self.schedule();
    }

    pub fn set_target_language(&self, code: impl Into<String>) {
        self.lock().request.target_language = code.into();
        self.schedule();
    }

    pub fn set_model(&self, model: impl Into<String>) {
        self.lock().request.model = model.into();
        self.schedule();
    }

    /// Credentials updates never trigger a re-translation on their own.
    pub fn set_endpoint(&self, api_key: impl Into<String>, api_base_url: impl Into<String>) {
        let mut inner = self.lock();
        inner.request.api_key = api_key.into();
        inner.request.api_base_url = api_base_url.into();
    }

    /// Swap the language selectors verbatim ("auto" included) and evaluate
    /// immediately. Returns the selectors after the swap.
    pub fn swap_languages(&self) -> (String, String) {
        let swapped = {
            let mut inner = self.lock();
            let request = &mut inner.request;
            std::mem::swap(&mut request.source_language, &mut request.target_language);
            (request.source_language.clone(), request.target_language.clone())
        };
        self.translate_now();
        swapped
    }

    /// Bypass the debounce window and evaluate the current state now.
    pub fn translate_now(&self) {
        // Kill any pending debounce window so it cannot fire a second time.
        self.lock().debounce_epoch += 1;
        self.evaluate();
    }

    /// Read-only copy of the input cell.
    pub fn snapshot(&self) -> RequestState {
        self.lock().request.clone()
    }

    /// (Re)start the debounce window. Rapid edits coalesce into a single
    /// eventual evaluation using the state present at the last edit.
    fn schedule(&self) {
        let epoch = {
            let mut inner = self.lock();
            inner.debounce_epoch += 1;
            inner.debounce_epoch
        };
        let pipeline = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(pipeline.debounce).await;
            let still_current = pipeline.lock().debounce_epoch == epoch;
            if still_current {
                pipeline.evaluate();
            }
        });
    }

    fn evaluate(&self) {
        let (generation, text, snapshot) = {
            let mut inner = self.lock();
            let trimmed = inner.request.source_text.trim().to_string();
            if trimmed.is_empty() {
                // Cheap short-circuit: no generation is issued, last_error is
                // left alone, and in-flight work keeps running.
                self.current_text.set(String::new());
                self.is_loading.set(false);
                return;
            }
            inner.generation += 1;
            // This generation supersedes whatever is still running; abort it
            // to free the socket. The staleness comparison in apply_outcome
            // remains the mechanism that keeps results correctly ordered.
            if let Some(handle) = inner.in_flight.take() {
                handle.abort();
            }
            self.is_loading.set(true);
            (inner.generation, trimmed, inner.request.clone())
        };

        let endpoint = match request::parse_endpoint(&snapshot.api_base_url) {
            Ok(url) => url,
            Err(e) => {
                self.fail_if_current(generation, e);
                return;
            }
        };
        let source =
            resolve_source_language(&snapshot.source_language, &text, self.detector.as_ref());
        let payload =
            request::build_payload(&text, &source, &snapshot.target_language, &snapshot.model);

        let pipeline = self.clone();
        let handle = tokio::spawn(async move {
            let outcome = pipeline
                .transport
                .send(&endpoint, &snapshot.api_key, &payload)
                .await;
            pipeline.apply_outcome(generation, outcome);
        });

        let mut inner = self.lock();
        if inner.generation == generation {
            inner.in_flight = Some(handle);
        }
    }

    fn apply_outcome(&self, generation: u64, outcome: AppResult<ChatCompletionResponse>) {
        let mut inner = self.lock();
        if inner.generation != generation {
            // A newer generation was issued while this call was in flight;
            // discard silently.
            return;
        }
        inner.in_flight = None;
        match outcome {
            Ok(response) => {
                self.current_text
                    .set(response.first_content().trim().to_string());
                self.last_error.set(None);
            }
            Err(e) => {
                // The last good translation stays visible.
                eprintln!("[Pipeline] Translation failed: {}", e);
                self.last_error.set(Some(e));
            }
        }
        self.is_loading.set(false);
    }

    /// Surface a pre-network failure, unless a newer generation has already
    /// taken over the observables.
    fn fail_if_current(&self, generation: u64, err: AppError) {
        let inner = self.lock();
        if inner.generation != generation {
            return;
        }
        eprintln!("[Pipeline] {}", err);
        self.last_error.set(Some(err));
        self.is_loading.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::language::ScriptDetector;
    use crate::core::request::{ChatMessage, Choice, WirePayload};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    fn completion(content: &str) -> ChatCompletionResponse {
        ChatCompletionResponse {
            choices: vec![Choice {
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content: content.to_string(),
                },
            }],
        }
    }

    /// Scripted transport double: counts calls, records payloads, and plays
    /// back queued (delay, outcome) pairs in order.
    struct StubTransport {
        calls: AtomicUsize,
        sent: Mutex<Vec<WirePayload>>,
        script: Mutex<VecDeque<(Duration, AppResult<ChatCompletionResponse>)>>,
    }

    impl StubTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                sent: Mutex::new(Vec::new()),
                script: Mutex::new(VecDeque::new()),
            })
        }

        fn push(&self, delay: Duration, outcome: AppResult<ChatCompletionResponse>) {
            self.script.lock().unwrap().push_back((delay, outcome));
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_user_message(&self) -> String {
            let sent = self.sent.lock().unwrap();
            sent.last().expect("at least one request sent").messages[1]
                .content
                .clone()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(
            &self,
            _endpoint: &Url,
            _api_key: &str,
            payload: &WirePayload,
        ) -> AppResult<ChatCompletionResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sent.lock().unwrap().push(payload.clone());
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some((delay, outcome)) => {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    outcome
                }
                None => Ok(completion("ok")),
            }
        }
    }

    fn test_state() -> RequestState {
        RequestState {
            source_text: String::new(),
            source_language: "auto".to_string(),
            target_language: "en".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: "test-key".to_string(),
            api_base_url: "https://api.example.com/v1/chat/completions".to_string(),
        }
    }

    fn make_pipeline(transport: Arc<StubTransport>) -> TranslationPipeline {
        TranslationPipeline::new(
            transport,
            Arc::new(ScriptDetector),
            test_state(),
            Duration::from_millis(30),
        )
    }

    #[tokio::test]
    async fn test_rapid_edits_coalesce_into_one_call() {
        let transport = StubTransport::new();
        let pipeline = make_pipeline(transport.clone());

        for text in ["B", "Bo", "Bon", "Bonjour"] {
            pipeline.set_source_text(text);
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(transport.calls(), 1);
        assert!(transport.last_user_message().ends_with("Bonjour"));
    }

    #[tokio::test]
    async fn test_stale_response_never_overwrites_newer() {
        let transport = StubTransport::new();
        transport.push(Duration::from_millis(120), Ok(completion("OLD")));
        transport.push(Duration::from_millis(10), Ok(completion("NEW")));
        let pipeline = make_pipeline(transport.clone());

        pipeline.set_source_text("first");
        pipeline.translate_now();
        tokio::time::sleep(Duration::from_millis(20)).await;
        pipeline.set_source_text("second");
        pipeline.translate_now();
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(transport.calls(), 2);
        assert_eq!(pipeline.current_text.get(), "NEW");
        assert!(!pipeline.is_loading.get());
        assert!(pipeline.last_error.get().is_none());
    }

    #[tokio::test]
    async fn test_superseded_call_is_abandoned() {
        let transport = StubTransport::new();
        transport.push(Duration::from_secs(10), Ok(completion("NEVER")));
        transport.push(Duration::ZERO, Ok(completion("NEW")));
        let pipeline = make_pipeline(transport.clone());

        pipeline.set_source_text("first");
        pipeline.translate_now();
        tokio::time::sleep(Duration::from_millis(10)).await;
        pipeline.set_source_text("second");
        pipeline.translate_now();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(transport.calls(), 2);
        assert_eq!(pipeline.current_text.get(), "NEW");
        assert!(!pipeline.is_loading.get());
    }

    #[tokio::test]
    async fn test_whitespace_only_short_circuits() {
        let transport = StubTransport::new();
        transport.push(Duration::ZERO, Ok(completion("Bonjour")));
        let pipeline = make_pipeline(transport.clone());

        pipeline.set_source_text("hello");
        pipeline.translate_now();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(pipeline.current_text.get(), "Bonjour");

        pipeline.set_source_text("   ");
        pipeline.translate_now();

        assert_eq!(pipeline.current_text.get(), "");
        assert!(!pipeline.is_loading.get());
        // No second call was issued for the empty input.
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_endpoint_surfaces_without_transport() {
        let transport = StubTransport::new();
        let mut state = test_state();
        state.api_base_url = "not a url".to_string();
        let pipeline = TranslationPipeline::new(
            transport.clone(),
            Arc::new(ScriptDetector),
            state,
            Duration::from_millis(30),
        );

        pipeline.set_source_text("hello");
        pipeline.translate_now();

        assert_eq!(transport.calls(), 0);
        assert!(!pipeline.is_loading.get());
        assert!(matches!(
            pipeline.last_error.get(),
            Some(AppError::InvalidEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn test_response_content_is_trimmed() {
        let transport = StubTransport::new();
        transport.push(Duration::ZERO, Ok(completion("  Bonjour  ")));
        let pipeline = make_pipeline(transport.clone());

        pipeline.set_source_text("hello");
        pipeline.translate_now();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(pipeline.current_text.get(), "Bonjour");
    }

    #[tokio::test]
    async fn test_swap_languages_bypasses_debounce() {
        let transport = StubTransport::new();
        let mut state = test_state();
        state.source_language = "fr".to_string();
        state.target_language = "en".to_string();
        state.source_text = "bonjour".to_string();
        // A debounce window far longer than the test: only an immediate
        // evaluation can produce the call.
        let pipeline = TranslationPipeline::new(
            transport.clone(),
            Arc::new(ScriptDetector),
            state,
            Duration::from_secs(10),
        );

        let (source, target) = pipeline.swap_languages();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!((source.as_str(), target.as_str()), ("en", "fr"));
        assert_eq!(transport.calls(), 1);
        assert!(transport
            .last_user_message()
            .starts_with("Translate this text from en to fr:"));
    }

    #[tokio::test]
    async fn test_error_keeps_last_translation_visible() {
        let transport = StubTransport::new();
        transport.push(Duration::ZERO, Ok(completion("Bonjour")));
        transport.push(
            Duration::ZERO,
            Err(AppError::Api {
                status: 500,
                body: "boom".to_string(),
            }),
        );
        transport.push(Duration::ZERO, Ok(completion("Salut")));
        let pipeline = make_pipeline(transport.clone());

        pipeline.set_source_text("hello");
        pipeline.translate_now();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(pipeline.current_text.get(), "Bonjour");

        pipeline.set_source_text("hello again");
        pipeline.translate_now();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(pipeline.current_text.get(), "Bonjour");
        assert!(matches!(
            pipeline.last_error.get(),
            Some(AppError::Api { status: 500, .. })
        ));
        assert!(!pipeline.is_loading.get());

        pipeline.set_source_text("hi");
        pipeline.translate_now();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(pipeline.current_text.get(), "Salut");
        assert!(pipeline.last_error.get().is_none());
    }

    #[tokio::test]
    async fn test_empty_choices_yield_empty_string() {
        let transport = StubTransport::new();
        transport.push(Duration::ZERO, Ok(ChatCompletionResponse { choices: vec![] }));
        let pipeline = make_pipeline(transport.clone());

        pipeline.set_source_text("hello");
        pipeline.translate_now();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(pipeline.current_text.get(), "");
        assert!(pipeline.last_error.get().is_none());
    }

    #[tokio::test]
    async fn test_edit_after_issue_reschedules_without_aborting() {
        let transport = StubTransport::new();
        transport.push(Duration::from_millis(40), Ok(completion("FIRST")));
        let pipeline = make_pipeline(transport.clone());

        pipeline.set_source_text("hello");
        pipeline.translate_now();
        // Edit while the call is in flight: the call keeps running and its
        // result applies because no newer generation is issued before the
        // new debounce window elapses.
        tokio::time::sleep(Duration::from_millis(10)).await;
        pipeline.set_source_text("hello friend");
        tokio::time::sleep(Duration::from_millis(15)).await;
        assert_eq!(transport.calls(), 1);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(transport.calls(), 2);
        assert!(transport.last_user_message().ends_with("hello friend"));
    }

    #[tokio::test]
    async fn test_captured_state_is_immune_to_later_edits() {
        let transport = StubTransport::new();
        transport.push(Duration::from_millis(50), Ok(completion("done")));
        let pipeline = make_pipeline(transport.clone());

        pipeline.set_source_text("original");
        pipeline.translate_now();
        // Mutate the cell while the call is in flight; the issued payload
        // must still carry the captured text.
        pipeline.set_endpoint("other-key", "https://elsewhere.example/v1");
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(transport.last_user_message().ends_with("original"));
    }
}
