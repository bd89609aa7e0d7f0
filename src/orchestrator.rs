//! Extraction orchestrator — cache lookup, pipeline stages, cancellation,
//! and progress reporting for one file at a time.
//!
//! No error ever crosses the public boundary: benign-empty sources return
//! an empty list, chunk-level failures are logged and skipped, cancellation
//! mid-loop returns the questions accumulated so far, and anything escaping
//! the outer handler is logged and downgraded to an empty list.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::config::ExtractorConfig;
use crate::constants::MIN_CHUNK_LEN;
use crate::error::{ExtractError, ExtractResult, GatewayError};
use crate::gateway::{ModelClient, ModelGateway, OpenAiClient};
use crate::pipeline;
use crate::question::{self, Question};
use crate::source::{self, FileKind};
use crate::store::{self, SaveReport};

/// Progress callback: completion percentage (0-100) and a status message.
pub type ProgressFn<'a> = &'a mut dyn FnMut(f64, &str);

pub struct QuestionExtractor {
    gateway: ModelGateway,
    config: ExtractorConfig,
    /// file hash -> post-processed questions; process lifetime, never evicted.
    cache: Mutex<HashMap<String, Vec<Question>>>,
    cancel: CancelToken,
}

impl QuestionExtractor {
    /// Build with the standard OpenAI-compatible HTTP client.
    pub fn new(config: ExtractorConfig) -> Self {
        let client = OpenAiClient::new(&config.gateway);
        Self::with_client(config, Box::new(client))
    }

    /// Build with an injected client (tests, alternative providers).
    pub fn with_client(config: ExtractorConfig, client: Box<dyn ModelClient>) -> Self {
        Self {
            gateway: ModelGateway::new(config.gateway.clone(), client),
            config,
            cache: Mutex::new(HashMap::new()),
            cancel: CancelToken::new(),
        }
    }

    /// Shared token for requesting cancellation from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Gateway call statistics (success/failure counters).
    pub fn gateway_stats(&self) -> crate::gateway::GatewayStats {
        self.gateway.stats()
    }

    /// Process one file into a deduplicated, validated question list.
    ///
    /// Identical file content short-circuits through the cache without any
    /// model traffic. Returns an empty list for empty sources, total
    /// failures, and cancellation before the chunk loop; returns partial
    /// results for cancellation observed mid-loop.
    pub fn process_file(
        &self,
        path: &Path,
        kind: FileKind,
        mut progress: Option<ProgressFn>,
    ) -> Vec<Question> {
        self.cancel.reset();
        tracing::info!(path = %path.display(), kind = kind.as_str(), "Processing file");

        match self.run_pipeline(path, kind, &mut progress) {
            Ok(questions) => questions,
            Err(ExtractError::Cancelled) => {
                tracing::info!(path = %path.display(), "Processing cancelled before any chunk result");
                Vec::new()
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "File processing failed");
                Vec::new()
            }
        }
    }

    /// Process a file and persist accepted questions to `target_dir`.
    pub fn process_file_and_save(
        &self,
        path: &Path,
        kind: FileKind,
        target_dir: &Path,
        progress: Option<ProgressFn>,
    ) -> SaveReport {
        let questions = self.process_file(path, kind, progress);
        let source_filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("source");
        store::save_questions(&questions, target_dir, source_filename)
    }

    /// Free-form follow-up about one extracted question, through the same
    /// rate-limited gateway. Unlike `process_file`, gateway failures surface
    /// to the caller so the conversation layer can show them.
    pub fn discuss_question(&self, question: &Question, query: &str) -> ExtractResult<String> {
        let prompt = pipeline::build_followup(question, query);
        match self.gateway.invoke(&prompt, &self.cancel) {
            Ok(reply) => Ok(reply),
            Err(GatewayError::Cancelled) => Err(ExtractError::Cancelled),
            Err(e) => Err(ExtractError::Gateway(e)),
        }
    }

    fn run_pipeline(
        &self,
        path: &Path,
        kind: FileKind,
        progress: &mut Option<ProgressFn>,
    ) -> ExtractResult<Vec<Question>> {
        let file_hash = question::file_hash(path);
        if let Some(cached) = self.cache.lock().unwrap().get(&file_hash) {
            tracing::info!(path = %path.display(), questions = cached.len(), "Using cached result");
            return Ok(cached.clone());
        }

        self.cancel.checkpoint()?;
        let content = source::extract_text(path, kind, &self.config.pipeline.ocr_language);
        tracing::info!(chars = content.len(), "Raw text extracted");
        if content.trim().is_empty() {
            tracing::info!(path = %path.display(), "Source text empty, nothing to extract");
            return Ok(Vec::new());
        }

        self.cancel.checkpoint()?;
        let normalized = pipeline::normalize(&content);
        if normalized.is_empty() {
            tracing::info!("Content empty after normalization");
            return Ok(Vec::new());
        }

        self.cancel.checkpoint()?;
        let chunks = pipeline::split(&normalized, self.config.pipeline.max_chunk_size);
        let total = chunks.len();
        tracing::info!(chunks = total, chars = normalized.len(), "Content split");
        report(progress, 0.0, &format!("Split into {} chunks", total));

        let mut raw_questions = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!(processed = i, total, "Cancelled mid-loop, keeping partial results");
                return Ok(pipeline::post_process(raw_questions));
            }

            report(
                progress,
                (i + 1) as f64 / total as f64 * 100.0,
                &format!("Processing chunk {}/{}", i + 1, total),
            );

            match self.extract_from_chunk(chunk, i + 1) {
                Ok(mut items) => raw_questions.append(&mut items),
                Err(ExtractError::Cancelled) => {
                    tracing::info!(processed = i, total, "Cancelled during chunk, keeping partial results");
                    return Ok(pipeline::post_process(raw_questions));
                }
                Err(e) => {
                    tracing::warn!(chunk = i + 1, total, error = %e, "Chunk failed, skipping");
                }
            }

            // Politeness delay between chunks, independent of the rate limiter.
            if i + 1 < total && self.config.pipeline.inter_chunk_delay_ms > 0 {
                std::thread::sleep(Duration::from_millis(self.config.pipeline.inter_chunk_delay_ms));
            }
        }

        self.cancel.checkpoint()?;
        let extracted = raw_questions.len();
        let filtered = pipeline::post_process(raw_questions);
        tracing::info!(extracted, kept = filtered.len(), "Post-processing complete");

        self.cache.lock().unwrap().insert(file_hash, filtered.clone());
        Ok(filtered)
    }

    /// Extract questions from one chunk: prompt → gateway → parse.
    ///
    /// Gateway cancellation is re-raised as `ExtractError::Cancelled`; every
    /// other failure is chunk-level and handled by the caller's skip logic.
    fn extract_from_chunk(
        &self,
        chunk: &str,
        ordinal: usize,
    ) -> ExtractResult<Vec<serde_json::Value>> {
        let trimmed = chunk.trim();
        if trimmed.chars().count() < MIN_CHUNK_LEN {
            tracing::debug!(chunk = ordinal, "Chunk too short, skipping");
            return Ok(Vec::new());
        }

        let prompt = pipeline::build_prompt(trimmed, ordinal);
        let response = match self.gateway.invoke(&prompt, &self.cancel) {
            Ok(text) => text,
            Err(GatewayError::Cancelled) => return Err(ExtractError::Cancelled),
            Err(e) => return Err(ExtractError::Gateway(e)),
        };

        let items = pipeline::parse_response(&response);
        tracing::info!(chunk = ordinal, items = items.len(), "Chunk parsed");
        Ok(items)
    }
}

fn report(progress: &mut Option<ProgressFn>, percent: f64, message: &str) {
    if let Some(callback) = progress {
        callback(percent, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GatewayConfig, PipelineConfig};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Five 40-char sentences; with max_chunk_size=40 the chunker splits
    /// exactly at each '?' so the pipeline sees five chunks.
    const FIVE_SENTENCES: [&str; 5] = [
        "Tell me the answer to question letter A?",
        "Tell me the answer to question letter B?",
        "Tell me the answer to question letter C?",
        "Tell me the answer to question letter D?",
        "Tell me the answer to question letter E?",
    ];

    fn test_config() -> ExtractorConfig {
        ExtractorConfig {
            gateway: GatewayConfig {
                min_call_interval_ms: 0,
                retry_backoff_base_ms: 0,
                max_retries: 3,
                stream: false,
                ..GatewayConfig::default()
            },
            pipeline: PipelineConfig {
                max_chunk_size: 40,
                inter_chunk_delay_ms: 0,
                ..PipelineConfig::default()
            },
        }
    }

    /// Returns one unique complete question per call; optionally cancels a
    /// late-bound token after `cancel_after` calls, or always fails.
    #[derive(Clone)]
    struct StubClient {
        calls: Arc<AtomicU32>,
        fail: bool,
        cancel_after: u32,
        cancel_token: Arc<std::sync::Mutex<Option<CancelToken>>>,
    }

    impl StubClient {
        fn ok() -> Self {
            Self {
                calls: Arc::new(AtomicU32::new(0)),
                fail: false,
                cancel_after: 0,
                cancel_token: Arc::new(std::sync::Mutex::new(None)),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::ok()
            }
        }

        fn cancelling_after(n: u32) -> Self {
            Self {
                cancel_after: n,
                ..Self::ok()
            }
        }

        fn bind_token(&self, token: CancelToken) {
            *self.cancel_token.lock().unwrap() = Some(token);
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ModelClient for StubClient {
        fn complete(&self, _prompt: &str) -> Result<String, GatewayError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(GatewayError::Http("stub failure".into()));
            }
            if self.cancel_after > 0 && n >= self.cancel_after {
                if let Some(token) = self.cancel_token.lock().unwrap().as_ref() {
                    token.cancel();
                }
            }
            Ok(format!(
                r#"[{{"type":"short-answer","category":"test","question":"Stub question number {} goes here?","answer":"stub answer {}"}}]"#,
                n, n
            ))
        }

        fn complete_streaming(
            &self,
            prompt: &str,
            sink: &mut dyn FnMut(&str) -> bool,
        ) -> Result<(), GatewayError> {
            let text = self.complete(prompt)?;
            sink(&text);
            Ok(())
        }
    }

    fn write_source(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_five_sentence_fixture_chunks_as_expected() {
        let text = FIVE_SENTENCES.concat();
        let chunks = pipeline::split(&pipeline::normalize(&text), 40);
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0], FIVE_SENTENCES[0]);
    }

    #[test]
    fn test_full_pipeline_extracts_from_every_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "doc.txt", &FIVE_SENTENCES.concat());
        let client = StubClient::ok();
        let extractor = QuestionExtractor::with_client(test_config(), Box::new(client.clone()));

        let questions = extractor.process_file(&path, FileKind::Text, None);
        assert_eq!(client.call_count(), 5);
        assert_eq!(questions.len(), 5, "One unique question per chunk");
        assert_eq!(questions[0].question, "Stub question number 1 goes here?");
    }

    #[test]
    fn test_cache_short_circuits_second_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "doc.txt", &FIVE_SENTENCES.concat());
        let client = StubClient::ok();
        let extractor = QuestionExtractor::with_client(test_config(), Box::new(client.clone()));

        let first = extractor.process_file(&path, FileKind::Text, None);
        let calls_after_first = client.call_count();
        let second = extractor.process_file(&path, FileKind::Text, None);

        assert_eq!(first, second, "Cached run returns the identical list");
        assert_eq!(
            client.call_count(),
            calls_after_first,
            "Second run must not invoke the gateway"
        );
    }

    #[test]
    fn test_changed_content_misses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "doc.txt", &FIVE_SENTENCES.concat());
        let client = StubClient::ok();
        let extractor = QuestionExtractor::with_client(test_config(), Box::new(client.clone()));

        extractor.process_file(&path, FileKind::Text, None);
        std::fs::write(&path, FIVE_SENTENCES[0]).unwrap();
        extractor.process_file(&path, FileKind::Text, None);
        assert_eq!(client.call_count(), 6, "New content reruns the pipeline");
    }

    #[test]
    fn test_cancellation_mid_loop_keeps_partial_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "doc.txt", &FIVE_SENTENCES.concat());
        let client = StubClient::cancelling_after(2);
        let extractor = QuestionExtractor::with_client(test_config(), Box::new(client.clone()));
        client.bind_token(extractor.cancel_token());

        let questions = extractor.process_file(&path, FileKind::Text, None);
        assert_eq!(client.call_count(), 2, "Chunks 3-5 never reach the gateway");
        assert_eq!(questions.len(), 2, "Results from chunks 1-2 are kept");
    }

    #[test]
    fn test_cancellation_before_loop_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "doc.txt", &FIVE_SENTENCES.concat());
        let client = StubClient::ok();
        let extractor = QuestionExtractor::with_client(test_config(), Box::new(client.clone()));

        // process_file resets the token, so pre-set flags are cleared; cancel
        // from the first progress callback instead, before chunk 1 runs.
        let token = extractor.cancel_token();
        let mut cancel_early = |_pct: f64, _msg: &str| token.cancel();
        let questions = extractor.process_file(&path, FileKind::Text, Some(&mut cancel_early));

        assert!(questions.is_empty());
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn test_failing_gateway_skips_chunks_not_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "doc.txt", &FIVE_SENTENCES.concat());
        let client = StubClient::failing();
        let extractor = QuestionExtractor::with_client(test_config(), Box::new(client.clone()));

        let questions = extractor.process_file(&path, FileKind::Text, None);
        assert!(questions.is_empty());
        assert_eq!(
            client.call_count(),
            5 * 3,
            "Every chunk retries max_retries times, pipeline never aborts"
        );
    }

    #[test]
    fn test_missing_file_is_benign_empty() {
        let client = StubClient::ok();
        let extractor = QuestionExtractor::with_client(test_config(), Box::new(client.clone()));
        let questions =
            extractor.process_file(Path::new("/no/such/file.txt"), FileKind::Text, None);
        assert!(questions.is_empty());
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn test_progress_reported_per_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "doc.txt", &FIVE_SENTENCES.concat());
        let extractor =
            QuestionExtractor::with_client(test_config(), Box::new(StubClient::ok()));

        let mut reports = Vec::new();
        let mut collect = |pct: f64, msg: &str| reports.push((pct, msg.to_string()));
        extractor.process_file(&path, FileKind::Text, Some(&mut collect));

        assert_eq!(reports.len(), 6, "Split notice plus one report per chunk");
        assert_eq!(reports[0].0, 0.0);
        assert!((reports[5].0 - 100.0).abs() < 1e-9);
        assert!(reports[1].1.contains("1/5"));
    }

    #[test]
    fn test_discuss_question_goes_through_gateway() {
        struct Tutor;
        impl ModelClient for Tutor {
            fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
                assert!(prompt.contains("What is inertia?"));
                assert!(prompt.contains("everyday example"));
                Ok("A passenger lurching forward when a bus brakes.".into())
            }
            fn complete_streaming(
                &self,
                p: &str,
                sink: &mut dyn FnMut(&str) -> bool,
            ) -> Result<(), GatewayError> {
                sink(&self.complete(p)?);
                Ok(())
            }
        }

        let extractor = QuestionExtractor::with_client(test_config(), Box::new(Tutor));
        let question = Question {
            kind: "short-answer".into(),
            category: "physics".into(),
            question: "What is inertia?".into(),
            answer: "Resistance to change in motion.".into(),
            notes: String::new(),
            difficulty: 2,
        };

        let reply = extractor
            .discuss_question(&question, "Can you give an everyday example?")
            .unwrap();
        assert!(reply.contains("bus brakes"));
    }

    #[test]
    fn test_discuss_question_surfaces_gateway_failure() {
        let extractor =
            QuestionExtractor::with_client(test_config(), Box::new(StubClient::failing()));
        let question = Question {
            kind: "qa".into(),
            category: "math".into(),
            question: "What is two plus two exactly?".into(),
            answer: "4".into(),
            notes: String::new(),
            difficulty: 1,
        };

        let result = extractor.discuss_question(&question, "Why?");
        assert!(matches!(
            result,
            Err(ExtractError::Gateway(GatewayError::ExhaustedRetries { .. }))
        ));
    }

    #[test]
    fn test_duplicate_questions_across_chunks_deduped() {
        // A client that always returns the same question regardless of chunk.
        struct SameAnswer;
        impl ModelClient for SameAnswer {
            fn complete(&self, _p: &str) -> Result<String, GatewayError> {
                Ok(r#"[{"type":"qa","category":"t","question":"Always the same question?","answer":"yes"}]"#.into())
            }
            fn complete_streaming(
                &self,
                p: &str,
                sink: &mut dyn FnMut(&str) -> bool,
            ) -> Result<(), GatewayError> {
                sink(&self.complete(p)?);
                Ok(())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let path = write_source(&dir, "doc.txt", &FIVE_SENTENCES.concat());
        let extractor = QuestionExtractor::with_client(test_config(), Box::new(SameAnswer));

        let questions = extractor.process_file(&path, FileKind::Text, None);
        assert_eq!(questions.len(), 1, "Cross-chunk duplicates collapse to one");
    }
}
