//! Model gateway — rate limiting, retries, and statistics around the LLM.
//!
//! All model traffic goes through `ModelGateway::invoke`. A mutex-guarded
//! timing gate enforces the minimum inter-call interval even under
//! concurrent callers; failed attempts back off linearly before retrying.
//! Cancellation is polled before each attempt and between stream deltas.

pub mod openai;

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::cancel::CancelToken;
use crate::config::GatewayConfig;
use crate::error::GatewayError;

pub use openai::OpenAiClient;

/// The one interface a concrete LLM adapter implements.
/// Constructed once at startup; no runtime dispatch on client shape.
pub trait ModelClient: Send + Sync {
    /// Single-shot completion: full response body in one call.
    fn complete(&self, prompt: &str) -> Result<String, GatewayError>;

    /// Streaming completion: every text delta goes through `sink`.
    /// A `false` return from the sink aborts the stream early; the client
    /// then returns `Ok(())` and the caller decides what the abort means.
    fn complete_streaming(
        &self,
        prompt: &str,
        sink: &mut dyn FnMut(&str) -> bool,
    ) -> Result<(), GatewayError>;
}

/// Success/failure counters, mutex-protected alongside the timing gate.
#[derive(Debug, Clone, Default)]
pub struct GatewayStats {
    pub success: u64,
    pub failures: u64,
    pub last_used: Option<Instant>,
}

pub struct ModelGateway {
    client: Box<dyn ModelClient>,
    config: GatewayConfig,
    /// Start time of the most recent call; the rate-limit gate.
    last_call_start: Mutex<Option<Instant>>,
    stats: Mutex<GatewayStats>,
}

impl ModelGateway {
    pub fn new(config: GatewayConfig, client: Box<dyn ModelClient>) -> Self {
        Self {
            client,
            config,
            last_call_start: Mutex::new(None),
            stats: Mutex::new(GatewayStats::default()),
        }
    }

    pub fn stats(&self) -> GatewayStats {
        self.stats.lock().unwrap().clone()
    }

    /// Invoke the model with rate limiting and linear-backoff retries.
    ///
    /// Fails with `ExhaustedRetries` once every attempt has failed, or with
    /// `Cancelled` as soon as the token is observed set. `ExhaustedRetries`
    /// is a chunk-level failure for the orchestrator, never pipeline-level.
    pub fn invoke(&self, prompt: &str, cancel: &CancelToken) -> Result<String, GatewayError> {
        let max_retries = self.config.max_retries.max(1);
        let mut last_failure = String::new();

        for attempt in 1..=max_retries {
            if cancel.is_cancelled() {
                tracing::info!("Cancellation observed before gateway attempt, aborting");
                return Err(GatewayError::Cancelled);
            }

            self.wait_for_call_slot();
            tracing::debug!(attempt, max_retries, streaming = self.config.stream, "Calling model");

            let result = if self.config.stream {
                self.call_streaming(prompt, cancel)
            } else {
                self.call_once(prompt)
            };

            match result {
                Ok(text) => {
                    let mut stats = self.stats.lock().unwrap();
                    stats.success += 1;
                    stats.last_used = Some(Instant::now());
                    tracing::debug!(response_len = text.len(), "Model call succeeded");
                    return Ok(text);
                }
                Err(GatewayError::Cancelled) => return Err(GatewayError::Cancelled),
                Err(e) => {
                    self.stats.lock().unwrap().failures += 1;
                    tracing::warn!(attempt, max_retries, error = %e, "Model call failed");
                    last_failure = e.to_string();
                    if attempt < max_retries {
                        let backoff = Duration::from_millis(
                            self.config.retry_backoff_base_ms * attempt as u64,
                        );
                        tracing::debug!(backoff_ms = backoff.as_millis() as u64, "Backing off");
                        std::thread::sleep(backoff);
                    }
                }
            }
        }

        tracing::error!(attempts = max_retries, "All gateway attempts exhausted");
        Err(GatewayError::ExhaustedRetries {
            attempts: max_retries,
            last: last_failure,
        })
    }

    /// Enforce the minimum inter-call interval under the timing gate.
    ///
    /// The sleep happens while holding the lock, so concurrent callers cannot
    /// both read a stale "last call start" and violate the aggregate rate.
    fn wait_for_call_slot(&self) {
        let mut last = self.last_call_start.lock().unwrap();
        if let Some(prev) = *last {
            let min_interval = Duration::from_millis(self.config.min_call_interval_ms);
            let elapsed = prev.elapsed();
            if elapsed < min_interval {
                let wait = min_interval - elapsed;
                tracing::debug!(wait_ms = wait.as_millis() as u64, "Rate limit: throttling call");
                std::thread::sleep(wait);
            }
        }
        *last = Some(Instant::now());
    }

    fn call_once(&self, prompt: &str) -> Result<String, GatewayError> {
        let text = self.client.complete(prompt)?;
        if text.trim().is_empty() {
            return Err(GatewayError::EmptyResponse);
        }
        Ok(text)
    }

    /// Streaming call: accumulate deltas, re-checking cancellation between them.
    fn call_streaming(&self, prompt: &str, cancel: &CancelToken) -> Result<String, GatewayError> {
        let mut full = String::new();
        self.client.complete_streaming(prompt, &mut |delta| {
            full.push_str(delta);
            !cancel.is_cancelled()
        })?;

        if cancel.is_cancelled() {
            tracing::info!(partial_len = full.len(), "Stream aborted by cancellation");
            return Err(GatewayError::Cancelled);
        }
        if full.trim().is_empty() {
            return Err(GatewayError::EmptyResponse);
        }
        Ok(full)
    }
}
