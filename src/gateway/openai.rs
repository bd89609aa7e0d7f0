//! OpenAI-compatible chat-completion client over ureq.
//!
//! One fixed system role, the rendered extraction prompt as the user role,
//! `temperature=0.1`, `max_tokens=4000`. Streaming mode reads SSE lines
//! (`data: {...}`) and forwards each text delta; the stream ends at `[DONE]`.

use std::io::{BufRead, BufReader};
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::constants::{MODEL_MAX_TOKENS, MODEL_TEMPERATURE};
use crate::error::GatewayError;

use super::ModelClient;

const SYSTEM_ROLE: &str = "You are a professional question extraction assistant. \
Return results strictly in the requested JSON format.";

pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn request_body(&self, prompt: &str, stream: bool) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_ROLE },
                { "role": "user", "content": prompt }
            ],
            "temperature": MODEL_TEMPERATURE,
            "max_tokens": MODEL_MAX_TOKENS,
            "stream": stream
        })
    }

    fn post(
        &self,
        body: &serde_json::Value,
    ) -> Result<ureq::http::Response<ureq::Body>, GatewayError> {
        let payload =
            serde_json::to_vec(body).map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        ureq::post(&self.endpoint())
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .config()
            .timeout_global(Some(self.timeout))
            .build()
            .send(payload.as_slice())
            .map_err(|e| GatewayError::Http(e.to_string()))
    }
}

impl ModelClient for OpenAiClient {
    fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        let mut response = self.post(&self.request_body(prompt, false))?;
        let value: serde_json::Value = response
            .body_mut()
            .read_json()
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        let content = value["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default();
        Ok(content.to_string())
    }

    fn complete_streaming(
        &self,
        prompt: &str,
        sink: &mut dyn FnMut(&str) -> bool,
    ) -> Result<(), GatewayError> {
        let mut response = self.post(&self.request_body(prompt, true))?;
        let reader = BufReader::new(response.body_mut().as_reader());

        for line in reader.lines() {
            let line = line.map_err(|e| GatewayError::Http(e.to_string()))?;
            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();
            if data == "[DONE]" {
                break;
            }
            let Ok(event) = serde_json::from_str::<serde_json::Value>(data) else {
                continue;
            };
            if let Some(delta) = event["choices"][0]["delta"]["content"].as_str() {
                if !sink(delta) {
                    tracing::debug!("Stream consumer requested abort");
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}
