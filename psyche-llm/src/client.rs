//! LLM Client — unified interface for Ollama and OpenAI-compatible backends.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::types::{LlmRequest, LlmResponse};

/// Provider backend for LLM inference.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// Ollama running locally.
    Ollama {
        /// Server root, e.g. `http://localhost:11434`.
        base_url: String,
    },
    /// OpenAI-compatible chat completions API.
    OpenAiCompatible {
        /// API root, e.g. `https://api.openai.com`.
        base_url: String,
        /// Bearer token.
        api_key: String,
    },
    /// No LLM available — all calls return `Unavailable`.
    None,
}

/// The main LLM client that routes requests to the configured backend.
pub struct LlmClient {
    provider: LlmProvider,
    http: Client,
    model: String,
    max_retries: u32,
}

impl LlmClient {
    /// Create a new LLM client.
    #[must_use]
    pub fn new(provider: LlmProvider, model: impl Into<String>, max_retries: u32) -> Self {
        Self {
            provider,
            http: Client::new(),
            model: model.into(),
            max_retries,
        }
    }

    /// Create a client with no LLM backend (all calls fail).
    #[must_use]
    pub fn none() -> Self {
        Self::new(LlmProvider::None, String::new(), 0)
    }

    /// Generate a completion for `request`.
    ///
    /// # Errors
    /// `Unavailable` without a provider, `ParseError` for an undecodable
    /// body, `RetriesExhausted` once every attempt has failed.
    pub async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        match &self.provider {
            LlmProvider::None => Err(LlmError::Unavailable("No LLM provider configured".into())),
            LlmProvider::Ollama { base_url } => {
                let url = format!("{}/api/generate", base_url.trim_end_matches('/'));
                let body = ollama_body(&self.model, request);
                self.post_with_retries("Ollama", &url, None, &body, request.timeout_ms, parse_ollama)
                    .await
            }
            LlmProvider::OpenAiCompatible { base_url, api_key } => {
                let url = format!("{}/v1/chat/completions", base_url.trim_end_matches('/'));
                let body = openai_body(&self.model, request);
                self.post_with_retries(
                    "OpenAI",
                    &url,
                    Some(api_key.as_str()),
                    &body,
                    request.timeout_ms,
                    parse_openai,
                )
                .await
            }
        }
    }

    /// POST `body` to `url`, retrying up to `max_retries` times on transport
    /// errors and non-success statuses.
    async fn post_with_retries(
        &self,
        backend: &'static str,
        url: &str,
        api_key: Option<&str>,
        body: &Value,
        timeout_ms: u64,
        extract: fn(&Value) -> (String, u32),
    ) -> Result<LlmResponse, LlmError> {
        let mut last_error = String::new();
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(
                    backend,
                    attempt = attempt + 1,
                    of = self.max_retries + 1,
                    "Retrying LLM call"
                );
            }

            let start = Instant::now();
            let mut builder = self
                .http
                .post(url)
                .json(body)
                .timeout(Duration::from_millis(timeout_ms));
            if let Some(key) = api_key {
                builder = builder.bearer_auth(key);
            }
            let result = builder.send().await;
            let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            match result {
                Ok(resp) if resp.status().is_success() => {
                    let json: Value = resp
                        .json()
                        .await
                        .map_err(|e| LlmError::ParseError(e.to_string()))?;
                    let (text, tokens_generated) = extract(&json);
                    debug!(backend, latency_ms, tokens_generated, "LLM call completed");
                    return Ok(LlmResponse {
                        text,
                        tokens_generated,
                        latency_ms,
                        model: self.model.clone(),
                    });
                }
                Ok(resp) => {
                    let status = resp.status();
                    last_error = format!("HTTP {status}: {}", resp.text().await.unwrap_or_default());
                    warn!(backend, error = %last_error, "LLM backend returned error");
                }
                Err(e) => {
                    last_error = e.to_string();
                    if e.is_timeout() {
                        warn!(backend, timeout_ms, "LLM request timed out");
                    } else {
                        warn!(backend, error = %last_error, "LLM request failed");
                    }
                }
            }
        }

        Err(LlmError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last_error,
        })
    }

    /// Check if the LLM client has a backend configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self.provider, LlmProvider::None)
    }

    /// Model name sent with every request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

// ---------------------------------------------------------------------------
// Wire formats
// ---------------------------------------------------------------------------

fn ollama_body(model: &str, request: &LlmRequest) -> Value {
    json!({
        "model": model,
        "prompt": request.prompt,
        "stream": false,
        "options": {
            "temperature": request.temperature,
            "num_predict": request.max_tokens,
        }
    })
}

fn openai_body(model: &str, request: &LlmRequest) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "user", "content": request.prompt },
        ],
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
    })
}

fn token_count(value: &Value) -> u32 {
    value
        .as_u64()
        .map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX))
}

fn parse_ollama(json: &Value) -> (String, u32) {
    let text = json["response"].as_str().unwrap_or_default().to_string();
    (text, token_count(&json["eval_count"]))
}

fn parse_openai(json: &Value) -> (String, u32) {
    let text = json["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    (text, token_count(&json["usage"]["completion_tokens"]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ollama_body_carries_prompt_and_options() {
        let request = LlmRequest::new("How do you feel?").with_max_tokens(32);
        let body = ollama_body("qwen2.5:1.5b", &request);
        assert_eq!(body["model"], "qwen2.5:1.5b");
        assert_eq!(body["prompt"], "How do you feel?");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 32);
    }

    #[test]
    fn openai_body_is_single_user_message() {
        let body = openai_body("gpt-4o-mini", &LlmRequest::new("Pick one"));
        assert_eq!(body["messages"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Pick one");
        assert_eq!(body["max_tokens"], 1024);
    }

    #[test]
    fn responses_are_extracted() {
        let (text, tokens) = parse_ollama(&json!({ "response": "more serene joy", "eval_count": 4 }));
        assert_eq!(text, "more serene joy");
        assert_eq!(tokens, 4);

        let (text, tokens) = parse_openai(&json!({
            "choices": [{ "message": { "content": "\"flee\"" } }],
            "usage": { "completion_tokens": 2 }
        }));
        assert_eq!(text, "\"flee\"");
        assert_eq!(tokens, 2);

        let (text, tokens) = parse_openai(&json!({ "choices": [] }));
        assert!(text.is_empty());
        assert_eq!(tokens, 0);
    }

    #[tokio::test]
    async fn none_provider_is_unavailable() {
        let client = LlmClient::none();
        assert!(!client.is_available());
        let result = client.generate(&LlmRequest::new("hi")).await;
        assert!(matches!(result, Err(LlmError::Unavailable(_))));
    }

    #[tokio::test]
    async fn unreachable_backend_exhausts_retries() {
        let client = LlmClient::new(
            LlmProvider::Ollama {
                base_url: "http://127.0.0.1:1".into(),
            },
            "test-model",
            1,
        );
        let result = client
            .generate(&LlmRequest::new("hi").with_timeout(500))
            .await;
        assert!(matches!(
            result,
            Err(LlmError::RetriesExhausted { attempts: 2, .. })
        ));
    }
}
