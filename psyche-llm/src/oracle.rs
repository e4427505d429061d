//! The synchronous oracle boundary: `prompt text → reply text`.
//!
//! Dialogue turns are single-threaded and blocking. Anything that can answer
//! a prompt implements [`Oracle`]: plain closures (handy for stubs) and
//! [`BlockingOracle`], which drives the async [`LlmClient`] on its own
//! current-thread runtime.

use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::client::LlmClient;
use crate::error::LlmError;
use crate::types::LlmRequest;

/// External text-generation service.
pub trait Oracle {
    /// Send `text` and block until the reply arrives.
    ///
    /// # Errors
    /// Any failure to obtain a reply.
    fn prompt(&mut self, text: &str) -> Result<String, LlmError>;
}

impl<F> Oracle for F
where
    F: FnMut(&str) -> Result<String, LlmError>,
{
    fn prompt(&mut self, text: &str) -> Result<String, LlmError> {
        self(text)
    }
}

/// Sampling settings applied to every request a [`BlockingOracle`] sends.
#[derive(Debug, Clone, Copy)]
pub struct RequestSettings {
    /// Maximum tokens per completion.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
            timeout_ms: 30_000,
        }
    }
}

/// [`Oracle`] backed by an [`LlmClient`] and a private current-thread runtime.
///
/// Must not be used from inside another tokio runtime: `block_on` panics there.
pub struct BlockingOracle {
    client: LlmClient,
    settings: RequestSettings,
    runtime: Runtime,
}

impl BlockingOracle {
    /// Wrap `client`.
    ///
    /// # Errors
    /// `LlmError::ConfigError` if the runtime cannot be created.
    pub fn new(client: LlmClient, settings: RequestSettings) -> Result<Self, LlmError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::ConfigError(format!("failed to start runtime: {e}")))?;
        Ok(Self {
            client,
            settings,
            runtime,
        })
    }

    /// The wrapped client.
    #[must_use]
    pub fn client(&self) -> &LlmClient {
        &self.client
    }
}

impl Oracle for BlockingOracle {
    fn prompt(&mut self, text: &str) -> Result<String, LlmError> {
        let request = LlmRequest::new(text)
            .with_max_tokens(self.settings.max_tokens)
            .with_temperature(self.settings.temperature)
            .with_timeout(self.settings.timeout_ms);
        let response = self.runtime.block_on(self.client.generate(&request))?;
        debug!(
            model = %response.model,
            latency_ms = response.latency_ms,
            tokens = response.tokens_generated,
            "Oracle replied"
        );
        Ok(response.text.trim().to_string())
    }
}
