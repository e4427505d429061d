//! Wiring from `[llm]` configuration to a live oracle.

use psyche_core::config::LlmConfig;
use psyche_llm::{BlockingOracle, LlmClient, LlmError, LlmProvider, PromptEngine, RequestSettings};
use tracing::info;

/// Select the backend named by `config.provider`.
///
/// # Errors
/// `LlmError::ConfigError` for an unknown provider, or for `openai` when the
/// API-key variable is unset.
pub fn provider_from_config(config: &LlmConfig) -> Result<LlmProvider, LlmError> {
    match config.provider.as_str() {
        "none" => Ok(LlmProvider::None),
        "ollama" => Ok(LlmProvider::Ollama {
            base_url: config.base_url.clone(),
        }),
        "openai" => {
            let api_key = std::env::var(&config.api_key_env).map_err(|_| {
                LlmError::ConfigError(format!(
                    "environment variable {} is not set",
                    config.api_key_env
                ))
            })?;
            Ok(LlmProvider::OpenAiCompatible {
                base_url: config.base_url.clone(),
                api_key,
            })
        }
        other => Err(LlmError::ConfigError(format!("unknown provider '{other}'"))),
    }
}

/// Per-request settings taken from `config`.
#[must_use]
pub fn request_settings(config: &LlmConfig) -> RequestSettings {
    RequestSettings {
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        timeout_ms: config.request_timeout_ms,
    }
}

/// Build a [`BlockingOracle`] for `config`.
///
/// # Errors
/// Provider selection or runtime start-up errors.
pub fn oracle_from_config(config: &LlmConfig) -> Result<BlockingOracle, LlmError> {
    let provider = provider_from_config(config)?;
    info!(provider = %config.provider, model = %config.model, "LLM oracle configured");
    let client = LlmClient::new(provider, config.model.clone(), config.max_retries);
    BlockingOracle::new(client, request_settings(config))
}

/// Prompt templates: overrides from `config.prompt_dir` if set, otherwise the
/// built-in set.
///
/// # Errors
/// Errors from [`PromptEngine::from_directory`].
pub fn prompts_from_config(config: &LlmConfig) -> Result<PromptEngine, LlmError> {
    match &config.prompt_dir {
        Some(dir) => PromptEngine::from_directory(dir),
        None => Ok(PromptEngine::builtin()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psyche_llm::Oracle;

    #[test]
    fn none_and_ollama_need_no_key() {
        let mut config = LlmConfig {
            provider: "none".into(),
            ..LlmConfig::default()
        };
        assert!(matches!(provider_from_config(&config), Ok(LlmProvider::None)));

        config.provider = "ollama".into();
        config.base_url = "http://localhost:11434".into();
        match provider_from_config(&config) {
            Ok(LlmProvider::Ollama { base_url }) => assert_eq!(base_url, "http://localhost:11434"),
            other => panic!("expected Ollama, got {other:?}"),
        }
    }

    #[test]
    fn openai_without_key_is_config_error() {
        let config = LlmConfig {
            api_key_env: "PSYCHE_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..LlmConfig::default()
        };
        assert!(matches!(
            provider_from_config(&config),
            Err(LlmError::ConfigError(_))
        ));
    }

    #[test]
    fn unknown_provider_is_config_error() {
        let config = LlmConfig {
            provider: "carrier-pigeon".into(),
            ..LlmConfig::default()
        };
        assert!(matches!(
            provider_from_config(&config),
            Err(LlmError::ConfigError(_))
        ));
    }

    #[test]
    fn none_oracle_fails_every_prompt() {
        let config = LlmConfig {
            provider: "none".into(),
            max_tokens: 64,
            ..LlmConfig::default()
        };
        assert_eq!(request_settings(&config).max_tokens, 64);
        let mut oracle = oracle_from_config(&config).expect("oracle");
        assert!(matches!(oracle.prompt("hi"), Err(LlmError::Unavailable(_))));
    }

    #[test]
    fn prompts_default_to_builtin() {
        let engine = prompts_from_config(&LlmConfig::default()).expect("prompts");
        assert!(engine.get(psyche_llm::PromptId::Response).is_some());
    }
}
