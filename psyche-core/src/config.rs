//! Configuration for the PSYCHE NPC core.
//!
//! Maps directly to `psyche.toml`:
//!
//! ```toml
//! [general]
//! log_level = "debug"
//!
//! [emotions]
//! conscious_threshold = 50
//! [[emotions.catalog]]
//! name = "joy"
//! range = { min = 10, max = 30 }
//!
//! [dialogue]
//! memory_capacity = 20
//! personality = { traits = ["Brave"], description = "A gruff ranger" }
//!
//! [llm]
//! provider = "ollama"
//! base_url = "http://localhost:11434"
//! model = "qwen2.5:1.5b"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::emotion::{CatalogEntry, DEFAULT_EMOTIONS, EmotionCatalog};
use crate::error::{PsycheError, Result};
use crate::personality::Personality;

/// Top-level PSYCHE configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PsycheConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Emotion catalog and thresholds.
    #[serde(default)]
    pub emotions: EmotionConfig,
    /// Conversation settings.
    #[serde(default)]
    pub dialogue: DialogueConfig,
    /// LLM oracle settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

impl PsycheConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `PsycheError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| PsycheError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Check cross-field constraints serde cannot express.
    ///
    /// # Errors
    /// Returns `PsycheError::Config` for a zero memory capacity, an empty
    /// catalog or an unknown provider, and `PsycheError::InvalidRange` for an
    /// inverted catalog range.
    pub fn validate(&self) -> Result<()> {
        if self.dialogue.memory_capacity == 0 {
            return Err(PsycheError::Config(
                "dialogue.memory_capacity must be at least 1".into(),
            ));
        }
        if self.emotions.catalog.is_empty() {
            return Err(PsycheError::Config("emotions.catalog is empty".into()));
        }
        if !matches!(self.llm.provider.as_str(), "ollama" | "openai" | "none") {
            return Err(PsycheError::Config(format!(
                "unknown llm.provider '{}' (expected ollama, openai or none)",
                self.llm.provider
            )));
        }
        self.emotions.catalog().validate()
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error. `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub log_json: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Emotion catalog and conscious-threshold configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionConfig {
    /// Minimum intensity for an emotion to be "consciously felt".
    #[serde(default = "default_50")]
    pub conscious_threshold: i32,
    /// Catalog members and their starting ranges.
    #[serde(default = "default_catalog")]
    pub catalog: Vec<CatalogEntry>,
}

impl EmotionConfig {
    /// The catalog as a description a registry can be built from.
    #[must_use]
    pub fn catalog(&self) -> EmotionCatalog {
        EmotionCatalog {
            emotions: self.catalog.clone(),
        }
    }
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            conscious_threshold: 50,
            catalog: default_catalog(),
        }
    }
}

/// Conversation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Maximum records kept in conversation memory.
    #[serde(default = "default_20_usize")]
    pub memory_capacity: usize,
    /// Speaker label for incoming lines.
    #[serde(default = "default_other")]
    pub other_speaker: String,
    /// Speaker label for the NPC's own lines.
    #[serde(default = "default_me")]
    pub self_speaker: String,
    /// The NPC's personality.
    #[serde(default)]
    pub personality: Personality,
    /// Optional path to a decision-machine description.
    #[serde(default)]
    pub machine_path: Option<PathBuf>,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            memory_capacity: 20,
            other_speaker: default_other(),
            self_speaker: default_me(),
            personality: Personality::default(),
            machine_path: None,
        }
    }
}

/// LLM oracle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider: "openai", "ollama", "none".
    #[serde(default = "default_openai")]
    pub provider: String,
    /// Base URL for the LLM API.
    #[serde(default = "default_openai_url")]
    pub base_url: String,
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Maximum tokens per completion.
    #[serde(default = "default_1024")]
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(default = "default_0_7")]
    pub temperature: f32,
    /// Hard timeout for any LLM call in milliseconds.
    #[serde(default = "default_30000")]
    pub request_timeout_ms: u64,
    /// Retries after the first failed attempt.
    #[serde(default)]
    pub max_retries: u32,
    /// Directory of TOML prompt overrides.
    #[serde(default)]
    pub prompt_dir: Option<PathBuf>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_openai(),
            base_url: default_openai_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_tokens: 1024,
            temperature: 0.7,
            request_timeout_ms: 30_000,
            max_retries: 0,
            prompt_dir: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_log_level() -> String { "info".to_string() }
fn default_other() -> String { "Other".to_string() }
fn default_me() -> String { "Me".to_string() }
fn default_openai() -> String { "openai".to_string() }
fn default_openai_url() -> String { "https://api.openai.com".to_string() }
fn default_model() -> String { "gpt-4o-mini".to_string() }
fn default_api_key_env() -> String { "OPENAI_KEY".to_string() }
fn default_catalog() -> Vec<CatalogEntry> {
    DEFAULT_EMOTIONS
        .iter()
        .map(|name| CatalogEntry { name: (*name).to_string(), range: None })
        .collect()
}
fn default_0_7() -> f32 { 0.7 }
fn default_20_usize() -> usize { 20 }
fn default_50() -> i32 { 50 }
fn default_1024() -> u32 { 1024 }
fn default_30000() -> u64 { 30_000 }

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
