//! # psyche-llm — LLM Oracle Layer for PSYCHE
//!
//! Everything an NPC says or decides beyond its rule-based core goes through
//! one narrow boundary, the [`Oracle`]: a prompt goes in, text comes out.
//!
//! Backends behind [`LlmClient`]:
//!   - **Ollama** (local)
//!   - **OpenAI-compatible API**
//!   - **None** (every call fails with `Unavailable`)
//!
//! # Architecture
//!
//! ```text
//!  DialogueOrchestrator ──prompt()──► Oracle
//!                                      ├─ closure / test stub
//!                                      └─ BlockingOracle ──block_on──► LlmClient ──HTTP──► backend
//! ```

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod oracle;
pub mod prompt;
pub mod types;

pub use client::{LlmClient, LlmProvider};
pub use error::LlmError;
pub use oracle::{BlockingOracle, Oracle, RequestSettings};
pub use prompt::{PromptEngine, PromptId};
pub use types::{LlmRequest, LlmResponse};
