//! # psyche-npc — NPC Dialogue for PSYCHE
//!
//! Ties the synchronous affective core (`psyche-core`) to an LLM oracle
//! (`psyche-llm`) and runs conversation turns.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            DialogueOrchestrator<O>           │
//! │  ┌──────────────────────┐   ┌─────────────┐  │
//! │  │         Npc          │   │  O: Oracle  │  │
//! │  │  registry · machine  │   └──────┬──────┘  │
//! │  │  memory · personality│          │         │
//! │  └──────────┬───────────┘          │         │
//! │             ▼                      ▼         │
//! │        psyche-core             psyche-llm    │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `npc` — the per-character aggregate
//! - `dialogue` — the five-step turn pipeline
//! - `config` — `[llm]` section → oracle and prompt templates
//! - `telemetry` — tracing subscriber setup
//! - `error` — `DialogueError`

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dialogue;
pub mod error;
pub mod npc;
pub mod telemetry;

pub use dialogue::DialogueOrchestrator;
pub use error::DialogueError;
pub use npc::{Npc, NpcSnapshot};
