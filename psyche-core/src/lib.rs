//! # PSYCHE Core Library
//!
//! Game-agnostic affective core for NPCs. Every character gets:
//!
//! - an [`EmotionRegistry`] — "How I feel": named intensities kept ranked,
//!   with threshold queries and textual delta updates;
//! - a [`DecisionStateMachine`] — "What I'm doing": named states whose edges
//!   are guarded by [`ConditionTree`]s over the registry's intensities;
//! - a [`ConversationMemory`] — "What was said": a bounded FIFO log;
//! - a [`Personality`] — "Who I am".
//!
//! Everything here is synchronous and single-owner. The dialogue loop that
//! ties these to an LLM lives in `psyche-npc`.
//!
//! ## Performance Contract
//!
//! - `EmotionRegistry::set`: O(distance moved in the ranking)
//! - `EmotionRegistry::threshold`: O(log n) search + O(k) copy
//! - `ConditionTree::evaluate`: one pass, no parsing

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod condition;
pub mod config;
pub mod emotion;
pub mod error;
pub mod machine;
pub mod memory;
pub mod personality;
pub mod types;

pub use condition::{ConditionNode, ConditionTree};
pub use config::PsycheConfig;
pub use emotion::{EmotionCatalog, EmotionRegistry};
pub use error::PsycheError;
pub use machine::{DecisionStateMachine, MachineDescription, State};
pub use memory::ConversationMemory;
pub use personality::{Personality, Trait};
pub use types::*;
