//! Dialogue orchestration: one utterance in, one reply out.
//!
//! ## Turn pipeline
//!
//! ```text
//!  utterance
//!     │ 1. memory ← Other:"utterance"
//!     ▼
//!  EMOTION_DELTA ──oracle──► "more heightened fear, ..." ──► apply_deltas
//!     │
//!     ▼ 3. legal_transitions(facts)
//!  TRANSITION_CHOICE ──oracle──► "flee" | "Nothing" | junk ──► transition_to?
//!     │
//!     ▼ 4.
//!  RESPONSE ──oracle──► reply
//!     │ 5. memory ← Me:"reply"
//!     ▼
//!  reply
//! ```
//!
//! Oracle failures abort the turn with
//! [`DialogueError::OracleUnavailable`](crate::DialogueError::OracleUnavailable).
//! Malformed delta fragments and option replies that name no legal option
//! are tolerated: they change nothing.

use tracing::{debug, info, info_span};

use psyche_core::types::Adjective;
use psyche_llm::oracle::Oracle;
use psyche_llm::prompt::{self, PromptEngine, PromptId};

use crate::error::Result;
use crate::npc::Npc;

/// Drives conversation turns for one NPC against one oracle.
pub struct DialogueOrchestrator<O: Oracle> {
    npc: Npc,
    oracle: O,
    prompts: PromptEngine,
}

impl<O: Oracle> DialogueOrchestrator<O> {
    /// Pair `npc` with `oracle`, using the built-in prompt templates.
    pub fn new(npc: Npc, oracle: O) -> Self {
        Self {
            npc,
            oracle,
            prompts: PromptEngine::builtin(),
        }
    }

    /// Use `prompts` instead of the built-in templates.
    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptEngine) -> Self {
        self.prompts = prompts;
        self
    }

    /// The NPC being driven.
    pub fn npc(&self) -> &Npc {
        &self.npc
    }

    /// Mutable access to the NPC between turns.
    pub fn npc_mut(&mut self) -> &mut Npc {
        &mut self.npc
    }

    /// Take the NPC and oracle back.
    pub fn into_parts(self) -> (Npc, O) {
        (self.npc, self.oracle)
    }

    /// Run one full turn and return the NPC's reply.
    ///
    /// # Errors
    /// `OracleUnavailable` if any oracle call fails, `Core` if a guard reads
    /// a fact the registry lacks.
    pub fn turn(&mut self, utterance: &str) -> Result<String> {
        let span = info_span!("turn", npc = %self.npc.id(), state = self.npc.state());
        let _enter = span.enter();

        self.npc.hear(utterance);
        self.update_emotions()?;
        self.choose_transition()?;
        let reply = self.respond()?;
        self.npc.say(&reply);

        info!(state = self.npc.state(), reply_len = reply.len(), "Turn complete");
        Ok(reply)
    }

    fn update_emotions(&mut self) -> Result<()> {
        let emotions = self.npc.registry().names().join(", ");
        let adjectives = Adjective::ALL
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let personality = self.npc.personality().describe();
        let conversation = self.npc.memory().log();

        let query = self.prompts.render(
            PromptId::EmotionDelta,
            &[
                ("personality", personality.as_str()),
                ("conversation", conversation.as_str()),
                ("emotions", emotions.as_str()),
                ("adjectives", adjectives.as_str()),
            ],
        );
        let raw = self.oracle.prompt(&query)?;
        let normalized = normalize_deltas(&raw);
        let applied = self.npc.registry_mut().apply_deltas(&normalized);
        debug!(reply = %normalized, applied, "Applied emotion deltas");
        Ok(())
    }

    fn choose_transition(&mut self) -> Result<()> {
        let facts = self.npc.registry().facts();
        let targets: Vec<String> = self
            .npc
            .machine()
            .legal_transitions(&facts)?
            .iter()
            .map(|state| state.name().to_string())
            .collect();

        let state = self.npc.state().to_string();
        let feelings = self.npc.describe_feelings();
        let conversation = self.npc.memory().log();
        let options = prompt::render_options(&targets);
        let query = self.prompts.render(
            PromptId::TransitionChoice,
            &[
                ("state", state.as_str()),
                ("feelings", feelings.as_str()),
                ("conversation", conversation.as_str()),
                ("options", options.as_str()),
            ],
        );
        let raw = self.oracle.prompt(&query)?;
        let choice = strip_quotes(raw.trim());

        if choice == prompt::NOTHING {
            debug!(options = %options, "Chose to stay");
        } else if targets.iter().any(|t| t == choice) {
            self.npc.machine_mut().transition_to(choice)?;
            info!(from = %state, to = choice, "Transitioned");
        } else {
            debug!(reply = choice, options = %options, "Option reply matched nothing; staying");
        }
        Ok(())
    }

    fn respond(&mut self) -> Result<String> {
        let personality = self.npc.personality().describe();
        let state = self.npc.state().to_string();
        let feelings = self.npc.describe_feelings();
        let conversation = self.npc.memory().log();

        let query = self.prompts.render(
            PromptId::Response,
            &[
                ("personality", personality.as_str()),
                ("state", state.as_str()),
                ("feelings", feelings.as_str()),
                ("conversation", conversation.as_str()),
            ],
        );
        let raw = self.oracle.prompt(&query)?;
        Ok(strip_quotes(raw.trim()).to_string())
    }
}

// ---------------------------------------------------------------------------
// Reply normalization
// ---------------------------------------------------------------------------

/// Tidy an emotion-delta reply: trim, collapse `", "` to `","`, drop trailing
/// punctuation.
#[must_use]
pub fn normalize_deltas(raw: &str) -> String {
    raw.trim()
        .replace(", ", ",")
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .to_string()
}

/// Remove one layer of matching surrounding quotes (`"` or `'`).
#[must_use]
pub fn strip_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_noise() {
        assert_eq!(
            normalize_deltas("  more heightened joy, less serene fear.\n"),
            "more heightened joy,less serene fear"
        );
        assert_eq!(normalize_deltas("more serene joy!!"), "more serene joy");
        assert_eq!(normalize_deltas(""), "");
    }

    #[test]
    fn strip_quotes_removes_one_layer() {
        assert_eq!(strip_quotes("\"flee\""), "flee");
        assert_eq!(strip_quotes("'flee'"), "flee");
        assert_eq!(strip_quotes("\"\"flee\"\""), "\"flee\"");
        assert_eq!(strip_quotes("\"flee"), "\"flee");
        assert_eq!(strip_quotes("flee"), "flee");
        assert_eq!(strip_quotes("\""), "\"");
    }
}
