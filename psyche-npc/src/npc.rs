//! The NPC aggregate: one character's feelings, decisions and conversation.
//!
//! ```text
//! ┌──────────────────────── Npc ────────────────────────┐
//! │  EmotionRegistry ──facts()──► DecisionStateMachine  │
//! │  ConversationMemory            Personality          │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Each NPC exclusively owns its parts; nothing is shared between instances.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use psyche_core::config::{DialogueConfig, PsycheConfig};
use psyche_core::error::Result;
use psyche_core::{
    ConversationMemory, DecisionStateMachine, Emotion, EmotionRegistry, MachineDescription, NpcId,
    Personality,
};

/// Everything a single NPC knows about itself.
#[derive(Debug, Clone)]
pub struct Npc {
    id: NpcId,
    registry: EmotionRegistry,
    machine: DecisionStateMachine,
    memory: ConversationMemory,
    personality: Personality,
    conscious_threshold: i32,
    other_speaker: String,
    self_speaker: String,
}

impl Npc {
    /// Assemble an NPC from already-built parts, with default dialogue
    /// settings.
    #[must_use]
    pub fn new(registry: EmotionRegistry, machine: DecisionStateMachine) -> Self {
        let dialogue = DialogueConfig::default();
        let npc = Self {
            id: NpcId::new(),
            registry,
            machine,
            memory: ConversationMemory::new(dialogue.memory_capacity),
            personality: dialogue.personality,
            conscious_threshold: 50,
            other_speaker: dialogue.other_speaker,
            self_speaker: dialogue.self_speaker,
        };
        npc.warn_uncovered_facts();
        npc
    }

    /// Build an NPC from configuration and a machine description, sampling
    /// starting intensities from the catalog ranges.
    ///
    /// # Errors
    /// Any catalog or machine construction error.
    pub fn from_config<R: Rng>(
        config: &PsycheConfig,
        machine: &MachineDescription,
        rng: &mut R,
    ) -> Result<Self> {
        let registry = EmotionRegistry::from_catalog(&config.emotions.catalog(), rng)?;
        let machine = DecisionStateMachine::build(machine)?;
        let dialogue = &config.dialogue;

        let npc = Self {
            id: NpcId::new(),
            registry,
            machine,
            memory: ConversationMemory::new(dialogue.memory_capacity),
            personality: dialogue.personality.clone(),
            conscious_threshold: config.emotions.conscious_threshold,
            other_speaker: dialogue.other_speaker.clone(),
            self_speaker: dialogue.self_speaker.clone(),
        };
        debug!(
            npc = %npc.id,
            emotions = npc.registry.len(),
            states = npc.machine.len(),
            initial = npc.machine.current().name(),
            "NPC built"
        );
        npc.warn_uncovered_facts();
        Ok(npc)
    }

    /// Replace the personality.
    #[must_use]
    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = personality;
        self
    }

    /// Replace the conversation memory with an empty one of `capacity`.
    #[must_use]
    pub fn with_memory_capacity(mut self, capacity: usize) -> Self {
        self.memory = ConversationMemory::new(capacity);
        self
    }

    /// Set the conscious-emotion threshold.
    #[must_use]
    pub fn with_conscious_threshold(mut self, threshold: i32) -> Self {
        self.conscious_threshold = threshold;
        self
    }

    /// Set the speaker labels for incoming and own lines.
    #[must_use]
    pub fn with_speakers(mut self, other: impl Into<String>, me: impl Into<String>) -> Self {
        self.other_speaker = other.into();
        self.self_speaker = me.into();
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Instance id.
    #[must_use]
    pub fn id(&self) -> NpcId {
        self.id
    }

    /// Emotion registry.
    #[must_use]
    pub fn registry(&self) -> &EmotionRegistry {
        &self.registry
    }

    /// Mutable emotion registry.
    pub fn registry_mut(&mut self) -> &mut EmotionRegistry {
        &mut self.registry
    }

    /// Decision state machine.
    #[must_use]
    pub fn machine(&self) -> &DecisionStateMachine {
        &self.machine
    }

    /// Mutable decision state machine.
    pub fn machine_mut(&mut self) -> &mut DecisionStateMachine {
        &mut self.machine
    }

    /// Conversation log.
    #[must_use]
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Personality.
    #[must_use]
    pub fn personality(&self) -> &Personality {
        &self.personality
    }

    /// Name of the current decision state.
    #[must_use]
    pub fn state(&self) -> &str {
        self.machine.current().name()
    }

    /// Conscious-emotion threshold.
    #[must_use]
    pub fn conscious_threshold(&self) -> i32 {
        self.conscious_threshold
    }

    // -----------------------------------------------------------------------
    // Conversation
    // -----------------------------------------------------------------------

    /// Record an incoming line under the other speaker's label.
    pub fn hear(&mut self, utterance: &str) {
        self.memory.record(&self.other_speaker, utterance);
    }

    /// Record one of the NPC's own lines.
    pub fn say(&mut self, utterance: &str) {
        self.memory.record(&self.self_speaker, utterance);
    }

    /// Emotions at or above the conscious threshold, strongest first.
    #[must_use]
    pub fn conscious_emotions(&self) -> Vec<Emotion> {
        let mut emotions = self.registry.threshold(self.conscious_threshold);
        emotions.reverse();
        emotions
    }

    /// Conscious emotions as `"<adjective> <name>"`, comma-separated.
    #[must_use]
    pub fn describe_feelings(&self) -> String {
        self.conscious_emotions()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Serializable view of the NPC's current state.
    #[must_use]
    pub fn snapshot(&self) -> NpcSnapshot {
        NpcSnapshot {
            id: self.id,
            state: self.state().to_string(),
            emotions: self
                .registry
                .names()
                .into_iter()
                .filter_map(|name| self.registry.get(name).ok())
                .map(|e| (e.name().to_string(), e.intensity))
                .collect(),
            conscious: self.describe_feelings(),
            memory: self.memory.iter().map(str::to_string).collect(),
        }
    }

    fn warn_uncovered_facts(&self) {
        let names = self.registry.names();
        for key in self.machine.referenced_facts() {
            if !names.contains(&key) {
                warn!(
                    npc = %self.id,
                    fact = key,
                    "Machine guard reads a fact outside the emotion catalog"
                );
            }
        }
    }
}

/// Point-in-time view of an [`Npc`] for display and logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NpcSnapshot {
    /// Instance id.
    pub id: NpcId,
    /// Current decision state.
    pub state: String,
    /// `(name, intensity)` in catalog order.
    pub emotions: Vec<(String, i32)>,
    /// Rendered conscious emotions.
    pub conscious: String,
    /// Conversation records, oldest first.
    pub memory: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
