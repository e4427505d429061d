//! Decision state machine — "What am I doing about it".
//!
//! A directed graph of named states whose outgoing edges are guarded by
//! [`ConditionTree`]s. The machine reports which edges are currently legal;
//! choosing among them is the caller's job. Cycles, self-loops and several
//! simultaneously legal edges are all allowed.
//!
//! Descriptions are plain data (JSON or TOML):
//!
//! ```json
//! { "states": [
//!     { "name": "calm",
//!       "transitions": [
//!         { "target": "afraid", "condition": { "type": ">", "key": "fear", "value": 60 } },
//!         { "target": "calm" } ] },
//!     { "name": "afraid", "transitions": [] } ] }
//! ```
//!
//! The first declared state is the initial state.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::condition::{ConditionNode, ConditionTree};
use crate::error::{PsycheError, Result};
use crate::types::Facts;

// ---------------------------------------------------------------------------
// Description
// ---------------------------------------------------------------------------

/// One outgoing edge in a machine description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDescription {
    /// Name of the target state.
    #[serde(alias = "name")]
    pub target: String,
    /// Guard; an absent guard always holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionNode>,
}

/// One state in a machine description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDescription {
    /// Unique state name.
    pub name: String,
    /// Outgoing edges in evaluation order.
    #[serde(default, alias = "next_states")]
    pub transitions: Vec<TransitionDescription>,
}

/// Declarative form of a [`DecisionStateMachine`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineDescription {
    /// States in declaration order; the first is initial.
    pub states: Vec<StateDescription>,
}

impl MachineDescription {
    /// Parse a description from a JSON string.
    ///
    /// # Errors
    /// Returns [`PsycheError::Serialization`] if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PsycheError::Serialization(e.to_string()))
    }

    /// Parse a description from a TOML string.
    ///
    /// # Errors
    /// Returns [`PsycheError::Serialization`] if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| PsycheError::Serialization(e.to_string()))
    }

    /// Load a description from disk. `.toml` files are parsed as TOML,
    /// anything else as JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "toml") {
            Self::from_toml(&content)
        } else {
            Self::from_json(&content)
        }
    }
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// A named state and its guarded outgoing edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    name: String,
    outgoing: Vec<(String, ConditionTree)>,
}

impl State {
    /// The state's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Outgoing `(target, guard)` pairs in declaration order.
    #[must_use]
    pub fn outgoing(&self) -> &[(String, ConditionTree)] {
        &self.outgoing
    }
}

/// Directed graph of states with a single current position.
#[derive(Debug, Clone)]
pub struct DecisionStateMachine {
    states: HashMap<String, State>,
    /// Declaration order.
    order: Vec<String>,
    /// Always a key of `states`.
    current: String,
}

impl DecisionStateMachine {
    /// Build a machine from a description. The first declared state becomes
    /// current.
    ///
    /// # Errors
    /// [`PsycheError::EmptyMachine`] for no states,
    /// [`PsycheError::DuplicateState`] for a repeated name,
    /// [`PsycheError::DanglingTransition`] for an undeclared target, or any
    /// [`ConditionTree::build`] error.
    pub fn build(description: &MachineDescription) -> Result<Self> {
        let Some(first) = description.states.first() else {
            return Err(PsycheError::EmptyMachine);
        };

        let mut states = HashMap::with_capacity(description.states.len());
        let mut order = Vec::with_capacity(description.states.len());
        for state in &description.states {
            if states.contains_key(&state.name) {
                return Err(PsycheError::DuplicateState(state.name.clone()));
            }
            let outgoing = state
                .transitions
                .iter()
                .map(|t| -> Result<(String, ConditionTree)> {
                    Ok((t.target.clone(), ConditionTree::build_optional(t.condition.as_ref())?))
                })
                .collect::<Result<Vec<_>>>()?;
            order.push(state.name.clone());
            states.insert(
                state.name.clone(),
                State {
                    name: state.name.clone(),
                    outgoing,
                },
            );
        }

        for name in &order {
            for (target, _) in &states[name].outgoing {
                if !states.contains_key(target) {
                    return Err(PsycheError::DanglingTransition {
                        from: name.clone(),
                        to: target.clone(),
                    });
                }
            }
        }

        debug!(
            states = order.len(),
            initial = %first.name,
            "Decision machine built"
        );

        Ok(Self {
            states,
            order,
            current: first.name.clone(),
        })
    }

    /// Parse and build from a JSON string.
    ///
    /// # Errors
    /// Parse errors or any [`Self::build`] error.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::build(&MachineDescription::from_json(json)?)
    }

    /// Load and build from a description file.
    ///
    /// # Errors
    /// I/O, parse, or any [`Self::build`] error.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::build(&MachineDescription::from_file(path)?)
    }

    /// The current state.
    #[must_use]
    pub fn current(&self) -> &State {
        &self.states[&self.current]
    }

    /// Targets of the current state's edges whose guards hold, in edge order.
    ///
    /// An empty result means no move is legal this turn.
    ///
    /// # Errors
    /// [`PsycheError::MissingFact`] if a guard reads a fact absent from
    /// `facts`.
    pub fn legal_transitions(&self, facts: &Facts) -> Result<Vec<&State>> {
        let mut legal = Vec::new();
        for (target, guard) in &self.current().outgoing {
            if guard.evaluate(facts)? {
                legal.push(&self.states[target]);
            }
        }
        Ok(legal)
    }

    /// Move to `name` unconditionally. Legality against
    /// [`Self::legal_transitions`] is not re-checked.
    ///
    /// # Errors
    /// [`PsycheError::UnknownState`] if `name` is undeclared; `current` is
    /// left unchanged.
    pub fn transition_to(&mut self, name: &str) -> Result<()> {
        if !self.states.contains_key(name) {
            return Err(PsycheError::UnknownState(name.to_string()));
        }
        debug!(from = %self.current, to = name, "State transition");
        self.current = name.to_string();
        Ok(())
    }

    /// Look up a state by name.
    #[must_use]
    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.get(name)
    }

    /// State names in declaration order.
    #[must_use]
    pub fn state_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Every fact name read by any guard, deduplicated, in declaration order.
    #[must_use]
    pub fn referenced_facts(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for name in &self.order {
            for (_, guard) in &self.states[name].outgoing {
                for key in guard.keys() {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
            }
        }
        keys
    }

    /// Number of states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always `false`: construction rejects empty descriptions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
