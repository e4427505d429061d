//! Personality — the fixed character sheet fed into response prompts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single personality trait.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trait {
    Brave,
    Cautious,
    Optimistic,
    Pessimistic,
    Confident,
    Insecure,
    Loyal,
    Betraying,
    Adventurous,
    Timid,
    Wise,
    Foolish,
    Charismatic,
    Shy,
    Rebellious,
    Obedient,
    Ambitious,
    Content,
    Compassionate,
    ColdHearted,
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Self::Brave => "brave",
            Self::Cautious => "cautious",
            Self::Optimistic => "optimistic",
            Self::Pessimistic => "pessimistic",
            Self::Confident => "confident",
            Self::Insecure => "insecure",
            Self::Loyal => "loyal",
            Self::Betraying => "betraying",
            Self::Adventurous => "adventurous",
            Self::Timid => "timid",
            Self::Wise => "wise",
            Self::Foolish => "foolish",
            Self::Charismatic => "charismatic",
            Self::Shy => "shy",
            Self::Rebellious => "rebellious",
            Self::Obedient => "obedient",
            Self::Ambitious => "ambitious",
            Self::Content => "content",
            Self::Compassionate => "compassionate",
            Self::ColdHearted => "cold-hearted",
        };
        f.write_str(word)
    }
}

/// Traits plus a free-text description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    /// Trait list.
    #[serde(default)]
    pub traits: Vec<Trait>,
    /// Free-text description; preferred over the trait list when non-empty.
    #[serde(default)]
    pub description: String,
}

impl Personality {
    /// Description used when neither traits nor a description are set.
    pub const UNDESCRIBED: &'static str = "a character";

    /// Create a personality.
    #[must_use]
    pub fn new(traits: Vec<Trait>, description: impl Into<String>) -> Self {
        Self {
            traits,
            description: description.into(),
        }
    }

    /// Text used in prompts: the description, or the traits joined with
    /// commas when the description is blank, or [`Self::UNDESCRIBED`] when
    /// both are empty.
    #[must_use]
    pub fn describe(&self) -> String {
        let description = self.description.trim();
        if !description.is_empty() {
            return description.to_string();
        }
        if self.traits.is_empty() {
            return Self::UNDESCRIBED.to_string();
        }
        self.traits
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_wins_over_traits() {
        let p = Personality::new(vec![Trait::Brave], "A gruff old ranger");
        assert_eq!(p.describe(), "A gruff old ranger");
    }

    #[test]
    fn blank_description_falls_back_to_traits() {
        let p = Personality::new(vec![Trait::Shy, Trait::ColdHearted], "  ");
        assert_eq!(p.describe(), "shy, cold-hearted");
    }

    #[test]
    fn empty_personality_is_never_blank() {
        assert_eq!(Personality::default().describe(), "a character");
        assert_eq!(Personality::new(vec![], " \n").describe(), "a character");
    }

    #[test]
    fn traits_deserialize_by_variant_name() {
        let p: Personality =
            toml::from_str("traits = [\"Wise\", \"Loyal\"]").expect("parse");
        assert_eq!(p.traits, vec![Trait::Wise, Trait::Loyal]);
        assert!(p.description.is_empty());
    }
}
