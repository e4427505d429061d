//! Core type definitions shared across the PSYCHE crates.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Unique identifier for an NPC instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NpcId(pub Uuid);

impl NpcId {
    /// Create a new random NPC ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NpcId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Facts
// ---------------------------------------------------------------------------

/// Name → integer snapshot that condition trees are evaluated against.
pub type Facts = HashMap<String, i32>;

// ---------------------------------------------------------------------------
// Emotion
// ---------------------------------------------------------------------------

/// A named emotion with an integer intensity.
///
/// Intensity is nominally `[0, 100]` but is never clamped here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emotion {
    name: String,
    /// Current intensity.
    pub intensity: i32,
}

impl Emotion {
    /// Create a new emotion.
    #[must_use]
    pub fn new(name: impl Into<String>, intensity: i32) -> Self {
        Self {
            name: name.into(),
            intensity,
        }
    }

    /// The emotion's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The adjective describing the current intensity.
    #[must_use]
    pub fn adjective(&self) -> Adjective {
        Adjective::for_intensity(self.intensity)
    }
}

/// Renders as `<adjective> <name>`, e.g. `heightened fear`.
impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.adjective(), self.name)
    }
}

// ---------------------------------------------------------------------------
// Intensity adjectives
// ---------------------------------------------------------------------------

/// Five intensity buckets, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Adjective {
    /// Intensity below 20.
    Serene,
    /// Intensity in `[20, 40)`.
    Moderate,
    /// Intensity in `[40, 60)`.
    Subdued,
    /// Intensity in `[60, 80)`.
    Heightened,
    /// Intensity of 80 or more.
    Overwhelm,
}

impl Adjective {
    /// All adjectives in ascending order of strength.
    pub const ALL: [Adjective; 5] = [
        Self::Serene,
        Self::Moderate,
        Self::Subdued,
        Self::Heightened,
        Self::Overwhelm,
    ];

    /// Bucket an intensity. Upper edges are exclusive, so 20 is `Moderate`.
    #[must_use]
    pub fn for_intensity(intensity: i32) -> Self {
        if intensity < 20 {
            Self::Serene
        } else if intensity < 40 {
            Self::Moderate
        } else if intensity < 60 {
            Self::Subdued
        } else if intensity < 80 {
            Self::Heightened
        } else {
            Self::Overwhelm
        }
    }

    /// Delta magnitude this adjective carries in a mutation fragment.
    #[must_use]
    pub fn magnitude(self) -> i32 {
        match self {
            Self::Serene => 1,
            Self::Moderate => 2,
            Self::Subdued => 4,
            Self::Heightened => 8,
            Self::Overwhelm => 16,
        }
    }

    /// Lower-case word form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Serene => "serene",
            Self::Moderate => "moderate",
            Self::Subdued => "subdued",
            Self::Heightened => "heightened",
            Self::Overwhelm => "overwhelm",
        }
    }
}

impl fmt::Display for Adjective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Adjective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "serene" => Ok(Self::Serene),
            "moderate" => Ok(Self::Moderate),
            "subdued" => Ok(Self::Subdued),
            "heightened" => Ok(Self::Heightened),
            "overwhelm" => Ok(Self::Overwhelm),
            _ => Err(format!("unknown adjective: '{s}'")),
        }
    }
}

/// A signed intensity change parsed from a mutation fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionDelta {
    /// Target emotion name (lower-cased).
    pub emotion: String,
    /// Signed change.
    pub delta: i32,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjective_bucket_edges_are_exclusive() {
        assert_eq!(Adjective::for_intensity(19), Adjective::Serene);
        assert_eq!(Adjective::for_intensity(20), Adjective::Moderate);
        assert_eq!(Adjective::for_intensity(39), Adjective::Moderate);
        assert_eq!(Adjective::for_intensity(40), Adjective::Subdued);
        assert_eq!(Adjective::for_intensity(60), Adjective::Heightened);
        assert_eq!(Adjective::for_intensity(79), Adjective::Heightened);
        assert_eq!(Adjective::for_intensity(80), Adjective::Overwhelm);
        assert_eq!(Adjective::for_intensity(250), Adjective::Overwhelm);
        assert_eq!(Adjective::for_intensity(-5), Adjective::Serene);
    }

    #[test]
    fn adjective_magnitudes_double() {
        let mags: Vec<i32> = Adjective::ALL.iter().map(|a| a.magnitude()).collect();
        assert_eq!(mags, vec![1, 2, 4, 8, 16]);
    }

    #[test]
    fn adjective_parses_word_form() {
        for adj in Adjective::ALL {
            assert_eq!(adj.as_str().parse::<Adjective>(), Ok(adj));
        }
        assert!("happy".parse::<Adjective>().is_err());
    }

    #[test]
    fn emotion_display_uses_adjective() {
        assert_eq!(Emotion::new("fear", 65).to_string(), "heightened fear");
        assert_eq!(Emotion::new("joy", 0).to_string(), "serene joy");
    }
}
