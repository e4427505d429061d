//! Emotion registry — "How I feel right now".
//!
//! The registry tracks a fixed catalog of named emotions and keeps two views
//! of them in lockstep:
//!
//! - **by name** — constant-time lookup of any catalog member,
//! - **by rank** — every emotion ordered by ascending intensity, ties broken
//!   by catalog order.
//!
//! Oracle replies usually nudge one emotion by a small amount, so [`set`]
//! repositions the touched entry with an insertion-style walk instead of
//! re-sorting. Cost is proportional to the distance moved.
//!
//! ```text
//! rank:   0        1        2        3
//!       [joy:0] [fear:5] [anger:9] [love:40]
//!                   set(fear, 12)  ──▶
//!       [joy:0] [anger:9] [fear:12] [love:40]
//! ```
//!
//! [`set`]: EmotionRegistry::set

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::error::{PsycheError, Result};
use crate::types::{Adjective, Emotion, EmotionDelta, Facts};

/// The default catalog, in definition order.
pub const DEFAULT_EMOTIONS: [&str; 10] = [
    "joy",
    "sadness",
    "anger",
    "fear",
    "surprise",
    "disgust",
    "love",
    "excitement",
    "guilt",
    "jealousy",
];

// ---------------------------------------------------------------------------
// Catalog description
// ---------------------------------------------------------------------------

/// Inclusive range a starting intensity is sampled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntensityRange {
    /// Lower bound (inclusive).
    pub min: i32,
    /// Upper bound (inclusive).
    pub max: i32,
}

/// One catalog member and its optional starting range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Emotion name.
    pub name: String,
    /// Starting intensity range; intensity starts at 0 when absent.
    #[serde(default)]
    pub range: Option<IntensityRange>,
}

impl CatalogEntry {
    /// Entry with a fixed starting range.
    #[must_use]
    pub fn ranged(name: impl Into<String>, min: i32, max: i32) -> Self {
        Self {
            name: name.into(),
            range: Some(IntensityRange { min, max }),
        }
    }
}

/// Ordered list of `(emotion, range)` pairs a registry is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionCatalog {
    /// Catalog entries in definition order.
    pub emotions: Vec<CatalogEntry>,
}

impl Default for EmotionCatalog {
    fn default() -> Self {
        Self {
            emotions: DEFAULT_EMOTIONS
                .iter()
                .map(|name| CatalogEntry {
                    name: (*name).to_string(),
                    range: None,
                })
                .collect(),
        }
    }
}

impl EmotionCatalog {
    /// Parse a catalog from a TOML string.
    ///
    /// # Errors
    /// Returns [`PsycheError::Serialization`] if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| PsycheError::Serialization(e.to_string()))
    }

    /// Parse a catalog from a JSON string.
    ///
    /// # Errors
    /// Returns [`PsycheError::Serialization`] if the JSON is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PsycheError::Serialization(e.to_string()))
    }

    /// Load a catalog from disk. `.toml` files are parsed as TOML, anything
    /// else as JSON.
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

    /// Check that every range is ordered.
    ///
    /// # Errors
    /// Returns [`PsycheError::InvalidRange`] for the first `min > max` entry.
    pub fn validate(&self) -> Result<()> {
        for entry in &self.emotions {
            if let Some(range) = entry.range {
                if range.min > range.max {
                    return Err(PsycheError::InvalidRange {
                        emotion: entry.name.clone(),
                        min: range.min,
                        max: range.max,
                    });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Fixed set of emotions with a name index and an intensity ranking.
#[derive(Debug, Clone)]
pub struct EmotionRegistry {
    /// Emotions in catalog order. A slot's index is its catalog position.
    slots: Vec<Emotion>,
    /// Name → slot.
    index: HashMap<String, usize>,
    /// Slots ordered by `(intensity, slot)` ascending.
    ranked: Vec<usize>,
    /// Slot → position in `ranked`.
    rank_of: Vec<usize>,
}

impl EmotionRegistry {
    /// Create a registry over `names`, every intensity starting at 0.
    ///
    /// # Errors
    /// [`PsycheError::EmptyCatalog`] for no names,
    /// [`PsycheError::DuplicateEmotion`] for a repeated name.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for name in names {
            let name: String = name.into();
            if !seen.insert(name.clone()) {
                return Err(PsycheError::DuplicateEmotion(name));
            }
            unique.push(name);
        }
        if unique.is_empty() {
            return Err(PsycheError::EmptyCatalog);
        }
        Ok(Self::from_unique(unique))
    }

    /// Registry over [`DEFAULT_EMOTIONS`], all at 0.
    #[must_use]
    pub fn default_catalog() -> Self {
        Self::from_unique(DEFAULT_EMOTIONS.iter().map(|name| (*name).to_string()).collect())
    }

    /// Slots in `names` order, all at 0. `names` must be non-empty and
    /// duplicate-free.
    fn from_unique(names: Vec<String>) -> Self {
        let index: HashMap<String, usize> = names
            .iter()
            .enumerate()
            .map(|(slot, name)| (name.clone(), slot))
            .collect();
        let slots: Vec<Emotion> = names.into_iter().map(|name| Emotion::new(name, 0)).collect();
        let ranked: Vec<usize> = (0..slots.len()).collect();
        let rank_of = ranked.clone();
        Self {
            slots,
            index,
            ranked,
            rank_of,
        }
    }

    /// Create a registry over `names` and apply explicit starting values.
    ///
    /// # Errors
    /// Construction errors from [`Self::new`], or
    /// [`PsycheError::UnknownEmotion`] if a starting value names a
    /// non-member.
    pub fn with_intensities<I, S>(names: I, initial: &[(&str, i32)]) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new(names)?;
        for (name, intensity) in initial {
            registry.set(name, *intensity)?;
        }
        Ok(registry)
    }

    /// Build a registry from a catalog description, sampling each ranged
    /// entry's starting intensity uniformly from its inclusive range.
    ///
    /// # Errors
    /// Construction errors from [`Self::new`], or
    /// [`PsycheError::InvalidRange`] for a range with `min > max`.
    pub fn from_catalog<R: Rng>(catalog: &EmotionCatalog, rng: &mut R) -> Result<Self> {
        catalog.validate()?;
        let mut registry = Self::new(catalog.emotions.iter().map(|e| e.name.clone()))?;
        for entry in &catalog.emotions {
            if let Some(range) = entry.range {
                let intensity = rng.gen_range(range.min..=range.max);
                registry.set(&entry.name, intensity)?;
            }
        }
        Ok(registry)
    }

    /// Copy of the named emotion.
    ///
    /// # Errors
    /// [`PsycheError::UnknownEmotion`] if `name` is not in the catalog.
    pub fn get(&self, name: &str) -> Result<Emotion> {
        let slot = self.slot(name)?;
        Ok(self.slots[slot].clone())
    }

    /// Set an emotion's intensity and restore the ranking.
    ///
    /// # Errors
    /// [`PsycheError::UnknownEmotion`] if `name` is not in the catalog.
    pub fn set(&mut self, name: &str, intensity: i32) -> Result<()> {
        let slot = self.slot(name)?;
        let previous = self.slots[slot].intensity;
        self.slots[slot].intensity = intensity;

        let start = self.rank_of[slot];
        let mut pos = start;
        while pos > 0 && self.rank_key(pos) < self.rank_key(pos - 1) {
            self.swap_ranks(pos, pos - 1);
            pos -= 1;
        }
        while pos + 1 < self.ranked.len() && self.rank_key(pos) > self.rank_key(pos + 1) {
            self.swap_ranks(pos, pos + 1);
            pos += 1;
        }

        trace!(
            emotion = name,
            from = previous,
            to = intensity,
            rank_from = start,
            rank_to = pos,
            "Emotion intensity set"
        );
        Ok(())
    }

    /// The conscious subset: every emotion with intensity `>= min_intensity`,
    /// weakest first.
    ///
    /// Never empty. When nothing reaches the threshold the single strongest
    /// emotion is returned instead.
    #[must_use]
    pub fn threshold(&self, min_intensity: i32) -> Vec<Emotion> {
        let start = self
            .ranked
            .partition_point(|&slot| self.slots[slot].intensity < min_intensity);
        if start == self.ranked.len() {
            return vec![self.dominant()];
        }
        self.ranked[start..]
            .iter()
            .map(|&slot| self.slots[slot].clone())
            .collect()
    }

    /// The highest-ranked emotion.
    #[must_use]
    pub fn dominant(&self) -> Emotion {
        // Construction rejects empty catalogs, so the ranking has a last entry.
        let top = self.ranked[self.ranked.len() - 1];
        self.slots[top].clone()
    }

    /// Adjective for an intensity value.
    #[must_use]
    pub fn adjective_for(intensity: i32) -> &'static str {
        Adjective::for_intensity(intensity).as_str()
    }

    /// Parse a mutation string of the form
    /// `"<more|less> <adjective> <emotion>(, ...)"` into signed deltas.
    ///
    /// Fragments are lower-cased. Any fragment that is not exactly three
    /// whitespace-separated tokens, or whose direction or adjective is not
    /// recognised, is dropped. Emotion names are not checked here.
    #[must_use]
    pub fn parse_deltas(text: &str) -> Vec<EmotionDelta> {
        let mut deltas = Vec::new();
        for fragment in text.split(',') {
            let lowered = fragment.to_lowercase();
            let tokens: Vec<&str> = lowered.split_whitespace().collect();
            let [direction, adjective, emotion] = tokens.as_slice() else {
                trace!(fragment, "Skipping fragment with wrong token count");
                continue;
            };

            let sign = match *direction {
                "more" => 1,
                "less" => -1,
                _ => {
                    trace!(fragment, "Skipping fragment with unknown direction");
                    continue;
                }
            };
            let Ok(adjective) = adjective.parse::<Adjective>() else {
                trace!(fragment, "Skipping fragment with unknown adjective");
                continue;
            };

            deltas.push(EmotionDelta {
                emotion: (*emotion).to_string(),
                delta: sign * adjective.magnitude(),
            });
        }
        deltas
    }

    /// Parse `text` with [`Self::parse_deltas`] and apply each delta as
    /// `set(name, old + delta)`.
    ///
    /// Bad fragments never abort the rest; deltas naming an emotion outside
    /// the catalog are logged and skipped. Returns the number applied.
    pub fn apply_deltas(&mut self, text: &str) -> usize {
        let mut applied = 0;
        for EmotionDelta { emotion, delta } in Self::parse_deltas(text) {
            let result = self
                .get(&emotion)
                .and_then(|current| self.set(&emotion, current.intensity.saturating_add(delta)));
            match result {
                Ok(()) => applied += 1,
                Err(err) => warn!(emotion = %emotion, delta, error = %err, "Skipping emotion delta"),
            }
        }
        applied
    }

    /// Every emotion, weakest first.
    #[must_use]
    pub fn ranked(&self) -> Vec<Emotion> {
        self.ranked
            .iter()
            .map(|&slot| self.slots[slot].clone())
            .collect()
    }

    /// Catalog names in definition order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.slots.iter().map(Emotion::name).collect()
    }

    /// Snapshot of every intensity, keyed by name.
    #[must_use]
    pub fn facts(&self) -> Facts {
        self.slots
            .iter()
            .map(|e| (e.name().to_string(), e.intensity))
            .collect()
    }

    /// Number of catalog members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always `false`: construction rejects empty catalogs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| PsycheError::UnknownEmotion(name.to_string()))
    }

    fn rank_key(&self, pos: usize) -> (i32, usize) {
        let slot = self.ranked[pos];
        (self.slots[slot].intensity, slot)
    }

    fn swap_ranks(&mut self, a: usize, b: usize) {
        self.ranked.swap(a, b);
        self.rank_of[self.ranked[a]] = a;
        self.rank_of[self.ranked[b]] = b;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
