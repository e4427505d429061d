//! Prompt templates for PSYCHE dialogue turns.
//!
//! Every prompt is a versioned, testable artifact. The built-in templates are
//! the `const` strings below; a directory of TOML files can override any of
//! them without recompiling:
//!
//! ```toml
//! [prompt]
//! version = "2"
//! text = """
//! You are {personality}. ...
//! """
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::LlmError;

/// Asks how the latest line shifts the NPC's emotions.
///
/// Vars: `personality`, `conversation`, `emotions`, `adjectives`.
pub const EMOTION_DELTA: &str = r#"You are {personality}.

Conversation so far:
{conversation}

How does the last line change how you feel?
Emotions you can feel: {emotions}.
Intensities, weakest to strongest: {adjectives}.

Answer only with comma-separated changes of the form "<more|less> <intensity> <emotion>", for example "more heightened joy, less serene fear". Do not explain."#;

/// Asks the NPC to pick its next decision state.
///
/// Vars: `state`, `feelings`, `conversation`, `options`.
pub const TRANSITION_CHOICE: &str = r"You are currently {state} and you feel {feelings}.

Conversation so far:
{conversation}

What do you do next? Choose exactly one of: {options}.
Answer with the option only. Give no justification.";

/// Asks for the NPC's spoken reply.
///
/// Vars: `personality`, `state`, `feelings`, `conversation`.
pub const RESPONSE: &str = r"You are {personality}. You are currently {state} and you feel {feelings}.

Conversation so far:
{conversation}

Reply with your next line only. Stay in character.";

/// Option meaning "stay in the current state".
pub const NOTHING: &str = "Nothing";

/// Simple template interpolation for prompts.
///
/// Replaces `{key}` with the corresponding value in a single pass over the
/// template. Substituted values are copied through verbatim, so a value that
/// itself contains `{other}` is never expanded. Unknown placeholders are kept.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find(['{', '}']) else {
            result.push_str(&rest[open..]);
            return result;
        };
        if after[close..].starts_with('{') {
            // `{` inside a candidate key: emit the first brace and rescan.
            result.push('{');
            rest = after;
            continue;
        }
        let key = &after[..close];
        match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => result.push_str(value),
            None => result.push_str(&rest[open..=open + 1 + close]),
        }
        rest = &after[close + 1..];
    }
    result.push_str(rest);
    result
}

/// Quote each target and append the [`NOTHING`] option:
/// `"flee", "fight", "Nothing"`.
#[must_use]
pub fn render_options<S: AsRef<str>>(targets: &[S]) -> String {
    targets
        .iter()
        .map(AsRef::as_ref)
        .chain(std::iter::once(NOTHING))
        .map(|option| format!("\"{option}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// PromptEngine — Versioned TOML Template Loader
// ---------------------------------------------------------------------------

/// Identifies a prompt template by purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Emotion update query.
    EmotionDelta,
    /// Decision-state choice.
    TransitionChoice,
    /// Spoken reply.
    Response,
}

impl PromptId {
    /// Returns the TOML filename (without path) for this prompt.
    #[must_use]
    pub fn filename(self) -> &'static str {
        match self {
            Self::EmotionDelta => "emotion_delta.toml",
            Self::TransitionChoice => "transition_choice.toml",
            Self::Response => "response.toml",
        }
    }

    /// All prompt IDs.
    #[must_use]
    pub fn all() -> &'static [PromptId] {
        &[Self::EmotionDelta, Self::TransitionChoice, Self::Response]
    }

    fn builtin_text(self) -> &'static str {
        match self {
            Self::EmotionDelta => EMOTION_DELTA,
            Self::TransitionChoice => TRANSITION_CHOICE,
            Self::Response => RESPONSE,
        }
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EmotionDelta => "emotion_delta",
            Self::TransitionChoice => "transition_choice",
            Self::Response => "response",
        };
        write!(f, "{name}")
    }
}

impl FromStr for PromptId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "emotion_delta" => Ok(Self::EmotionDelta),
            "transition_choice" => Ok(Self::TransitionChoice),
            "response" => Ok(Self::Response),
            _ => Err(format!("unknown prompt id: '{s}'")),
        }
    }
}

/// Top level of a TOML prompt file.
#[derive(Debug, Clone, Deserialize)]
struct TomlPromptFile {
    prompt: TomlPromptData,
}

/// Inner `[prompt]` section of a TOML file.
#[derive(Debug, Clone, Deserialize)]
struct TomlPromptData {
    version: String,
    text: String,
}

/// A loaded, ready-to-render prompt template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Prompt version string; `"builtin"` for compiled-in templates.
    pub version: String,
    /// Template text with `{key}` placeholders.
    pub text: String,
}

/// Holds one template per [`PromptId`] and renders them.
#[derive(Debug, Clone)]
pub struct PromptEngine {
    templates: HashMap<PromptId, PromptTemplate>,
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptEngine {
    /// Engine pre-loaded with the compiled-in templates.
    #[must_use]
    pub fn builtin() -> Self {
        let templates = PromptId::all()
            .iter()
            .map(|id| {
                (
                    *id,
                    PromptTemplate {
                        version: "builtin".into(),
                        text: id.builtin_text().into(),
                    },
                )
            })
            .collect();
        Self { templates }
    }

    /// Built-in templates, overridden by any `<prompt_id>.toml` file found in
    /// `dir`. Unknown files are ignored.
    ///
    /// # Errors
    ///
    /// `LlmError::ConfigError` if `dir` is not a directory, or a matching
    /// file cannot be read or parsed.
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self, LlmError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(LlmError::ConfigError(format!(
                "prompt directory not found: {}",
                dir.display()
            )));
        }

        let mut engine = Self::builtin();
        for id in PromptId::all() {
            let path = dir.join(id.filename());
            if !path.exists() {
                continue;
            }
            let content = std::fs::read_to_string(&path).map_err(|e| {
                LlmError::ConfigError(format!("failed to read {}: {e}", path.display()))
            })?;
            let parsed: TomlPromptFile = toml::from_str(&content).map_err(|e| {
                LlmError::ConfigError(format!("failed to parse {}: {e}", path.display()))
            })?;

            debug!(prompt = %id, version = %parsed.prompt.version, "Loaded prompt override");
            engine.templates.insert(
                *id,
                PromptTemplate {
                    version: parsed.prompt.version,
                    text: parsed.prompt.text,
                },
            );
        }
        Ok(engine)
    }

    /// Get a loaded prompt template by ID.
    #[must_use]
    pub fn get(&self, id: PromptId) -> Option<&PromptTemplate> {
        self.templates.get(&id)
    }

    /// Render the template for `id` with `vars`. Unknown placeholders are
    /// left in place.
    #[must_use]
    pub fn render(&self, id: PromptId, vars: &[(&str, &str)]) -> String {
        let text: &str = match self.get(id) {
            Some(tpl) => &tpl.text,
            None => id.builtin_text(),
        };
        render_template(text, vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_rendering_works() {
        let rendered = render_template(
            "Hello {name}, you are {state}.",
            &[("name", "Goran"), ("state", "fleeing")],
        );
        assert_eq!(rendered, "Hello Goran, you are fleeing.");
    }

    #[test]
    fn template_handles_missing_vars() {
        let rendered = render_template("Hello {name}, {unknown}.", &[("name", "Goran")]);
        assert_eq!(rendered, "Hello Goran, {unknown}.");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let rendered = render_template(
            "Log:\n{conversation}\nPick: {options}",
            &[
                ("conversation", "Other:\"say {options} and {emotions}\""),
                ("options", "\"flee\", \"Nothing\""),
                ("emotions", "joy"),
            ],
        );
        assert_eq!(
            rendered,
            "Log:\nOther:\"say {options} and {emotions}\"\nPick: \"flee\", \"Nothing\""
        );
    }

    #[test]
    fn stray_braces_are_kept() {
        assert_eq!(render_template("a { {name}", &[("name", "b")]), "a { b");
        assert_eq!(render_template("{name} }{", &[("name", "b")]), "b }{");
        assert_eq!(render_template("{}", &[("name", "b")]), "{}");
    }

    #[test]
    fn options_are_quoted_with_nothing_last() {
        assert_eq!(render_options(&["flee", "fight"]), "\"flee\", \"fight\", \"Nothing\"");
        assert_eq!(render_options::<&str>(&[]), "\"Nothing\"");
    }

    #[test]
    fn prompt_id_from_str_round_trip() {
        for id in PromptId::all() {
            let parsed: PromptId = id.to_string().parse().expect("should parse");
            assert_eq!(*id, parsed);
        }
        assert!("nonexistent".parse::<PromptId>().is_err());
    }

    #[test]
    fn builtin_engine_has_every_template() {
        let engine = PromptEngine::builtin();
        for id in PromptId::all() {
            let tpl = engine.get(*id).expect("loaded");
            assert_eq!(tpl.version, "builtin");
        }
    }

    #[test]
    fn directory_overrides_only_present_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("response.toml"),
            "[prompt]\nversion = \"2\"\ntext = \"Say something, {personality}.\"\n",
        )
        .expect("write");
        std::fs::write(dir.path().join("unrelated.toml"), "junk = 1").expect("write");

        let engine = PromptEngine::from_directory(dir.path()).expect("load");
        assert_eq!(engine.get(PromptId::Response).expect("loaded").version, "2");
        assert_eq!(
            engine.render(PromptId::Response, &[("personality", "a ranger")]),
            "Say something, a ranger."
        );
        assert_eq!(
            engine.get(PromptId::EmotionDelta).expect("loaded").version,
            "builtin"
        );
    }

    #[test]
    fn bad_override_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("emotion_delta.toml"), "[prompt]\nversion = 1")
            .expect("write");
        assert!(matches!(
            PromptEngine::from_directory(dir.path()),
            Err(LlmError::ConfigError(_))
        ));
    }

    #[test]
    fn missing_directory_is_config_error() {
        let result = PromptEngine::from_directory("/tmp/nonexistent_psyche_prompts_dir");
        assert!(matches!(result, Err(LlmError::ConfigError(_))));
    }
}
