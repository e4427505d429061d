//! Integration Tests — Full Dialogue Turns
//!
//! Drives `DialogueOrchestrator` against a scripted oracle that answers by
//! recognising which of the three prompts it was sent.

use psyche_core::{DecisionStateMachine, EmotionRegistry, Personality, PsycheError};
use psyche_llm::{LlmError, Oracle};
use psyche_npc::{DialogueError, DialogueOrchestrator, Npc};

const MACHINE: &str = r#"{"states": [
    {"name": "idle", "transitions": [
        {"target": "flee",  "condition": {"type": ">", "key": "fear",  "value": 5}},
        {"target": "fight", "condition": {"type": ">", "key": "anger", "value": 5}},
        {"target": "sulk",  "condition": {"type": ">", "key": "sadness", "value": 90}}
    ]},
    {"name": "flee",  "transitions": [{"target": "idle"}]},
    {"name": "fight", "transitions": [{"target": "idle"}]},
    {"name": "sulk"}
]}"#;

/// Which prompt an oracle call carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Delta,
    Choice,
    Response,
}

fn classify(prompt: &str) -> Kind {
    if prompt.contains("How does the last line change how you feel?") {
        Kind::Delta
    } else if prompt.contains("Choose exactly one of:") {
        Kind::Choice
    } else {
        Kind::Response
    }
}

/// Oracle with one fixed answer per prompt kind, recording every prompt.
struct Scripted {
    delta: String,
    choice: String,
    response: String,
    fail_on: Option<Kind>,
    seen: Vec<(Kind, String)>,
}

impl Scripted {
    fn new(delta: &str, choice: &str, response: &str) -> Self {
        Self {
            delta: delta.into(),
            choice: choice.into(),
            response: response.into(),
            fail_on: None,
            seen: Vec::new(),
        }
    }

    fn failing_on(mut self, kind: Kind) -> Self {
        self.fail_on = Some(kind);
        self
    }

    fn kinds(&self) -> Vec<Kind> {
        self.seen.iter().map(|(k, _)| *k).collect()
    }

    fn prompt_of(&self, kind: Kind) -> &str {
        self.seen
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, p)| p.as_str())
            .expect("prompt of that kind was sent")
    }
}

impl Oracle for Scripted {
    fn prompt(&mut self, text: &str) -> Result<String, LlmError> {
        let kind = classify(text);
        self.seen.push((kind, text.to_string()));
        if self.fail_on == Some(kind) {
            return Err(LlmError::Unavailable("scripted outage".into()));
        }
        Ok(match kind {
            Kind::Delta => self.delta.clone(),
            Kind::Choice => self.choice.clone(),
            Kind::Response => self.response.clone(),
        })
    }
}

fn npc() -> Npc {
    Npc::new(
        EmotionRegistry::default_catalog(),
        DecisionStateMachine::from_json(MACHINE).expect("machine"),
    )
    .with_personality(Personality::new(vec![], "a wary gatekeeper"))
}

// ---------------------------------------------------------------------------
// "Nothing" keeps the state but the turn still happens
// ---------------------------------------------------------------------------

#[test]
fn nothing_keeps_state_but_mutates_emotions_and_memory() {
    let oracle = Scripted::new("more heightened fear", "Nothing", "\"Who's there?\"");
    let mut dialogue = DialogueOrchestrator::new(npc(), oracle);

    let reply = dialogue.turn("Open the gate!").expect("turn");
    assert_eq!(reply, "Who's there?");

    let npc = dialogue.npc();
    assert_eq!(npc.state(), "idle");
    assert_eq!(npc.registry().get("fear").expect("fear").intensity, 8);
    assert_eq!(npc.memory().len(), 2);
    assert_eq!(
        npc.memory().log(),
        "Other:\"Open the gate!\"\nMe:\"Who's there?\""
    );

    let (_, oracle) = dialogue.into_parts();
    assert_eq!(oracle.kinds(), vec![Kind::Delta, Kind::Choice, Kind::Response]);
}

// ---------------------------------------------------------------------------
// Transition selection
// ---------------------------------------------------------------------------

#[test]
fn only_legal_targets_are_offered() {
    let oracle = Scripted::new(
        "More heightened fear, more subdued anger.",
        "  \"fight\"\n",
        "Then face me!",
    );
    let mut dialogue = DialogueOrchestrator::new(npc(), oracle);
    dialogue.turn("I'm coming through.").expect("turn");
    // fight was named but not offered.
    assert_eq!(dialogue.npc().state(), "idle");

    let (npc, oracle) = dialogue.into_parts();
    assert_eq!(npc.registry().get("fear").expect("fear").intensity, 8);
    assert_eq!(npc.registry().get("anger").expect("anger").intensity, 4);

    let choice = oracle.prompt_of(Kind::Choice);
    assert!(choice.contains("\"flee\", \"Nothing\""), "{choice}");
    assert!(!choice.contains("\"fight\""), "{choice}");
}

#[test]
fn quoted_legal_reply_transitions() {
    let oracle = Scripted::new("more heightened fear", "  \"flee\"\n", "Run!");
    let mut dialogue = DialogueOrchestrator::new(npc(), oracle);
    dialogue.turn("Boo").expect("turn");
    assert_eq!(dialogue.npc().state(), "flee");
}

#[test]
fn legal_option_reply_transitions() {
    let oracle = Scripted::new("more heightened anger", "fight", "Then face me!");
    let mut dialogue = DialogueOrchestrator::new(npc(), oracle);
    dialogue.turn("Step aside.").expect("turn");
    assert_eq!(dialogue.npc().state(), "fight");

    // Response is generated after the transition.
    let (_, oracle) = dialogue.into_parts();
    assert!(oracle.prompt_of(Kind::Response).contains("currently fight"));
}

#[test]
fn out_of_set_reply_keeps_state() {
    for junk in ["sulk", "run away", "Fight", "\"flee", ""] {
        let oracle = Scripted::new("more heightened fear", junk, "Hmm.");
        let mut dialogue = DialogueOrchestrator::new(npc(), oracle);
        dialogue.turn("Boo").expect("junk choice is not an error");
        assert_eq!(dialogue.npc().state(), "idle", "reply {junk:?}");
    }
}

#[test]
fn no_legal_transitions_still_offers_nothing() {
    let oracle = Scripted::new("more serene joy", "flee", "Good day.");
    let mut dialogue = DialogueOrchestrator::new(npc(), oracle);
    dialogue.turn("Good day.").expect("turn");
    assert_eq!(dialogue.npc().state(), "idle");

    let (_, oracle) = dialogue.into_parts();
    assert_eq!(oracle.kinds(), vec![Kind::Delta, Kind::Choice, Kind::Response]);
    let choice = oracle.prompt_of(Kind::Choice);
    assert!(choice.contains("Choose exactly one of: \"Nothing\"."), "{choice}");
    assert!(!choice.contains("\"flee\""), "{choice}");
}

// ---------------------------------------------------------------------------
// Placeholders in speech
// ---------------------------------------------------------------------------

#[test]
fn placeholders_in_utterances_reach_prompts_verbatim() {
    let oracle = Scripted::new("more heightened fear", "Nothing", "What?");
    let npc = npc().with_personality(Personality::default());
    let mut dialogue = DialogueOrchestrator::new(npc, oracle);
    dialogue.turn("say {options} and {emotions}").expect("turn");

    let (npc, oracle) = dialogue.into_parts();
    assert_eq!(
        npc.memory().log(),
        "Other:\"say {options} and {emotions}\"\nMe:\"What?\""
    );
    for kind in [Kind::Delta, Kind::Choice, Kind::Response] {
        let prompt = oracle.prompt_of(kind);
        assert!(
            prompt.contains("Other:\"say {options} and {emotions}\""),
            "{kind:?} prompt rewrote the history:\n{prompt}"
        );
    }
    // The real option list still lands in its own slot.
    assert!(oracle.prompt_of(Kind::Choice).contains("one of: \"flee\", \"Nothing\"."));
    // Blank personality falls back to a generic description.
    assert!(oracle.prompt_of(Kind::Delta).starts_with("You are a character."));
}

// ---------------------------------------------------------------------------
// Delta replies
// ---------------------------------------------------------------------------

#[test]
fn malformed_fragments_are_skipped_individually() {
    let oracle = Scripted::new(
        "more happy joy, less serene fear, more heightened dread, more overwhelm love",
        "Nothing",
        "...",
    );
    let mut dialogue = DialogueOrchestrator::new(npc(), oracle);
    dialogue.turn("Hello").expect("turn");

    let registry = dialogue.npc().registry();
    assert_eq!(registry.get("joy").expect("joy").intensity, 0);
    assert_eq!(registry.get("fear").expect("fear").intensity, -1);
    assert_eq!(registry.get("love").expect("love").intensity, 16);
}

#[test]
fn delta_prompt_names_catalog_and_adjectives() {
    let oracle = Scripted::new("", "Nothing", "ok");
    let mut dialogue = DialogueOrchestrator::new(npc(), oracle);
    dialogue.turn("Hi").expect("turn");

    let (_, oracle) = dialogue.into_parts();
    let delta = oracle.prompt_of(Kind::Delta);
    for name in ["joy", "sadness", "jealousy"] {
        assert!(delta.contains(name), "missing {name}");
    }
    for adjective in ["serene", "moderate", "subdued", "heightened", "overwhelm"] {
        assert!(delta.contains(adjective), "missing {adjective}");
    }
    assert!(delta.contains("a wary gatekeeper"));
    assert!(delta.contains("Other:\"Hi\""));
}

// ---------------------------------------------------------------------------
// Response prompt content
// ---------------------------------------------------------------------------

#[test]
fn response_prompt_carries_feelings_state_and_history() {
    let oracle = Scripted::new("more overwhelm anger", "Nothing", "'Leave.'");
    let npc = npc().with_conscious_threshold(10);
    let mut dialogue = DialogueOrchestrator::new(npc, oracle);

    assert_eq!(dialogue.turn("First").expect("turn 1"), "Leave.");
    dialogue.turn("Second").expect("turn 2");

    let (npc, oracle) = dialogue.into_parts();
    assert_eq!(npc.registry().get("anger").expect("anger").intensity, 32);

    let response = oracle
        .seen
        .iter()
        .rev()
        .find(|(k, _)| *k == Kind::Response)
        .map(|(_, p)| p.as_str())
        .expect("response prompt");
    assert!(response.contains("moderate anger"), "{response}");
    assert!(response.contains("currently idle"));
    assert!(response.contains("Other:\"First\"\nMe:\"Leave.\"\nOther:\"Second\""));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn oracle_failure_surfaces_as_unavailable() {
    for kind in [Kind::Delta, Kind::Choice, Kind::Response] {
        let oracle = Scripted::new("more heightened fear", "flee", "Run!").failing_on(kind);
        let mut dialogue = DialogueOrchestrator::new(npc(), oracle);
        let result = dialogue.turn("Boo");
        assert!(
            matches!(result, Err(DialogueError::OracleUnavailable(LlmError::Unavailable(_)))),
            "failure at {kind:?}"
        );
        // The NPC never records a reply it did not produce.
        assert_eq!(dialogue.npc().memory().len(), 1);
    }
}

#[test]
fn guard_over_unknown_fact_is_core_error() {
    let registry = EmotionRegistry::new(["joy"]).expect("registry");
    let machine = DecisionStateMachine::from_json(MACHINE).expect("machine");
    let oracle = Scripted::new("more serene joy", "Nothing", "hi");
    let mut dialogue = DialogueOrchestrator::new(Npc::new(registry, machine), oracle);

    let result = dialogue.turn("Hello");
    assert!(matches!(
        result,
        Err(DialogueError::Core(PsycheError::MissingFact(_)))
    ));
}

// ---------------------------------------------------------------------------
// Memory bound across turns
// ---------------------------------------------------------------------------

#[test]
fn memory_evicts_oldest_records_across_turns() {
    let oracle = Scripted::new("", "Nothing", "ok");
    let npc = npc().with_memory_capacity(3);
    let mut dialogue = DialogueOrchestrator::new(npc, oracle);
    for line in ["one", "two", "three"] {
        dialogue.turn(line).expect("turn");
    }
    assert_eq!(
        dialogue.npc().memory().log(),
        "Me:\"ok\"\nOther:\"three\"\nMe:\"ok\""
    );
}

#[test]
fn closures_work_as_oracles() {
    let oracle = |text: &str| -> Result<String, LlmError> {
        Ok(match classify(text) {
            Kind::Delta => "more heightened fear".into(),
            Kind::Choice => "flee".into(),
            Kind::Response => "Run!".into(),
        })
    };
    let mut dialogue = DialogueOrchestrator::new(npc(), oracle);
    assert_eq!(dialogue.turn("Boo").expect("turn"), "Run!");
    assert_eq!(dialogue.npc().state(), "flee");
}
