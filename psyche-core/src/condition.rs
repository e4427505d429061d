//! Condition trees — boolean guards over named integer facts.
//!
//! A [`ConditionNode`] is the declarative, serialisable form read from a
//! machine description:
//!
//! ```json
//! { "type": "and",
//!   "comparison_1": { "type": "<", "key": "fear", "value": 50 },
//!   "comparison_2": { "type": ">", "key": "joy",  "value": 10 } }
//! ```
//!
//! [`ConditionTree::build`] validates it once into a [`ConditionTree`], which
//! is then interpreted directly on every evaluation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PsycheError, Result};
use crate::types::Facts;

// ---------------------------------------------------------------------------
// Declarative form
// ---------------------------------------------------------------------------

/// Serialised condition node: a tagged union keyed on `type`.
///
/// Recognised tags are `<`, `>`, `=`, `and`, `or` and `compliment` (logical
/// NOT). Leaves use `key` and `value`; `and` / `or` use `comparison_1` and
/// `comparison_2`; `compliment` uses `condition`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionNode {
    /// Type tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Fact name for leaf comparisons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Literal for leaf comparisons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
    /// Left operand of `and` / `or`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison_1: Option<Box<ConditionNode>>,
    /// Right operand of `and` / `or`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison_2: Option<Box<ConditionNode>>,
    /// Operand of `compliment`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Box<ConditionNode>>,
}

impl ConditionNode {
    fn leaf(kind: &str, key: impl Into<String>, value: i32) -> Self {
        Self {
            kind: kind.to_string(),
            key: Some(key.into()),
            value: Some(value),
            ..Self::default()
        }
    }

    /// `key < value`.
    #[must_use]
    pub fn less_than(key: impl Into<String>, value: i32) -> Self {
        Self::leaf("<", key, value)
    }

    /// `key > value`.
    #[must_use]
    pub fn greater_than(key: impl Into<String>, value: i32) -> Self {
        Self::leaf(">", key, value)
    }

    /// `key == value`.
    #[must_use]
    pub fn equal(key: impl Into<String>, value: i32) -> Self {
        Self::leaf("=", key, value)
    }

    /// `a && b`.
    #[must_use]
    pub fn and(a: Self, b: Self) -> Self {
        Self {
            kind: "and".into(),
            comparison_1: Some(Box::new(a)),
            comparison_2: Some(Box::new(b)),
            ..Self::default()
        }
    }

    /// `a || b`.
    #[must_use]
    pub fn or(a: Self, b: Self) -> Self {
        Self {
            kind: "or".into(),
            comparison_1: Some(Box::new(a)),
            comparison_2: Some(Box::new(b)),
            ..Self::default()
        }
    }

    /// `!a`.
    #[must_use]
    pub fn compliment(a: Self) -> Self {
        Self {
            kind: "compliment".into(),
            condition: Some(Box::new(a)),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Built form
// ---------------------------------------------------------------------------

/// A validated boolean expression over [`Facts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionTree {
    /// Holds unconditionally. Built from an absent node.
    Always,
    /// `facts[key] < value`.
    LessThan {
        /// Fact name.
        key: String,
        /// Literal.
        value: i32,
    },
    /// `facts[key] > value`.
    GreaterThan {
        /// Fact name.
        key: String,
        /// Literal.
        value: i32,
    },
    /// `facts[key] == value`.
    Equal {
        /// Fact name.
        key: String,
        /// Literal.
        value: i32,
    },
    /// Both hold; short-circuits on the left.
    And(Box<ConditionTree>, Box<ConditionTree>),
    /// Either holds; short-circuits on the left.
    Or(Box<ConditionTree>, Box<ConditionTree>),
    /// Inverts its operand.
    Not(Box<ConditionTree>),
}

impl ConditionTree {
    /// Build a tree from a declarative node.
    ///
    /// Absent operands of `and`, `or` and `compliment` become
    /// [`ConditionTree::Always`].
    ///
    /// # Errors
    /// [`PsycheError::InvalidConditionType`] for an unknown tag,
    /// [`PsycheError::MalformedCondition`] for a leaf without `key` or
    /// `value`.
    pub fn build(node: &ConditionNode) -> Result<Self> {
        let tree = match node.kind.as_str() {
            "<" => {
                let (key, value) = leaf_fields(node)?;
                Self::LessThan { key, value }
            }
            ">" => {
                let (key, value) = leaf_fields(node)?;
                Self::GreaterThan { key, value }
            }
            "=" => {
                let (key, value) = leaf_fields(node)?;
                Self::Equal { key, value }
            }
            "and" => Self::And(
                Box::new(Self::build_optional(node.comparison_1.as_deref())?),
                Box::new(Self::build_optional(node.comparison_2.as_deref())?),
            ),
            "or" => Self::Or(
                Box::new(Self::build_optional(node.comparison_1.as_deref())?),
                Box::new(Self::build_optional(node.comparison_2.as_deref())?),
            ),
            "compliment" => Self::Not(Box::new(Self::build_optional(node.condition.as_deref())?)),
            other => return Err(PsycheError::InvalidConditionType(other.to_string())),
        };
        Ok(tree)
    }

    /// Build from a node that may be absent; `None` yields
    /// [`ConditionTree::Always`].
    ///
    /// # Errors
    /// Same as [`Self::build`].
    pub fn build_optional(node: Option<&ConditionNode>) -> Result<Self> {
        node.map_or(Ok(Self::Always), Self::build)
    }

    /// Evaluate against a fact snapshot.
    ///
    /// # Errors
    /// [`PsycheError::MissingFact`] if a visited leaf's key is absent.
    /// Short-circuited branches are not visited.
    pub fn evaluate(&self, facts: &Facts) -> Result<bool> {
        match self {
            Self::Always => Ok(true),
            Self::LessThan { key, value } => Ok(lookup(facts, key)? < *value),
            Self::GreaterThan { key, value } => Ok(lookup(facts, key)? > *value),
            Self::Equal { key, value } => Ok(lookup(facts, key)? == *value),
            Self::And(a, b) => Ok(a.evaluate(facts)? && b.evaluate(facts)?),
            Self::Or(a, b) => Ok(a.evaluate(facts)? || b.evaluate(facts)?),
            Self::Not(a) => Ok(!a.evaluate(facts)?),
        }
    }

    /// Every fact name the tree reads, in left-to-right order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        self.collect_keys(&mut keys);
        keys
    }

    fn collect_keys<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Always => {}
            Self::LessThan { key, .. } | Self::GreaterThan { key, .. } | Self::Equal { key, .. } => {
                out.push(key);
            }
            Self::And(a, b) | Self::Or(a, b) => {
                a.collect_keys(out);
                b.collect_keys(out);
            }
            Self::Not(a) => a.collect_keys(out),
        }
    }
}

impl fmt::Display for ConditionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "true"),
            Self::LessThan { key, value } => write!(f, "{key} < {value}"),
            Self::GreaterThan { key, value } => write!(f, "{key} > {value}"),
            Self::Equal { key, value } => write!(f, "{key} = {value}"),
            Self::And(a, b) => write!(f, "({a} and {b})"),
            Self::Or(a, b) => write!(f, "({a} or {b})"),
            Self::Not(a) => write!(f, "not {a}"),
        }
    }
}

fn leaf_fields(node: &ConditionNode) -> Result<(String, i32)> {
    let key = node.key.clone().ok_or_else(|| PsycheError::MalformedCondition {
        kind: node.kind.clone(),
        field: "key",
    })?;
    let value = node.value.ok_or_else(|| PsycheError::MalformedCondition {
        kind: node.kind.clone(),
        field: "value",
    })?;
    Ok((key, value))
}

fn lookup(facts: &Facts, key: &str) -> Result<i32> {
    facts
        .get(key)
        .copied()
        .ok_or_else(|| PsycheError::MissingFact(key.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
