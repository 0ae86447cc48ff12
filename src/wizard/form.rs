//! Form state store — the answers collected so far in a session.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single collected answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Multi(Vec<String>),
    Number(f64),
    /// Named sub-fields, used by contact-fields and location steps.
    Fields(BTreeMap<String, String>),
}

impl AnswerValue {
    /// The text form of the answer, used for branch-table lookups.
    /// Multi-selects and field groups have no single routing value.
    pub fn routing_value(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_multi(&self) -> Option<&[String]> {
        match self {
            Self::Multi(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_fields(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Fields(f) => Some(f),
            _ => None,
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for AnswerValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// The accumulated answers of one wizard session.
///
/// Keys are never deleted during a session; a later write to the same key
/// overwrites. BTreeMap keeps the snapshot deterministic for the
/// submission payload and the quote calculator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormData {
    #[serde(flatten)]
    answers: BTreeMap<String, AnswerValue>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a value in under `key`. Overwrites any previous value.
    pub fn set_answer(&mut self, key: impl Into<String>, value: AnswerValue) {
        self.answers.insert(key.into(), value);
    }

    /// Current value for `key`, if any.
    pub fn get_answer(&self, key: &str) -> Option<&AnswerValue> {
        self.answers.get(key)
    }

    /// The full mapping, read by the quote calculator and the
    /// submission dispatcher at the terminal step.
    pub fn snapshot(&self) -> &BTreeMap<String, AnswerValue> {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}
