// src/models/question.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::serde_helpers;

/// Question type as sent by the exam listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    MultipleSelection,
    TextInput,
}

impl QuestionType {
    /// Whether the candidate may pick more than one option.
    pub fn is_multi_select(self) -> bool {
        matches!(self, QuestionType::MultipleSelection)
    }
}

/// A user's answer: one option / free text, or several selected options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Single(String),
    Multiple(Vec<String>),
}

impl AnswerValue {
    /// An empty string (ignoring whitespace) or an empty selection counts as unanswered.
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Single(s) => s.trim().is_empty(),
            AnswerValue::Multiple(v) => v.is_empty(),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Single(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Single(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        AnswerValue::Multiple(value)
    }
}

/// Answers keyed by question id.
/// Ordered so that submission and persistence are deterministic.
pub type AnswerMap = BTreeMap<String, AnswerValue>;

/// A question of an exam. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(deserialize_with = "serde_helpers::id")]
    pub id: String,

    #[serde(deserialize_with = "serde_helpers::id")]
    pub exam_id: String,

    /// The text content of the question.
    pub text: String,

    /// Mapped from the JSON field 'type' since `type` is a reserved keyword in Rust.
    #[serde(rename = "type")]
    pub question_type: QuestionType,

    /// List of options (e.g., ["Option A", "Option B"]). Empty for text input.
    #[serde(default)]
    pub options: Vec<String>,

    /// Only present when the backend exposes it for review.
    #[serde(default)]
    pub correct_answer: Option<AnswerValue>,
}
