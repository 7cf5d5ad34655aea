// src/models/exam_session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::{question::AnswerValue, serde_helpers};

/// Lifecycle status reported by the backend.
/// Unknown strings are kept verbatim instead of failing the whole payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    #[serde(untagged)]
    Other(String),
}

/// One user's timed attempt at one exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamSession {
    #[serde(deserialize_with = "serde_helpers::id")]
    pub id: String,
    #[serde(deserialize_with = "serde_helpers::id")]
    pub exam_id: String,
    #[serde(deserialize_with = "serde_helpers::id")]
    pub user_id: String,
    #[serde(deserialize_with = "serde_helpers::timestamp")]
    pub start_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "serde_helpers::optional_timestamp")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub score: Option<f64>,
    pub status: SessionStatus,

    /// Exam duration in minutes; drives the countdown.
    #[serde(default)]
    pub duration: u32,

    #[serde(default)]
    pub responses: Vec<ExamResponse>,
}

impl ExamSession {
    pub fn is_in_progress(&self) -> bool {
        self.status == SessionStatus::InProgress
    }
}

/// A recorded answer to one question within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamResponse {
    #[serde(deserialize_with = "serde_helpers::id")]
    pub id: String,
    #[serde(deserialize_with = "serde_helpers::id")]
    pub exam_session_id: String,
    #[serde(deserialize_with = "serde_helpers::id")]
    pub question_id: String,
    pub answer: AnswerValue,
    #[serde(default)]
    pub is_correct: Option<bool>,
    #[serde(default, deserialize_with = "serde_helpers::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// DTO for starting a session.
#[derive(Debug, Serialize)]
pub struct StartSessionRequest<'a> {
    pub exam_id: &'a str,
}

/// DTO for recording one response.
#[derive(Debug, Serialize, Validate)]
pub struct SubmitResponseRequest {
    #[validate(length(min = 1))]
    pub exam_session_id: String,
    #[validate(length(min = 1))]
    pub question_id: String,
    #[validate(custom(function = validate_answer))]
    pub answer: AnswerValue,
}

fn validate_answer(answer: &AnswerValue) -> Result<(), ValidationError> {
    if answer.is_blank() {
        return Err(ValidationError::new("answer_cannot_be_blank"));
    }
    Ok(())
}
