// src/api/mod.rs

//! Collaborators the client talks to. Everything durable lives behind this trait.

pub mod http;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        exam::Exam,
        exam_session::ExamSession,
        fraud::{FraudReport, SecurityEvent},
        question::AnswerValue,
    },
};

pub use http::HttpExamApi;

#[async_trait]
pub trait ExamApi: Send + Sync {
    /// Exams currently open to the user, with their questions.
    async fn list_exams(&self) -> Result<Vec<Exam>, AppError>;

    async fn start_session(&self, exam_id: &str) -> Result<ExamSession, AppError>;

    /// Records a single answer. Resubmitting the same question must be tolerated.
    async fn submit_response(
        &self,
        session_id: &str,
        question_id: &str,
        answer: &AnswerValue,
    ) -> Result<(), AppError>;

    async fn end_session(&self, session_id: &str) -> Result<ExamSession, AppError>;

    async fn list_sessions(&self) -> Result<Vec<ExamSession>, AppError>;

    /// Finalizes a session after too many lockdown violations.
    async fn auto_submit(&self, session_id: &str) -> Result<(), AppError>;

    async fn report_fraud(&self, report: &FraudReport) -> Result<(), AppError>;

    async fn report_security_event(&self, event: &SecurityEvent) -> Result<(), AppError>;
}
