// src/session/controller.rs

use std::sync::Arc;

use crate::{
    api::ExamApi,
    error::AppError,
    models::{exam_session::ExamSession, question::Question},
};

/// The exam picked for this attempt and the session created for it.
#[derive(Debug, Clone)]
pub struct LoadedExam {
    pub questions: Vec<Question>,
    pub session: ExamSession,
}

/// Loads the first available exam and starts a session for it.
///
/// Failures are reduced to one message for the error view; nothing is retried.
pub struct SessionController {
    api: Arc<dyn ExamApi>,
    questions: Vec<Question>,
    session: Option<ExamSession>,
    is_loading: bool,
    error: Option<String>,
}

impl SessionController {
    pub fn new(api: Arc<dyn ExamApi>) -> Self {
        Self {
            api,
            questions: Vec::new(),
            session: None,
            is_loading: false,
            error: None,
        }
    }

    pub async fn activate(&mut self) -> Result<LoadedExam, AppError> {
        self.is_loading = true;
        self.error = None;

        let result = self.load().await;

        match &result {
            Ok(loaded) => {
                self.questions = loaded.questions.clone();
                self.session = Some(loaded.session.clone());
            }
            Err(e) => {
                tracing::error!("Failed to load exam: {}", e);
                self.error = Some(e.user_message());
            }
        }

        self.is_loading = false;
        result
    }

    async fn load(&self) -> Result<LoadedExam, AppError> {
        let exams = self.api.list_exams().await?;
        let exam = exams
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Unavailable("No exams available".to_string()))?;

        let session = self.api.start_session(&exam.id).await.map_err(|e| match e {
            AppError::Api { message, .. } => AppError::Unavailable(message),
            other => other,
        })?;

        tracing::info!(
            "Started session {} for exam {} ({} questions)",
            session.id,
            exam.id,
            exam.questions.len()
        );

        Ok(LoadedExam {
            questions: exam.questions,
            session,
        })
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn session(&self) -> Option<&ExamSession> {
        self.session.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
