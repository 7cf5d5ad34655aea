// src/api/mock.rs

use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;

use crate::{
    api::ExamApi,
    error::AppError,
    models::{
        exam::Exam,
        exam_session::{ExamSession, SessionStatus},
        fraud::{FraudReport, SecurityEvent},
        question::{AnswerValue, Question, QuestionType},
    },
};

/// Everything the mock has been asked to do.
#[derive(Debug, Default, Clone)]
pub struct Calls {
    pub responses: Vec<(String, String, AnswerValue)>,
    pub ended: Vec<String>,
    pub auto_submits: Vec<String>,
    pub fraud: Vec<FraudReport>,
    pub security: Vec<SecurityEvent>,
}

/// In-process `ExamApi` with switchable failures.
#[derive(Default)]
pub struct MockExamApi {
    pub exams: Vec<Exam>,
    pub session_error: Option<String>,
    pub fail_response_for: Option<String>,
    pub fail_auto_submit: bool,
    pub fail_fraud: bool,
    pub response_delay: Option<Duration>,
    pub end_session_delay: Option<Duration>,
    pub calls: Mutex<Calls>,
}

impl MockExamApi {
    pub fn with_questions(ids: &[&str]) -> Self {
        Self {
            exams: vec![exam("e1", ids)],
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().unwrap().clone()
    }
}

pub fn exam(id: &str, question_ids: &[&str]) -> Exam {
    Exam {
        id: id.to_string(),
        title: format!("Exam {}", id),
        description: None,
        owner_id: None,
        created_at: None,
        updated_at: None,
        questions: question_ids
            .iter()
            .map(|q| Question {
                id: q.to_string(),
                exam_id: id.to_string(),
                text: format!("Question {}", q),
                question_type: QuestionType::SingleChoice,
                options: vec!["A".into(), "B".into(), "C".into()],
                correct_answer: None,
            })
            .collect(),
    }
}

pub fn session(id: &str, exam_id: &str, duration: u32) -> ExamSession {
    ExamSession {
        id: id.to_string(),
        exam_id: exam_id.to_string(),
        user_id: "u1".to_string(),
        start_time: chrono::Utc::now(),
        end_time: None,
        score: None,
        status: SessionStatus::InProgress,
        duration,
        responses: Vec::new(),
    }
}

#[async_trait]
impl ExamApi for MockExamApi {
    async fn list_exams(&self) -> Result<Vec<Exam>, AppError> {
        Ok(self.exams.clone())
    }

    async fn start_session(&self, exam_id: &str) -> Result<ExamSession, AppError> {
        if let Some(message) = &self.session_error {
            return Err(AppError::Api {
                status: 400,
                message: message.clone(),
            });
        }
        Ok(session("s1", exam_id, 30))
    }

    async fn submit_response(
        &self,
        session_id: &str,
        question_id: &str,
        answer: &AnswerValue,
    ) -> Result<(), AppError> {
        if let Some(delay) = self.response_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_response_for.as_deref() == Some(question_id) {
            return Err(AppError::Network("connection reset".to_string()));
        }
        self.calls.lock().unwrap().responses.push((
            session_id.to_string(),
            question_id.to_string(),
            answer.clone(),
        ));
        Ok(())
    }

    async fn end_session(&self, session_id: &str) -> Result<ExamSession, AppError> {
        if let Some(delay) = self.end_session_delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().ended.push(session_id.to_string());
        let mut ended = session(session_id, "e1", 30);
        ended.status = SessionStatus::Completed;
        Ok(ended)
    }

    async fn list_sessions(&self) -> Result<Vec<ExamSession>, AppError> {
        Ok(Vec::new())
    }

    async fn auto_submit(&self, session_id: &str) -> Result<(), AppError> {
        self.calls
            .lock()
            .unwrap()
            .auto_submits
            .push(session_id.to_string());
        if self.fail_auto_submit {
            return Err(AppError::Network("timeout".to_string()));
        }
        Ok(())
    }

    async fn report_fraud(&self, report: &FraudReport) -> Result<(), AppError> {
        if self.fail_fraud {
            return Err(AppError::Network("timeout".to_string()));
        }
        self.calls.lock().unwrap().fraud.push(report.clone());
        Ok(())
    }

    async fn report_security_event(&self, event: &SecurityEvent) -> Result<(), AppError> {
        self.calls.lock().unwrap().security.push(event.clone());
        Ok(())
    }
}
