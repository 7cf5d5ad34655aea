// src/session/submission.rs

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    api::ExamApi, models::question::AnswerMap, storage::AnswerCache, ui::Route,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Finished,
    /// Last attempt failed with this message; a retry is allowed.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted(Route),
    /// Another submission is in flight or already went through.
    AlreadySubmitted,
    Failed(String),
}

/// Sends the answer map to the backend at most once per successful attempt.
///
/// Shared between the finish button and the countdown: whichever calls
/// `confirm_submit` first wins, later calls return `AlreadySubmitted` until a
/// failure reopens the gate.
pub struct Submission {
    api: Arc<dyn ExamApi>,
    cache: AnswerCache,
    session_id: String,
    state: Mutex<SubmissionState>,
}

impl Submission {
    pub fn new(api: Arc<dyn ExamApi>, cache: AnswerCache, session_id: &str) -> Self {
        Self {
            api,
            cache,
            session_id: session_id.to_string(),
            state: Mutex::new(SubmissionState::Idle),
        }
    }

    fn state_guard(&self) -> MutexGuard<'_, SubmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SubmissionState {
        self.state_guard().clone()
    }

    /// The exam counts as finished from the moment submission starts.
    pub fn is_finished(&self) -> bool {
        matches!(
            *self.state_guard(),
            SubmissionState::Submitting | SubmissionState::Finished
        )
    }

    pub fn is_submitting(&self) -> bool {
        *self.state_guard() == SubmissionState::Submitting
    }

    pub fn error(&self) -> Option<String> {
        match &*self.state_guard() {
            SubmissionState::Failed(msg) => Some(msg.clone()),
            _ => None,
        }
    }

    fn try_begin(&self) -> bool {
        let mut state = self.state_guard();
        match *state {
            SubmissionState::Submitting | SubmissionState::Finished => false,
            SubmissionState::Idle | SubmissionState::Failed(_) => {
                *state = SubmissionState::Submitting;
                true
            }
        }
    }

    fn set_state(&self, next: SubmissionState) {
        *self.state_guard() = next;
    }

    /// Sends every answered question, one request each, in question-id order.
    /// Blank answers are skipped.
    pub async fn confirm_submit(&self, answers: &AnswerMap) -> SubmitOutcome {
        if !self.try_begin() {
            tracing::debug!("Submission for session {} already started", self.session_id);
            return SubmitOutcome::AlreadySubmitted;
        }

        for (question_id, answer) in answers.iter().filter(|(_, a)| !a.is_blank()) {
            if let Err(e) = self
                .api
                .submit_response(&self.session_id, question_id, answer)
                .await
            {
                tracing::error!("Exam submission failed at question {}: {}", question_id, e);
                let message = e.user_message();
                self.set_state(SubmissionState::Failed(message.clone()));
                return SubmitOutcome::Failed(message);
            }
        }

        if let Err(e) = self.cache.clear(&self.session_id) {
            tracing::warn!("Failed to clear cached answers for {}: {}", self.session_id, e);
        }
        if let Err(e) = self.api.end_session(&self.session_id).await {
            tracing::warn!("Failed to end session {}: {}", self.session_id, e);
        }

        self.set_state(SubmissionState::Finished);
        tracing::info!("Exam session {} submitted successfully", self.session_id);
        SubmitOutcome::Submitted(Route::Results(self.session_id.clone()))
    }
}
