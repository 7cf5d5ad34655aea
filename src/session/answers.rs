// src/session/answers.rs

use crate::{
    models::question::{AnswerMap, AnswerValue},
    storage::DebouncedSaver,
};

/// In-memory answers of one session, mirrored to the cache through a debounced saver.
pub struct AnswerBook {
    session_id: String,
    answers: AnswerMap,
    saver: DebouncedSaver,
}

impl AnswerBook {
    pub fn new(session_id: &str, saver: DebouncedSaver) -> Self {
        Self {
            session_id: session_id.to_string(),
            answers: AnswerMap::new(),
            saver,
        }
    }

    /// Replaces the in-memory answers with whatever the cache still holds.
    /// Returns how many answers were recovered.
    pub fn restore(&mut self, finished: bool) -> usize {
        if finished {
            return 0;
        }
        match self.saver.cache().load(&self.session_id) {
            Some(saved) => {
                tracing::info!(
                    "Restored {} cached answers for session {}",
                    saved.len(),
                    self.session_id
                );
                self.answers = saved;
                self.answers.len()
            }
            None => 0,
        }
    }

    pub fn set_answer(&mut self, question_id: &str, answer: AnswerValue, finished: bool) {
        self.answers.insert(question_id.to_string(), answer);
        self.persist(finished);
    }

    fn persist(&mut self, finished: bool) {
        if self.answers.is_empty() || finished {
            return;
        }
        self.saver.schedule(&self.session_id, self.answers.clone());
    }

    /// Drops any write still waiting. Used while a submission is in flight.
    pub fn hold_saves(&mut self) {
        self.saver.cancel();
    }

    /// Schedules a write of the current map, e.g. after a failed submission.
    pub fn resume_saves(&mut self) {
        self.persist(false);
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    /// Forgets every answer and any write still waiting. Used once the backend has them.
    pub fn clear(&mut self) {
        self.saver.cancel();
        self.answers.clear();
    }
}
