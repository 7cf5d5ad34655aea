// src/session/attempt.rs

use std::{sync::Arc, time::Duration};

use crate::{
    api::ExamApi,
    error::AppError,
    models::{
        exam_session::ExamSession,
        question::{AnswerMap, AnswerValue, Question},
    },
    session::{
        AnswerBook, ExamTimer, LoadedExam, NavOutcome, Navigator, SessionController, Submission,
        SubmitOutcome,
    },
    storage::{AnswerCache, DebouncedSaver},
    ui::KeyPress,
};

/// What a navigation request ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptStep {
    Moved(usize),
    Stayed,
    Submitted(SubmitOutcome),
}

/// One candidate's run through one exam, composed from the session parts.
pub struct ExamAttempt {
    session: ExamSession,
    questions: Vec<Question>,
    answers: AnswerBook,
    navigator: Navigator,
    submission: Arc<Submission>,
    timer: Option<ExamTimer>,
}

impl ExamAttempt {
    /// Loads the exam, starts a session, restores cached answers and starts the countdown.
    pub async fn begin(
        api: Arc<dyn ExamApi>,
        cache: AnswerCache,
        debounce: Duration,
    ) -> Result<Self, AppError> {
        let mut controller = SessionController::new(api.clone());
        let loaded = controller.activate().await?;
        Ok(Self::from_loaded(api, cache, debounce, loaded))
    }

    pub fn from_loaded(
        api: Arc<dyn ExamApi>,
        cache: AnswerCache,
        debounce: Duration,
        loaded: LoadedExam,
    ) -> Self {
        let LoadedExam { questions, session } = loaded;

        let submission = Arc::new(Submission::new(api, cache.clone(), &session.id));
        let mut answers = AnswerBook::new(
            &session.id,
            DebouncedSaver::with_delay(cache, debounce),
        );
        answers.restore(submission.is_finished());

        let timer = (session.duration > 0).then(|| ExamTimer::start(session.duration));

        Self {
            navigator: Navigator::new(questions.len()),
            session,
            questions,
            answers,
            submission,
            timer,
        }
    }

    pub fn session(&self) -> &ExamSession {
        &self.session
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.navigator.index()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.navigator.index())
    }

    pub fn answers(&self) -> &AnswerMap {
        self.answers.answers()
    }

    pub fn is_finished(&self) -> bool {
        self.submission.is_finished()
    }

    pub fn submission(&self) -> Arc<Submission> {
        self.submission.clone()
    }

    pub fn timer(&self) -> Option<&ExamTimer> {
        self.timer.as_ref()
    }

    /// Records an answer. Ignored once the exam is finished.
    pub fn answer(&mut self, question_id: &str, answer: AnswerValue) {
        let finished = self.is_finished();
        if finished {
            tracing::debug!("Ignoring answer for {} after finish", question_id);
            return;
        }
        self.answers.set_answer(question_id, answer, finished);
    }

    pub async fn next(&mut self) -> AttemptStep {
        let outcome = self.navigator.next(self.is_finished());
        self.apply(outcome).await
    }

    pub async fn previous(&mut self) -> AttemptStep {
        let outcome = self.navigator.previous();
        self.apply(outcome).await
    }

    pub async fn go_to(&mut self, index: usize) -> AttemptStep {
        let outcome = self.navigator.go_to(index);
        self.apply(outcome).await
    }

    /// Arrow-key navigation. `None` when the key is not a navigation key.
    pub async fn handle_key(&mut self, key: &KeyPress) -> Option<AttemptStep> {
        let outcome = self.navigator.handle_key(key, self.is_finished())?;
        Some(self.apply(outcome).await)
    }

    async fn apply(&mut self, outcome: NavOutcome) -> AttemptStep {
        match outcome {
            NavOutcome::Moved(index) => AttemptStep::Moved(index),
            NavOutcome::Stayed => AttemptStep::Stayed,
            NavOutcome::SubmitRequested => AttemptStep::Submitted(self.finish().await),
        }
    }

    /// Submits the current answers. Safe to call from both the finish button and time-up.
    pub async fn finish(&mut self) -> SubmitOutcome {
        self.answers.hold_saves();
        let outcome = self.submission.confirm_submit(self.answers.answers()).await;
        match &outcome {
            SubmitOutcome::Submitted(_) => {
                self.answers.clear();
                if let Some(timer) = self.timer.as_mut() {
                    timer.cancel();
                }
            }
            SubmitOutcome::Failed(_) => self.answers.resume_saves(),
            SubmitOutcome::AlreadySubmitted => {}
        }
        outcome
    }

    /// The countdown's time-up signal, detached from the attempt so a host can
    /// select on it while still driving the attempt. Never resolves without a timer.
    pub fn time_up(&mut self) -> impl Future<Output = ()> + Send + use<> {
        let signal = self.timer.as_mut().map(ExamTimer::time_up);
        async move {
            match signal {
                Some(signal) => signal.await,
                None => std::future::pending::<()>().await,
            }
        }
    }

    /// Waits for the countdown to end, then submits. Never resolves without a timer.
    pub async fn run_out_clock(&mut self) -> SubmitOutcome {
        self.time_up().await;
        self.finish().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::mock::MockExamApi, storage::MemoryStore, ui::Route};

    async fn attempt(api: Arc<MockExamApi>) -> (ExamAttempt, AnswerCache) {
        let cache = AnswerCache::new(Arc::new(MemoryStore::new()));
        let attempt = ExamAttempt::begin(api, cache.clone(), Duration::from_secs(1))
            .await
            .unwrap();
        (attempt, cache)
    }

    #[tokio::test]
    async fn finishing_on_last_question_sends_only_answered_ones() {
        let api = Arc::new(MockExamApi::with_questions(&["q1", "q2", "q3"]));
        let (mut attempt, _) = attempt(api.clone()).await;

        attempt.answer("q1", "A".into());
        assert_eq!(attempt.next().await, AttemptStep::Moved(1));
        assert_eq!(attempt.next().await, AttemptStep::Moved(2));
        attempt.answer("q3", "C".into());

        let step = attempt.next().await;

        assert_eq!(
            step,
            AttemptStep::Submitted(SubmitOutcome::Submitted(Route::Results("s1".into())))
        );
        let calls = api.calls();
        assert_eq!(calls.responses.len(), 2);
        assert_eq!(calls.responses[0].1, "q1");
        assert_eq!(calls.responses[1].1, "q3");
        assert!(attempt.answers().is_empty());
        assert_eq!(attempt.current_index(), 2);
    }

    #[tokio::test]
    async fn failed_submission_keeps_answers() {
        let api = Arc::new(MockExamApi {
            fail_response_for: Some("q1".to_string()),
            ..MockExamApi::with_questions(&["q1"])
        });
        let (mut attempt, _) = attempt(api).await;
        attempt.answer("q1", "A".into());

        let outcome = attempt.finish().await;

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert!(!attempt.is_finished());
        assert_eq!(attempt.answers().get("q1"), Some(&AnswerValue::from("A")));
    }

    #[tokio::test]
    async fn restores_answers_cached_by_a_previous_run() {
        let api = Arc::new(MockExamApi::with_questions(&["q1", "q2"]));
        let cache = AnswerCache::new(Arc::new(MemoryStore::new()));
        let mut saved = AnswerMap::new();
        saved.insert("q2".into(), "B".into());
        cache.save("s1", &saved).unwrap();

        let attempt = ExamAttempt::begin(api, cache, Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(attempt.answers(), &saved);
    }

    #[tokio::test]
    async fn answers_after_finish_are_ignored() {
        let api = Arc::new(MockExamApi::with_questions(&["q1"]));
        let (mut attempt, _) = attempt(api).await;
        attempt.answer("q1", "A".into());
        attempt.finish().await;

        attempt.answer("q1", "B".into());

        assert!(attempt.answers().is_empty());
        assert_eq!(attempt.finish().await, SubmitOutcome::AlreadySubmitted);
    }

    #[tokio::test(start_paused = true)]
    async fn time_up_submits_and_button_then_no_ops() {
        let api = Arc::new(MockExamApi::with_questions(&["q1", "q2"]));
        let (mut attempt, _) = attempt(api.clone()).await;
        attempt.answer("q2", "B".into());

        let outcome = attempt.run_out_clock().await;

        assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
        assert_eq!(attempt.finish().await, SubmitOutcome::AlreadySubmitted);
        assert_eq!(api.calls().responses.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_write_does_not_outlive_a_slow_submission() {
        let api = Arc::new(MockExamApi {
            response_delay: Some(Duration::from_millis(500)),
            end_session_delay: Some(Duration::from_millis(800)),
            ..MockExamApi::with_questions(&["q1"])
        });
        let (mut attempt, cache) = attempt(api).await;
        attempt.answer("q1", "A".into());

        let outcome = attempt.finish().await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
        assert_eq!(cache.load("s1"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_submission_saves_answers_again() {
        let api = Arc::new(MockExamApi {
            fail_response_for: Some("q1".to_string()),
            ..MockExamApi::with_questions(&["q1"])
        });
        let (mut attempt, cache) = attempt(api).await;
        attempt.answer("q1", "A".into());

        attempt.finish().await;
        tokio::time::sleep(Duration::from_secs(2)).await;

        let mut expected = AnswerMap::new();
        expected.insert("q1".into(), "A".into());
        assert_eq!(cache.load("s1"), Some(expected));
    }

    #[tokio::test]
    async fn right_arrow_on_last_question_submits() {
        let api = Arc::new(MockExamApi::with_questions(&["q1"]));
        let (mut attempt, _) = attempt(api).await;

        let step = attempt.handle_key(&KeyPress::plain("ArrowRight")).await;

        assert!(matches!(
            step,
            Some(AttemptStep::Submitted(SubmitOutcome::Submitted(_)))
        ));
        assert_eq!(attempt.handle_key(&KeyPress::plain("ArrowRight")).await, Some(AttemptStep::Stayed));
    }
}
