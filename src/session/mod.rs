// src/session/mod.rs

//! One exam attempt: loading, answers, navigation, countdown and submission.

pub mod answers;
pub mod attempt;
pub mod controller;
pub mod navigation;
pub mod submission;
pub mod timer;

pub use answers::AnswerBook;
pub use attempt::{AttemptStep, ExamAttempt};
pub use controller::{LoadedExam, SessionController};
pub use navigation::{NavOutcome, Navigator};
pub use submission::{Submission, SubmissionState, SubmitOutcome};
pub use timer::ExamTimer;
