// src/lib.rs

pub mod api;
pub mod config;
pub mod error;
pub mod lockdown;
pub mod models;
pub mod session;
pub mod storage;
pub mod ui;

// Re-export specific items for convenience if needed
pub use api::{ExamApi, HttpExamApi};
pub use session::ExamAttempt;
