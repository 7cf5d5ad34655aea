// src/ui.rs

//! Values exchanged with the host shell: signals in, notices and routes out.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// A key press as delivered by the host, before any default action runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyPress {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn ctrl(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: true,
            meta: false,
        }
    }

    pub fn meta(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: false,
            meta: true,
        }
    }
}

/// Browser/window level events the host forwards while an exam is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSignal {
    FullscreenChanged { active: bool },
    VisibilityChanged(Visibility),
    KeyDown(KeyPress),
    ContextMenu { x: i32, y: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast-style message for the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Where the host should navigate next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/exam/result/{session_id}`
    Results(String),
    /// `/exam-finished/{session_id}`
    Finished(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Results(id) => format!("/exam/result/{}", id),
            Route::Finished(id) => format!("/exam-finished/{}", id),
        }
    }
}
