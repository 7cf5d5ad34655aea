// src/models/fraud.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Violations that feed the lockdown counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationType {
    FullscreenExit,
    TabChange,
}

impl ViolationType {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationType::FullscreenExit => "FULLSCREEN_EXIT",
            ViolationType::TabChange => "TAB_CHANGE",
        }
    }

    /// Human-readable description included in reports and warnings.
    pub fn description(self) -> &'static str {
        match self {
            ViolationType::FullscreenExit => "Left full screen mode.",
            ViolationType::TabChange => "Switched tab or window.",
        }
    }
}

/// Payload for the fraud-reporting collaborator.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct FraudReport {
    #[serde(rename = "sessionId")]
    #[validate(length(min = 1))]
    pub session_id: String,
    #[serde(rename = "type")]
    pub violation: ViolationType,
    #[validate(length(max = 500))]
    pub details: Option<String>,
}

/// Events reported by the security guard. They never count as violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityEventType {
    ExitFullscreen,
    WindowHidden,
    RightClickPrevented,
    KeyCombinationBlocked,
}

/// Payload for the security-event collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct SecurityEvent {
    #[serde(rename = "eventType")]
    pub event_type: SecurityEventType,
    pub details: serde_json::Value,
}
