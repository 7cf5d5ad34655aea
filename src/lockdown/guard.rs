// src/lockdown/guard.rs

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::task::JoinSet;

use crate::{
    api::ExamApi,
    models::fraud::{SecurityEvent, SecurityEventType},
    ui::{HostSignal, KeyPress, Visibility},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardVerdict {
    /// Let the host run the default action.
    Allow,
    /// The host must suppress the default action.
    Block,
}

/// Blocks developer tools, copy/paste, view-source and the context menu.
///
/// Every blocked attempt, full-screen exit and hidden window is reported as a
/// security event. Nothing here counts towards lockdown violations.
pub struct SecurityGuard {
    api: Arc<dyn ExamApi>,
    reports: JoinSet<()>,
}

impl SecurityGuard {
    pub fn new(api: Arc<dyn ExamApi>) -> Self {
        tracing::info!("Security monitoring enabled");
        Self {
            api,
            reports: JoinSet::new(),
        }
    }

    pub fn is_blocked_key(key: &KeyPress) -> bool {
        if key.key == "F12" {
            return true;
        }
        (key.ctrl || key.meta) && matches!(key.key.to_ascii_lowercase().as_str(), "c" | "v" | "u")
    }

    pub fn on_signal(&mut self, signal: &HostSignal) -> GuardVerdict {
        let timestamp = Utc::now().to_rfc3339();
        match signal {
            HostSignal::KeyDown(key) if Self::is_blocked_key(key) => {
                self.report(
                    SecurityEventType::KeyCombinationBlocked,
                    json!({
                        "key": key.key,
                        "ctrlKey": key.ctrl,
                        "metaKey": key.meta,
                        "timestamp": timestamp,
                    }),
                );
                GuardVerdict::Block
            }
            HostSignal::ContextMenu { x, y } => {
                self.report(
                    SecurityEventType::RightClickPrevented,
                    json!({ "timestamp": timestamp, "mouseX": x, "mouseY": y }),
                );
                GuardVerdict::Block
            }
            HostSignal::FullscreenChanged { active: false } => {
                self.report(
                    SecurityEventType::ExitFullscreen,
                    json!({ "timestamp": timestamp }),
                );
                GuardVerdict::Allow
            }
            HostSignal::VisibilityChanged(Visibility::Hidden) => {
                self.report(
                    SecurityEventType::WindowHidden,
                    json!({ "timestamp": timestamp }),
                );
                GuardVerdict::Allow
            }
            _ => GuardVerdict::Allow,
        }
    }

    fn report(&mut self, event_type: SecurityEventType, details: serde_json::Value) {
        tracing::info!("Security event: {:?} {}", event_type, details);
        let api = self.api.clone();
        self.reports.spawn(async move {
            let event = SecurityEvent {
                event_type,
                details,
            };
            if let Err(e) = api.report_security_event(&event).await {
                tracing::error!("Failed to send security event: {}", e);
            }
        });
    }

    /// Waits for reports still in flight.
    pub async fn flush(&mut self) {
        while self.reports.join_next().await.is_some() {}
    }
}

impl Drop for SecurityGuard {
    fn drop(&mut self) {
        self.reports.detach_all();
    }
}
