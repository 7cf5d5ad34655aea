// src/lockdown/monitor.rs

use crate::{
    models::fraud::{FraudReport, ViolationType},
    ui::{HostSignal, Notice, Visibility},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockdownState {
    NotFullscreen,
    FullscreenActive,
    /// Violation limit reached. Every later signal is ignored.
    Terminated,
}

/// Work the monitor asks its owner to carry out.
#[derive(Debug, Clone)]
pub enum LockdownEffect {
    Report(FraudReport),
    Notify(Notice),
    /// Emitted exactly once, on the transition to `Terminated`.
    AutoSubmit,
}

/// Counts full-screen exits and tab switches for one session.
///
/// | state            | signal              | next             |
/// |------------------|---------------------|------------------|
/// | NotFullscreen    | fullscreen on       | FullscreenActive |
/// | FullscreenActive | fullscreen off      | NotFullscreen (+1 violation) |
/// | any live state   | hidden              | unchanged (+1 violation) |
/// | any live state   | limit reached       | Terminated       |
/// | Terminated       | anything            | Terminated       |
#[derive(Debug, Clone)]
pub struct LockdownMonitor {
    session_id: String,
    max_violations: u32,
    violations: u32,
    state: LockdownState,
}

impl LockdownMonitor {
    pub fn new(session_id: &str, max_violations: u32) -> Self {
        Self {
            session_id: session_id.to_string(),
            max_violations,
            violations: 0,
            state: LockdownState::NotFullscreen,
        }
    }

    pub fn state(&self) -> LockdownState {
        self.state
    }

    pub fn violations(&self) -> u32 {
        self.violations
    }

    pub fn max_violations(&self) -> u32 {
        self.max_violations
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The "please enter full screen" overlay is shown in this case.
    pub fn needs_fullscreen_prompt(&self) -> bool {
        self.state == LockdownState::NotFullscreen
    }

    pub fn on_signal(&mut self, signal: &HostSignal) -> Vec<LockdownEffect> {
        if self.state == LockdownState::Terminated {
            return Vec::new();
        }

        match signal {
            HostSignal::FullscreenChanged { active: true } => {
                self.state = LockdownState::FullscreenActive;
                Vec::new()
            }
            HostSignal::FullscreenChanged { active: false } => {
                if self.state != LockdownState::FullscreenActive {
                    return Vec::new();
                }
                self.state = LockdownState::NotFullscreen;
                self.record(ViolationType::FullscreenExit)
            }
            HostSignal::VisibilityChanged(Visibility::Hidden) => {
                self.record(ViolationType::TabChange)
            }
            HostSignal::VisibilityChanged(Visibility::Visible)
            | HostSignal::KeyDown(_)
            | HostSignal::ContextMenu { .. } => Vec::new(),
        }
    }

    fn record(&mut self, violation: ViolationType) -> Vec<LockdownEffect> {
        if self.violations >= self.max_violations {
            return Vec::new();
        }
        self.violations += 1;

        tracing::warn!(
            "Violation {} for session {} ({}/{})",
            violation.as_str(),
            self.session_id,
            self.violations,
            self.max_violations
        );

        let mut effects = vec![
            LockdownEffect::Report(FraudReport {
                session_id: self.session_id.clone(),
                violation,
                details: Some(violation.description().to_string()),
            }),
            LockdownEffect::Notify(Notice::warning(format!(
                "Suspicious behavior detected: {} ({}/{})",
                violation.description(),
                self.violations,
                self.max_violations
            ))),
        ];

        if self.violations >= self.max_violations {
            self.state = LockdownState::Terminated;
            effects.push(LockdownEffect::Notify(Notice::error(
                "Too many violations detected. The exam will be closed.",
            )));
            effects.push(LockdownEffect::AutoSubmit);
        }

        effects
    }
}
