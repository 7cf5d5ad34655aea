// src/lockdown/session.rs

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::{
    api::ExamApi,
    error::AppError,
    lockdown::{LockdownEffect, LockdownMonitor, LockdownState},
    ui::{HostSignal, Notice, Route},
};

/// The window/document side of the lockdown, implemented by the host shell.
pub trait LockdownHost: Send + Sync {
    fn request_fullscreen(&self) -> Result<(), AppError>;
    fn exit_fullscreen(&self);
    fn is_fullscreen(&self) -> bool;

    /// Start forwarding full-screen and visibility signals.
    fn attach_listeners(&self);
    fn detach_listeners(&self);
}

/// What the host should do after a signal was handled.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LockdownReaction {
    pub notices: Vec<Notice>,
    pub route: Option<Route>,
}

/// Lockdown for one exam session.
///
/// Created with [`LockdownSession::engage`], which attaches the host listeners
/// and asks for full screen. Listeners are detached and full screen left
/// exactly once, by [`LockdownSession::release`] or on drop, whichever comes
/// first.
pub struct LockdownSession {
    monitor: LockdownMonitor,
    api: Arc<dyn ExamApi>,
    host: Arc<dyn LockdownHost>,
    reports: JoinSet<Result<(), String>>,
    released: bool,
}

impl LockdownSession {
    pub fn engage(
        session_id: &str,
        max_violations: u32,
        api: Arc<dyn ExamApi>,
        host: Arc<dyn LockdownHost>,
    ) -> (Self, LockdownReaction) {
        let mut monitor = LockdownMonitor::new(session_id, max_violations);
        let mut reaction = LockdownReaction::default();

        host.attach_listeners();
        match host.request_fullscreen() {
            Ok(()) => {
                monitor.on_signal(&HostSignal::FullscreenChanged { active: true });
            }
            Err(e) => {
                tracing::error!("Could not enter full screen: {}", e);
                reaction.notices.push(Notice::error(
                    "Could not enter full screen mode. Please allow full screen to continue the exam.",
                ));
            }
        }

        tracing::info!("Lockdown engaged for session {}", session_id);

        let session = Self {
            monitor,
            api,
            host,
            reports: JoinSet::new(),
            released: false,
        };
        (session, reaction)
    }

    pub fn state(&self) -> LockdownState {
        self.monitor.state()
    }

    pub fn violations(&self) -> u32 {
        self.monitor.violations()
    }

    pub fn needs_fullscreen_prompt(&self) -> bool {
        !self.released && self.monitor.needs_fullscreen_prompt()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Feeds one host signal through the monitor and carries out its effects.
    ///
    /// Violation reports run in the background; their failures surface as
    /// notices on a later call or from [`LockdownSession::settle_reports`].
    pub async fn handle(&mut self, signal: &HostSignal) -> LockdownReaction {
        let mut reaction = LockdownReaction::default();
        if self.released {
            return reaction;
        }

        for effect in self.monitor.on_signal(signal) {
            match effect {
                LockdownEffect::Report(report) => {
                    let api = self.api.clone();
                    self.reports.spawn(async move {
                        api.report_fraud(&report).await.map_err(|e| {
                            tracing::error!("Failed to report violation: {}", e);
                            e.user_message()
                        })
                    });
                }
                LockdownEffect::Notify(notice) => reaction.notices.push(notice),
                LockdownEffect::AutoSubmit => {
                    let session_id = self.monitor.session_id().to_string();
                    match self.api.auto_submit(&session_id).await {
                        Ok(()) => reaction.notices.push(Notice::success(
                            "Exam closed automatically due to violations.",
                        )),
                        Err(e) => {
                            tracing::error!("Auto-submit failed for session {}: {}", session_id, e);
                            reaction
                                .notices
                                .push(Notice::error("Failed to close the exam automatically."));
                        }
                    }
                    // Finished view regardless of the auto-submit result.
                    reaction.route = Some(Route::Finished(session_id));
                }
            }
        }

        while let Some(done) = self.reports.try_join_next() {
            push_report_failure(&mut reaction.notices, done);
        }
        reaction
    }

    /// Waits for every in-flight violation report.
    pub async fn settle_reports(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Some(done) = self.reports.join_next().await {
            push_report_failure(&mut notices, done);
        }
        notices
    }

    /// Detaches listeners and leaves full screen. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        self.host.detach_listeners();
        if self.host.is_fullscreen() {
            self.host.exit_fullscreen();
        }
        // Reports already sent are allowed to finish.
        self.reports.detach_all();
        tracing::info!("Lockdown released for session {}", self.monitor.session_id());
    }
}

impl Drop for LockdownSession {
    fn drop(&mut self) {
        self.release();
    }
}

fn push_report_failure(
    notices: &mut Vec<Notice>,
    done: Result<Result<(), String>, tokio::task::JoinError>,
) {
    match done {
        Ok(Ok(())) => {}
        Ok(Err(_)) => notices.push(Notice::error("Failed to record violation.")),
        Err(e) => tracing::error!("Violation report task failed: {}", e),
    }
}
