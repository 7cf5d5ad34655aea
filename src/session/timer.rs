// src/session/timer.rs

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{sync::oneshot, task::JoinHandle};

/// Countdown for the exam duration, ticking once per second.
///
/// The ticking task is owned by the timer: dropping it (or calling `cancel`)
/// stops the countdown and the time-up signal never fires.
pub struct ExamTimer {
    remaining: Arc<AtomicU64>,
    time_up: Option<oneshot::Receiver<()>>,
    handle: JoinHandle<()>,
}

impl ExamTimer {
    pub fn start(duration_minutes: u32) -> Self {
        Self::start_seconds(u64::from(duration_minutes) * 60)
    }

    pub fn start_seconds(total_seconds: u64) -> Self {
        let remaining = Arc::new(AtomicU64::new(total_seconds));
        let (tx, rx) = oneshot::channel();

        let counter = remaining.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            // The first tick completes immediately.
            ticker.tick().await;
            while counter.load(Ordering::SeqCst) > 0 {
                ticker.tick().await;
                counter.fetch_sub(1, Ordering::SeqCst);
            }
            let _ = tx.send(());
        });

        Self {
            remaining,
            time_up: Some(rx),
            handle,
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining.load(Ordering::SeqCst)
    }

    /// Remaining time as `MM:SS`.
    pub fn formatted(&self) -> String {
        format_time(self.remaining_secs())
    }

    /// Resolves once the countdown reaches zero. Resolves only once; later
    /// calls, or calls after `cancel`, never complete.
    pub async fn expired(&mut self) {
        self.time_up().await
    }

    /// Detaches the time-up signal so it can be awaited without borrowing the
    /// timer. Only the first caller gets a signal that can fire.
    pub fn time_up(&mut self) -> impl Future<Output = ()> + Send + use<> {
        let signal = self.time_up.take();
        async move {
            let fired = match signal {
                Some(rx) => rx.await.is_ok(),
                None => false,
            };
            if !fired {
                std::future::pending::<()>().await;
            }
            tracing::info!("Exam time is up");
        }
    }

    pub fn cancel(&mut self) {
        self.handle.abort();
        self.time_up = None;
    }
}

impl Drop for ExamTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
