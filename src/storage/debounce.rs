// src/storage/debounce.rs

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::{config::DEFAULT_SAVE_DEBOUNCE_MS, models::question::AnswerMap, storage::AnswerCache};

/// Coalesces bursts of answer edits into a single cache write.
///
/// Each `schedule` cancels the write still waiting from the previous call, so
/// only the latest map is written once the quiet period elapses. Dropping the
/// saver cancels whatever is pending.
pub struct DebouncedSaver {
    cache: AnswerCache,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl DebouncedSaver {
    pub fn new(cache: AnswerCache) -> Self {
        Self::with_delay(cache, Duration::from_millis(DEFAULT_SAVE_DEBOUNCE_MS))
    }

    pub fn with_delay(cache: AnswerCache, delay: Duration) -> Self {
        Self {
            cache,
            delay,
            pending: None,
        }
    }

    pub fn cache(&self) -> &AnswerCache {
        &self.cache
    }

    pub fn schedule(&mut self, session_id: &str, answers: AnswerMap) {
        self.cancel();

        let cache = self.cache.clone();
        let delay = self.delay;
        let session_id = session_id.to_string();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = cache.save(&session_id, &answers) {
                tracing::error!("Failed to cache answers for session {}: {}", session_id, e);
            }
        }));
    }

    /// Drops the pending write, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for DebouncedSaver {
    fn drop(&mut self) {
        self.cancel();
    }
}
