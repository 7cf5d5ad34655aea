// src/storage/cache.rs

use std::sync::{
    Arc, LazyLock,
    atomic::{AtomicI64, Ordering},
};

use chrono::{Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    config::CACHE_TTL_HOURS, error::AppError, models::question::AnswerMap,
    storage::KeyValueStore,
};

static ANSWER_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^exam-.+-answers$").expect("answer key pattern is valid"));

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(now_millis),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// What is written under `exam-{session_id}-answers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedRecord {
    pub answers: AnswerMap,
    /// Epoch milliseconds of the write.
    pub timestamp: i64,
}

/// Session-scoped answer cache with a time-to-live.
///
/// Expired or unreadable records are removed the moment they are seen and
/// are never handed back to callers.
#[derive(Clone)]
pub struct AnswerCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl AnswerCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl: Duration::hours(CACHE_TTL_HOURS),
        }
    }

    pub fn key_for(session_id: &str) -> String {
        format!("exam-{}-answers", session_id)
    }

    fn is_expired(&self, record: &CachedRecord) -> bool {
        // Out-of-range timestamps count as expired.
        match self.clock.now_millis().checked_sub(record.timestamp) {
            Some(age) => age >= self.ttl.num_milliseconds(),
            None => true,
        }
    }

    /// Returns saved answers for the session, or `None` when there is nothing usable.
    pub fn load(&self, session_id: &str) -> Option<AnswerMap> {
        let key = Self::key_for(session_id);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read cached answers for {}: {}", session_id, e);
                return None;
            }
        };

        match serde_json::from_str::<CachedRecord>(&raw) {
            Ok(record) if !self.is_expired(&record) => Some(record.answers),
            Ok(_) => {
                tracing::info!("Discarding expired answers for session {}", session_id);
                self.discard(&key);
                None
            }
            Err(e) => {
                tracing::error!("Corrupted cached answers for session {}: {}", session_id, e);
                self.discard(&key);
                None
            }
        }
    }

    pub fn save(&self, session_id: &str, answers: &AnswerMap) -> Result<(), AppError> {
        let record = CachedRecord {
            answers: answers.clone(),
            timestamp: self.clock.now_millis(),
        };
        let raw = serde_json::to_string(&record)?;
        self.store.set(&Self::key_for(session_id), &raw)?;
        tracing::debug!("Cached {} answers for session {}", answers.len(), session_id);
        Ok(())
    }

    pub fn clear(&self, session_id: &str) -> Result<(), AppError> {
        self.store.remove(&Self::key_for(session_id))
    }

    /// Drops every expired or unparsable answer record. Returns how many were removed.
    pub fn sweep(&self) -> Result<usize, AppError> {
        let mut removed = 0;
        for key in self.store.keys()? {
            if !ANSWER_KEY.is_match(&key) {
                continue;
            }
            let Some(raw) = self.store.get(&key)? else {
                continue;
            };
            let stale = match serde_json::from_str::<CachedRecord>(&raw) {
                Ok(record) => self.is_expired(&record),
                Err(e) => {
                    tracing::error!("Error parsing cached data for key {}: {}", key, e);
                    true
                }
            };
            if stale {
                self.store.remove(&key)?;
                tracing::info!("Removed expired exam data for key: {}", key);
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn discard(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            tracing::warn!("Failed to remove stale cache entry {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::question::AnswerValue, storage::MemoryStore};

    const T0: i64 = 1_700_000_000_000;

    fn cache() -> (AnswerCache, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(T0));
        (
            AnswerCache::with_clock(store.clone(), clock.clone()),
            store,
            clock,
        )
    }

    fn answers() -> AnswerMap {
        let mut map = AnswerMap::new();
        map.insert("q1".into(), AnswerValue::from("A"));
        map.insert("q2".into(), AnswerValue::Multiple(vec!["B".into(), "C".into()]));
        map
    }

    #[test]
    fn load_returns_fresh_record() {
        let (cache, _, clock) = cache();
        cache.save("41", &answers()).unwrap();
        clock.advance(Duration::hours(23));
        assert_eq!(cache.load("41"), Some(answers()));
    }

    #[test]
    fn expired_record_is_never_returned_and_is_deleted() {
        let (cache, store, clock) = cache();
        cache.save("41", &answers()).unwrap();
        clock.advance(Duration::hours(24));

        assert_eq!(cache.load("41"), None);
        assert!(store.get("exam-41-answers").unwrap().is_none());
    }

    #[test]
    fn corrupted_record_loads_as_nothing_and_is_removed() {
        let (cache, store, _) = cache();
        store.set("exam-41-answers", "{\"answers\": {\"q1\": ").unwrap();

        assert_eq!(cache.load("41").unwrap_or_default(), AnswerMap::new());
        assert!(store.get("exam-41-answers").unwrap().is_none());
    }

    #[test]
    fn out_of_range_timestamp_is_discarded_without_panicking() {
        let (cache, store, _) = cache();
        store
            .set("exam-41-answers", &format!(r#"{{"answers":{{"q1":"A"}},"timestamp":{}}}"#, i64::MIN))
            .unwrap();
        store
            .set("exam-42-answers", &format!(r#"{{"answers":{{}},"timestamp":{}}}"#, i64::MIN))
            .unwrap();

        assert_eq!(cache.load("41"), None);
        assert!(store.get("exam-41-answers").unwrap().is_none());
        assert_eq!(cache.sweep().unwrap(), 1);
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn sweep_removes_only_stale_exam_records() {
        let (cache, store, clock) = cache();
        cache.save("old", &answers()).unwrap();
        clock.advance(Duration::hours(25));
        cache.save("fresh", &answers()).unwrap();
        store.set("exam-broken-answers", "not json").unwrap();
        store.set("unrelated", "not json either").unwrap();

        assert_eq!(cache.sweep().unwrap(), 2);

        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["exam-fresh-answers", "unrelated"]);
    }

    #[test]
    fn stored_record_has_wire_shape() {
        let (cache, store, _) = cache();
        cache.save("41", &answers()).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&store.get("exam-41-answers").unwrap().unwrap()).unwrap();
        assert_eq!(raw["timestamp"], T0);
        assert_eq!(raw["answers"]["q2"], serde_json::json!(["B", "C"]));
    }
}
