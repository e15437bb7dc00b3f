//! In-process key/value store with per-entry expiry.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> Entry<V> {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Expired entries behave as absent and are dropped when touched.
pub struct TtlStore<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V> Default for TtlStore<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> TtlStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry<V>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stores `value`, replacing any previous entry and its expiry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.lock().insert(key.into(), entry);
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.lock();
        match entries.get(key).map(|entry| entry.is_live(now)) {
            Some(true) => entries.get(key).map(|entry| entry.value.clone()),
            Some(false) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn remove(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        self.lock()
            .remove(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value)
    }

    /// Removes the entry only if it is live and `matches` accepts it.
    pub fn take_if(&self, key: &str, matches: impl FnOnce(&V) -> bool) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.lock();
        let accept = match entries.get(key) {
            Some(entry) if entry.is_live(now) => matches(&entry.value),
            Some(_) => true,
            None => false,
        };
        if !accept {
            return None;
        }
        entries
            .remove(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value)
    }

    /// Drops every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let store = TtlStore::new();
        store.set("k", 1, Duration::from_secs(10));
        assert_eq!(store.get("k"), Some(1));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(store.get("k"), None);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_replaces_value_and_expiry() {
        let store = TtlStore::new();
        store.set("k", "old", Duration::from_secs(5));
        tokio::time::advance(Duration::from_secs(4)).await;
        store.set("k", "new", Duration::from_secs(5));
        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(store.get("k"), Some("new"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let store = TtlStore::new();
        store.set("short", 1, Duration::from_secs(1));
        store.set("long", 2, Duration::from_secs(100));
        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.remove("long"), Some(2));
        assert_eq!(store.remove("long"), None);
    }

    #[test]
    fn test_take_if() {
        let store = TtlStore::new();
        store.set("otp", "123456".to_string(), Duration::from_secs(60));

        assert_eq!(store.take_if("otp", |v| v == "000000"), None);
        assert_eq!(store.get("otp").as_deref(), Some("123456"));
        assert_eq!(store.take_if("otp", |v| v == "123456").as_deref(), Some("123456"));
        assert_eq!(store.get("otp"), None);
    }
}
