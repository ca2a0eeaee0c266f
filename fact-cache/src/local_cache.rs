//! Short-TTL, fixed-capacity process-local cache tier.
//!
//! Sits in front of the durable precomputed store purely to absorb bursts
//! of identical requests within one process lifetime; it is never the
//! system of record (SPEC_FULL §4.5). A process restart loses it with no
//! correctness impact.

use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry {
    payload: Vec<u8>,
    inserted_at: Instant,
}

pub struct ProcessLocalCache {
    capacity: usize,
    ttl: Duration,
    entries: DashMap<String, Entry>,
    /// Insertion order, oldest first, for capacity-based eviction. Guarded
    /// separately from `entries` since eviction order and entry storage are
    /// independent concerns; a key can appear at most once.
    order: Mutex<VecDeque<String>>,
}

impl ProcessLocalCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            entries: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entry = self.entries.get(key)?;
        if entry.inserted_at.elapsed() > self.ttl {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        Some(entry.payload.clone())
    }

    pub fn put(&self, key: String, payload: Vec<u8>) {
        let is_new = !self.entries.contains_key(&key);
        self.entries.insert(
            key.clone(),
            Entry {
                payload,
                inserted_at: Instant::now(),
            },
        );
        if is_new {
            let mut order = self.order.lock().unwrap();
            order.push_back(key);
            while order.len() > self.capacity {
                if let Some(oldest) = order.pop_front() {
                    self.entries.remove(&oldest);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let cache = ProcessLocalCache::new(2, Duration::from_secs(60));
        cache.put("a".into(), vec![1]);
        cache.put("b".into(), vec![2]);
        cache.put("c".into(), vec![3]);
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn expires_entries_past_ttl() {
        let cache = ProcessLocalCache::new(8, Duration::from_millis(1));
        cache.put("a".into(), vec![1]);
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("a").is_none());
    }
}
