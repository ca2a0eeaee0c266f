//! Explicit per-request context.
//!
//! The source system hangs query-latency accounting and precomputed-DB
//! hit/miss counters off ambient, process-wide state (a `ContextVar`).
//! Here that state is an explicit value threaded through calls instead,
//! per the "avoid process-wide singletons" design note.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Per-topic hit/miss counters plus store latency, scoped to one inbound
/// request. Cheaply cloneable (`Arc`-backed maps) so it can be handed to
/// concurrently fanned-out mining calls and still accumulate into one place.
#[derive(Debug, Default, Clone)]
pub struct RequestContext {
    hits: std::sync::Arc<DashMap<&'static str, AtomicU64>>,
    misses: std::sync::Arc<DashMap<&'static str, AtomicU64>>,
    store_latency: std::sync::Arc<DashMap<&'static str, AtomicU64>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self, topic: &'static str) {
        self.hits
            .entry(topic)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self, topic: &'static str) {
        self.misses
            .entry(topic)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self, topic: &str) -> u64 {
        self.hits
            .get(topic)
            .map(|v| v.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn misses(&self, topic: &str) -> u64 {
        self.misses
            .get(topic)
            .map(|v| v.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Times `f` and accumulates the elapsed milliseconds under `store`.
    pub async fn timed<F, Fut, T>(&self, store: &'static str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let start = Instant::now();
        let out = f().await;
        let elapsed = start.elapsed();
        self.store_latency
            .entry(store)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
        out
    }

    pub fn total_latency(&self, store: &str) -> Duration {
        Duration::from_millis(
            self.store_latency
                .get(store)
                .map(|v| v.load(Ordering::Relaxed))
                .unwrap_or(0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accumulates_hits_misses_and_latency() {
        let ctx = RequestContext::new();
        ctx.record_hit("pr_facts");
        ctx.record_hit("pr_facts");
        ctx.record_miss("pr_facts");
        assert_eq!(ctx.hits("pr_facts"), 2);
        assert_eq!(ctx.misses("pr_facts"), 1);

        ctx.timed("mdb", || async {
            tokio::time::sleep(Duration::from_millis(5)).await;
        })
        .await;
        assert!(ctx.total_latency("mdb") >= Duration::from_millis(5));
    }
}
