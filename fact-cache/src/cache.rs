//! The fact cache proper: `get`/`put` over a fingerprint, backed by the
//! process-local tier and the durable precomputed store, with at-most-one
//! concurrent build per fingerprint.

use crate::error::FactCacheResult;
use crate::local_cache::ProcessLocalCache;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use storage_gateway::model::FactCacheEntry;
use storage_gateway::{PrecomputedStore, RequestContext};
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

pub const DEFAULT_LOCAL_CAPACITY: usize = 4096;
pub const DEFAULT_LOCAL_TTL: Duration = Duration::from_secs(60);

pub struct FactCache {
    durable: Arc<dyn PrecomputedStore>,
    local: ProcessLocalCache,
    format_version: u32,
    build_locks: DashMap<String, Arc<AsyncMutex<()>>>,
}

impl FactCache {
    pub fn new(durable: Arc<dyn PrecomputedStore>, format_version: u32) -> Self {
        Self {
            durable,
            local: ProcessLocalCache::new(DEFAULT_LOCAL_CAPACITY, DEFAULT_LOCAL_TTL),
            format_version,
            build_locks: DashMap::new(),
        }
    }

    pub fn with_local_tier(mut self, capacity: usize, ttl: Duration) -> Self {
        self.local = ProcessLocalCache::new(capacity, ttl);
        self
    }

    /// `get(fingerprint) -> bytes | miss`. A format-version mismatch on the
    /// durable entry is treated as a miss.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        topic: &'static str,
        fingerprint: &str,
    ) -> FactCacheResult<Option<Vec<u8>>> {
        if let Some(payload) = self.local.get(fingerprint) {
            ctx.record_hit(topic);
            return Ok(Some(payload));
        }

        match self.durable.get_fact(fingerprint).await? {
            Some(entry) if entry.format_version == self.format_version => {
                ctx.record_hit(topic);
                self.local.put(fingerprint.to_string(), entry.payload.clone());
                Ok(Some(entry.payload))
            }
            Some(_stale) => {
                debug!(fingerprint, "durable fact entry is stale, treating as miss");
                ctx.record_miss(topic);
                Ok(None)
            }
            None => {
                ctx.record_miss(topic);
                Ok(None)
            }
        }
    }

    pub async fn put(&self, fingerprint: &str, payload: Vec<u8>) -> FactCacheResult<()> {
        self.durable
            .put_fact(FactCacheEntry {
                fingerprint: fingerprint.to_string(),
                payload: payload.clone(),
                format_version: self.format_version,
                updated_at: chrono::Utc::now(),
            })
            .await?;
        self.local.put(fingerprint.to_string(), payload);
        Ok(())
    }

    /// Returns the cached payload for `fingerprint`, or runs `build` exactly
    /// once across all concurrent callers and publishes its result.
    pub async fn get_or_build<F, Fut>(
        &self,
        ctx: &RequestContext,
        topic: &'static str,
        fingerprint: &str,
        build: F,
    ) -> FactCacheResult<Vec<u8>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FactCacheResult<Vec<u8>>>,
    {
        if let Some(payload) = self.get(ctx, topic, fingerprint).await? {
            return Ok(payload);
        }

        let lock = self
            .build_locks
            .entry(fingerprint.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Re-check: a concurrent caller may have just published the build
        // this call was about to start.
        if let Some(payload) = self.get(ctx, topic, fingerprint).await? {
            return Ok(payload);
        }

        let payload = build().await?;
        self.put(fingerprint, payload.clone()).await?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storage_gateway::mock::InMemoryPrecomputedStore;

    #[tokio::test]
    async fn coalesces_concurrent_builds_for_same_fingerprint() {
        let cache = Arc::new(FactCache::new(Arc::new(InMemoryPrecomputedStore::new()), 1));
        let build_calls = Arc::new(AtomicUsize::new(0));
        let ctx = RequestContext::new();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let build_calls = build_calls.clone();
            let ctx = ctx.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_build(&ctx, "pr_facts", "fp-1", || {
                        let build_calls = build_calls.clone();
                        async move {
                            build_calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok(vec![1, 2, 3])
                        }
                    })
                    .await
                    .unwrap()
            }));
        }

        for h in handles {
            assert_eq!(h.await.unwrap(), vec![1, 2, 3]);
        }
        assert_eq!(build_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_format_version_is_a_miss() {
        let durable = Arc::new(InMemoryPrecomputedStore::new());
        durable
            .put_fact(FactCacheEntry {
                fingerprint: "fp-2".into(),
                payload: vec![9],
                format_version: 0,
                updated_at: chrono::Utc::now(),
            })
            .await
            .unwrap();
        let cache = FactCache::new(durable, 1);
        let ctx = RequestContext::new();
        assert!(cache.get(&ctx, "pr_facts", "fp-2").await.unwrap().is_none());
        assert_eq!(ctx.misses("pr_facts"), 1);
    }
}
