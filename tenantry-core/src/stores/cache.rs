use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{MtResult, MultiTenantError};
use crate::store::MultiTenantStore;
use crate::tenant::TenantInfo;

/// Byte-value cache backend: async get/set/remove plus a refresh that slides
/// an entry's expiration without reading it.
#[async_trait]
pub trait DistributedCache: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        sliding_expiration: Option<Duration>,
    ) -> anyhow::Result<()>;
    async fn refresh(&self, key: &str) -> anyhow::Result<()>;
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// Store backed by a [`DistributedCache`].
///
/// Each tenant is serialized under two cache keys, one per lookup axis
/// (`{prefix}id__{id}` and `{prefix}key__{key}`). A lookup through one axis
/// refreshes the paired entry so both expire together. Enumeration is not
/// possible over a cache, so `get_all` is unsupported.
pub struct DistributedCacheStore {
    cache: Arc<dyn DistributedCache>,
    prefix: String,
    sliding_expiration: Option<Duration>,
}

impl DistributedCacheStore {
    pub fn new(
        cache: Arc<dyn DistributedCache>,
        prefix: impl Into<String>,
        sliding_expiration: Option<Duration>,
    ) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
            sliding_expiration,
        }
    }

    fn id_key(&self, id: &str) -> String {
        format!("{}id__{}", self.prefix, id)
    }

    fn key_key(&self, key: &str) -> String {
        format!("{}key__{}", self.prefix, key)
    }

    async fn write(&self, tenant: &TenantInfo) -> MtResult<()> {
        let bytes = serde_json::to_vec(tenant)?;
        self.cache
            .set(&self.id_key(&tenant.id), bytes.clone(), self.sliding_expiration)
            .await
            .map_err(MultiTenantError::Store)?;
        self.cache
            .set(&self.key_key(&tenant.key), bytes, self.sliding_expiration)
            .await
            .map_err(MultiTenantError::Store)?;
        Ok(())
    }
}

#[async_trait]
impl MultiTenantStore for DistributedCacheStore {
    fn name(&self) -> &'static str {
        "distributed_cache"
    }

    async fn try_get(&self, id: &str) -> MtResult<Option<TenantInfo>> {
        let Some(bytes) = self
            .cache
            .get(&self.id_key(id))
            .await
            .map_err(MultiTenantError::Store)?
        else {
            return Ok(None);
        };
        let tenant: TenantInfo = serde_json::from_slice(&bytes)?;

        // Touch the paired entry so both expire in step.
        self.cache
            .refresh(&self.key_key(&tenant.key))
            .await
            .map_err(MultiTenantError::Store)?;
        Ok(Some(tenant))
    }

    async fn try_get_by_key(&self, key: &str) -> MtResult<Option<TenantInfo>> {
        let Some(bytes) = self
            .cache
            .get(&self.key_key(key))
            .await
            .map_err(MultiTenantError::Store)?
        else {
            return Ok(None);
        };
        let tenant: TenantInfo = serde_json::from_slice(&bytes)?;

        self.cache
            .refresh(&self.id_key(&tenant.id))
            .await
            .map_err(MultiTenantError::Store)?;
        Ok(Some(tenant))
    }

    async fn get_all(&self) -> MtResult<Vec<TenantInfo>> {
        Err(MultiTenantError::not_supported(self.name(), "get_all"))
    }

    async fn try_add(&self, tenant: TenantInfo) -> MtResult<bool> {
        self.write(&tenant).await?;
        Ok(true)
    }

    async fn try_update(&self, tenant: TenantInfo) -> MtResult<bool> {
        // Overwriting both entries is an update as far as a cache goes.
        self.write(&tenant).await?;
        Ok(true)
    }

    async fn try_remove(&self, key: &str) -> MtResult<bool> {
        let Some(tenant) = self.try_get_by_key(key).await? else {
            return Ok(false);
        };
        self.cache
            .remove(&self.id_key(&tenant.id))
            .await
            .map_err(MultiTenantError::Store)?;
        self.cache
            .remove(&self.key_key(&tenant.key))
            .await
            .map_err(MultiTenantError::Store)?;
        Ok(true)
    }
}

struct MemoryCacheEntry {
    value: Vec<u8>,
    sliding_expiration: Option<Duration>,
    expires_at: Option<Instant>,
}

/// In-process [`DistributedCache`] with sliding expiration. The default
/// backend for single-node deployments and tests.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, MemoryCacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(entry: &mut MemoryCacheEntry, now: Instant) {
        if let Some(sliding) = entry.sliding_expiration {
            entry.expires_at = Some(now + sliding);
        }
    }

    fn live_entry<'a>(
        entries: &'a mut HashMap<String, MemoryCacheEntry>,
        key: &str,
        now: Instant,
    ) -> Option<&'a mut MemoryCacheEntry> {
        if let Some(entry) = entries.get(key) {
            if entry.expires_at.is_some_and(|at| at <= now) {
                entries.remove(key);
                return None;
            }
        }
        entries.get_mut(key)
    }
}

#[async_trait]
impl DistributedCache for MemoryCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        Ok(Self::live_entry(&mut entries, key, now).map(|entry| {
            Self::touch(entry, now);
            entry.value.clone()
        }))
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        sliding_expiration: Option<Duration>,
    ) -> anyhow::Result<()> {
        let expires_at = sliding_expiration.map(|sliding| Instant::now() + sliding);
        self.entries.lock().insert(
            key.to_owned(),
            MemoryCacheEntry {
                value,
                sliding_expiration,
                expires_at,
            },
        );
        Ok(())
    }

    async fn refresh(&self, key: &str) -> anyhow::Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        if let Some(entry) = Self::live_entry(&mut entries, key, now) {
            Self::touch(entry, now);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn store(sliding: Option<Duration>) -> DistributedCacheStore {
        DistributedCacheStore::new(Arc::new(MemoryCache::new()), "tenants__", sliding)
    }

    fn tenant(id: &str, key: &str) -> TenantInfo {
        TenantInfo::new(id, key, key).unwrap()
    }

    #[tokio::test]
    async fn add_pairs_both_lookup_axes() {
        let store = store(None);
        assert!(store.try_add(tenant("i1", "k1")).await.unwrap());

        let by_id = store.try_get("i1").await.unwrap().unwrap();
        let by_key = store.try_get_by_key("k1").await.unwrap().unwrap();
        assert_eq!(by_id, by_key);
    }

    #[tokio::test]
    async fn remove_clears_both_entries() {
        let store = store(None);
        store.try_add(tenant("i1", "k1")).await.unwrap();

        assert!(store.try_remove("k1").await.unwrap());
        assert!(store.try_get("i1").await.unwrap().is_none());
        assert!(store.try_get_by_key("k1").await.unwrap().is_none());
        assert!(!store.try_remove("k1").await.unwrap());
    }

    #[tokio::test]
    async fn lookups_slide_the_expiration() {
        let store = store(Some(Duration::from_millis(200)));
        store.try_add(tenant("i1", "k1")).await.unwrap();

        // Keep touching one axis; the paired entry must stay alive too.
        for _ in 0..3 {
            sleep(Duration::from_millis(120)).await;
            assert!(store.try_get_by_key("k1").await.unwrap().is_some());
        }
        assert!(store.try_get("i1").await.unwrap().is_some());

        sleep(Duration::from_millis(300)).await;
        assert!(store.try_get_by_key("k1").await.unwrap().is_none());
        assert!(store.try_get("i1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_all_is_unsupported() {
        assert!(store(None).get_all().await.unwrap_err().is_not_supported());
    }

    #[tokio::test]
    async fn update_overwrites_existing_entries() {
        let store = store(None);
        store.try_add(tenant("i1", "k1")).await.unwrap();

        let mut updated = tenant("i1", "k1");
        updated.name = "renamed".into();
        assert!(store.try_update(updated).await.unwrap());
        assert_eq!(store.try_get("i1").await.unwrap().unwrap().name, "renamed");
    }
}
