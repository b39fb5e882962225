//! Decorators that isolate resolution from a faulty strategy or store.
//!
//! Both wrappers hold the inner capability by explicit composition and
//! forward every call behind an error boundary. The policies differ:
//! a strategy failure poisons the whole resolution attempt, so it is logged
//! and re-raised; a store failure must not stop later stores from being
//! consulted, so it is logged and reported as a miss.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::error::{MtResult, MultiTenantError};
use crate::store::MultiTenantStore;
use crate::strategy::{MultiTenantStrategy, RequestContext};
use crate::tenant::TenantInfo;

/// Fault-isolating decorator for a strategy.
pub struct StrategyWrapper {
    inner: Arc<dyn MultiTenantStrategy>,
}

impl StrategyWrapper {
    pub fn new(inner: Arc<dyn MultiTenantStrategy>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl MultiTenantStrategy for StrategyWrapper {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn priority(&self) -> i32 {
        self.inner.priority()
    }

    async fn get_key(&self, ctx: &RequestContext) -> MtResult<Option<String>> {
        match self.inner.get_key(ctx).await {
            Ok(Some(key)) => {
                debug!(strategy = self.name(), %key, "strategy found tenant key");
                Ok(Some(key))
            }
            Ok(None) => {
                debug!(strategy = self.name(), "strategy found no tenant key");
                Ok(None)
            }
            Err(err) => {
                error!(strategy = self.name(), error = %err, "strategy failed during key extraction");
                Err(MultiTenantError::Resolution {
                    strategy: self.name(),
                    source: err.into(),
                })
            }
        }
    }

    async fn set_key(&self, ctx: &RequestContext, key: &str) -> MtResult<()> {
        self.inner.set_key(ctx, key).await
    }
}

/// Fault-isolating decorator for a store.
///
/// Besides the error boundary, `try_add` screens for an existing id or key
/// and `try_update` for a missing id, so every variant reports duplicates
/// and misses uniformly. `NotSupported` passes through untouched: it is an
/// answer, not a fault.
pub struct StoreWrapper {
    inner: Arc<dyn MultiTenantStore>,
}

impl StoreWrapper {
    pub fn new(inner: Arc<dyn MultiTenantStore>) -> Self {
        Self { inner }
    }

    fn swallow<T>(&self, operation: &'static str, err: MultiTenantError, miss: T) -> MtResult<T> {
        if err.is_not_supported() {
            return Err(err);
        }
        error!(store = self.name(), %operation, error = %err, "store operation failed");
        Ok(miss)
    }
}

#[async_trait]
impl MultiTenantStore for StoreWrapper {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn try_get(&self, id: &str) -> MtResult<Option<TenantInfo>> {
        let result = match self.inner.try_get(id).await {
            Ok(result) => result,
            Err(err) => return self.swallow("try_get", err, None),
        };
        match &result {
            Some(_) => debug!(store = self.name(), %id, "tenant id found"),
            None => debug!(store = self.name(), %id, "tenant id not found"),
        }
        Ok(result)
    }

    async fn try_get_by_key(&self, key: &str) -> MtResult<Option<TenantInfo>> {
        let result = match self.inner.try_get_by_key(key).await {
            Ok(result) => result,
            Err(err) => return self.swallow("try_get_by_key", err, None),
        };
        match &result {
            Some(_) => debug!(store = self.name(), %key, "tenant key found"),
            None => debug!(store = self.name(), %key, "tenant key not found"),
        }
        Ok(result)
    }

    async fn get_all(&self) -> MtResult<Vec<TenantInfo>> {
        match self.inner.get_all().await {
            Ok(tenants) => Ok(tenants),
            Err(err) => self.swallow("get_all", err, Vec::new()),
        }
    }

    async fn try_add(&self, tenant: TenantInfo) -> MtResult<bool> {
        if tenant.id.is_empty() || tenant.key.is_empty() {
            debug!(store = self.name(), "refusing to add tenant without id or key");
            return Ok(false);
        }
        if self.try_get(&tenant.id).await?.is_some() {
            debug!(
                store = self.name(),
                id = %tenant.id,
                key = %tenant.key,
                "tenant not added: duplicate id"
            );
            return Ok(false);
        }
        if self.try_get_by_key(&tenant.key).await?.is_some() {
            debug!(
                store = self.name(),
                id = %tenant.id,
                key = %tenant.key,
                "tenant not added: duplicate key"
            );
            return Ok(false);
        }

        let id = tenant.id.clone();
        let key = tenant.key.clone();
        let added = match self.inner.try_add(tenant).await {
            Ok(added) => added,
            Err(err) => return self.swallow("try_add", err, false),
        };
        if added {
            debug!(store = self.name(), %id, %key, "tenant added");
        } else {
            debug!(store = self.name(), %id, %key, "tenant not added");
        }
        Ok(added)
    }

    async fn try_update(&self, tenant: TenantInfo) -> MtResult<bool> {
        if self.try_get(&tenant.id).await?.is_none() {
            debug!(store = self.name(), id = %tenant.id, "tenant not updated: id not found");
            return Ok(false);
        }

        let id = tenant.id.clone();
        let updated = match self.inner.try_update(tenant).await {
            Ok(updated) => updated,
            Err(err) => return self.swallow("try_update", err, false),
        };
        if updated {
            debug!(store = self.name(), %id, "tenant updated");
        } else {
            debug!(store = self.name(), %id, "tenant not updated");
        }
        Ok(updated)
    }

    async fn try_remove(&self, key: &str) -> MtResult<bool> {
        let removed = match self.inner.try_remove(key).await {
            Ok(removed) => removed,
            Err(err) => return self.swallow("try_remove", err, false),
        };
        if removed {
            debug!(store = self.name(), %key, "tenant removed");
        } else {
            debug!(store = self.name(), %key, "tenant not removed");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::memory::InMemoryStore;
    use crate::tenant::KeyComparison;

    struct FailingStrategy;

    #[async_trait]
    impl MultiTenantStrategy for FailingStrategy {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn get_key(&self, _ctx: &RequestContext) -> MtResult<Option<String>> {
            Err(anyhow::anyhow!("backend exploded").into())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl MultiTenantStore for FailingStore {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn try_get(&self, _id: &str) -> MtResult<Option<TenantInfo>> {
            Err(MultiTenantError::Store(anyhow::anyhow!("io error")))
        }

        async fn try_get_by_key(&self, _key: &str) -> MtResult<Option<TenantInfo>> {
            Err(MultiTenantError::Store(anyhow::anyhow!("io error")))
        }

        async fn get_all(&self) -> MtResult<Vec<TenantInfo>> {
            Err(MultiTenantError::not_supported("failing", "get_all"))
        }

        async fn try_add(&self, _tenant: TenantInfo) -> MtResult<bool> {
            Err(MultiTenantError::Store(anyhow::anyhow!("io error")))
        }

        async fn try_update(&self, _tenant: TenantInfo) -> MtResult<bool> {
            Err(MultiTenantError::Store(anyhow::anyhow!("io error")))
        }

        async fn try_remove(&self, _key: &str) -> MtResult<bool> {
            Err(MultiTenantError::Store(anyhow::anyhow!("io error")))
        }
    }

    fn tenant(id: &str, key: &str) -> TenantInfo {
        TenantInfo::new(id, key, key).unwrap()
    }

    #[tokio::test]
    async fn strategy_failure_is_reraised_as_resolution_error() {
        let wrapper = StrategyWrapper::new(Arc::new(FailingStrategy));
        let ctx: Box<RequestContext> = Box::new(());
        let err = wrapper.get_key(ctx.as_ref()).await.unwrap_err();
        assert!(matches!(
            err,
            MultiTenantError::Resolution { strategy: "failing", .. }
        ));
    }

    #[tokio::test]
    async fn store_failures_become_misses() {
        let wrapper = StoreWrapper::new(Arc::new(FailingStore));
        assert!(wrapper.try_get("id").await.unwrap().is_none());
        assert!(wrapper.try_get_by_key("key").await.unwrap().is_none());
        assert!(!wrapper.try_remove("key").await.unwrap());
    }

    #[tokio::test]
    async fn not_supported_passes_through() {
        let wrapper = StoreWrapper::new(Arc::new(FailingStore));
        assert!(wrapper.get_all().await.unwrap_err().is_not_supported());
    }

    #[tokio::test]
    async fn add_screens_duplicates_before_reaching_the_store() {
        let store = Arc::new(
            InMemoryStore::with_tenants(KeyComparison::default(), [tenant("t1", "acme")]).unwrap(),
        );
        let wrapper = StoreWrapper::new(store);

        assert!(!wrapper.try_add(tenant("t1", "other")).await.unwrap());
        assert!(!wrapper.try_add(tenant("t9", "acme")).await.unwrap());
        assert!(wrapper.try_add(tenant("t2", "initech")).await.unwrap());
    }

    #[tokio::test]
    async fn update_requires_an_existing_id() {
        let store = Arc::new(
            InMemoryStore::with_tenants(KeyComparison::default(), [tenant("t1", "acme")]).unwrap(),
        );
        let wrapper = StoreWrapper::new(store);

        assert!(!wrapper.try_update(tenant("ghost", "ghost")).await.unwrap());
        assert!(wrapper.try_update(tenant("t1", "acme2")).await.unwrap());
    }
}
