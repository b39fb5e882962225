use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{MtResult, MultiTenantError};
use crate::store::MultiTenantStore;
use crate::tenant::{KeyComparison, TenantInfo, TENANT_ID_MAX_LENGTH};

/// Basic store that keeps tenants in a concurrent map keyed by tenant key.
///
/// Lookups by key are O(1); lookups by id scan linearly. Multiple resolution
/// calls may read and mutate concurrently; consistency per entry is whatever
/// the map shard locks guarantee, with no cross-call locking on top.
pub struct InMemoryStore {
    tenants: DashMap<String, TenantInfo>,
    comparison: KeyComparison,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new(comparison: KeyComparison) -> Self {
        Self {
            tenants: DashMap::new(),
            comparison,
        }
    }

    /// Creates a store seeded with `tenants`, failing fast on a missing or
    /// duplicate id/key.
    pub fn with_tenants(
        comparison: KeyComparison,
        tenants: impl IntoIterator<Item = TenantInfo>,
    ) -> MtResult<Self> {
        let store = Self::new(comparison);
        for tenant in tenants {
            if tenant.id.trim().is_empty() {
                return Err(MultiTenantError::config("missing tenant id in seed data"));
            }
            if tenant.id.chars().count() > TENANT_ID_MAX_LENGTH {
                return Err(MultiTenantError::config(format!(
                    "tenant id cannot exceed {TENANT_ID_MAX_LENGTH} characters"
                )));
            }
            if tenant.key.trim().is_empty() {
                return Err(MultiTenantError::config("missing tenant key in seed data"));
            }
            if store.find_by_id(&tenant.id).is_some() {
                return Err(MultiTenantError::config(format!(
                    "duplicate tenant id \"{}\" in seed data",
                    tenant.id
                )));
            }
            let normalized = store.comparison.normalize(&tenant.key);
            if store.tenants.contains_key(&normalized) {
                return Err(MultiTenantError::config(format!(
                    "duplicate tenant key \"{}\" in seed data",
                    tenant.key
                )));
            }
            store.tenants.insert(normalized, tenant);
        }
        Ok(store)
    }

    fn find_by_id(&self, id: &str) -> Option<TenantInfo> {
        self.tenants
            .iter()
            .find(|entry| entry.value().id == id)
            .map(|entry| entry.value().clone())
    }

    /// Normalized map key a tenant is stored under, by id. Used by updates,
    /// where the key itself may be changing.
    fn map_key_by_id(&self, id: &str) -> Option<String> {
        self.tenants
            .iter()
            .find(|entry| entry.value().id == id)
            .map(|entry| entry.key().clone())
    }
}

#[async_trait]
impl MultiTenantStore for InMemoryStore {
    fn name(&self) -> &'static str {
        "in_memory"
    }

    async fn try_get(&self, id: &str) -> MtResult<Option<TenantInfo>> {
        Ok(self.find_by_id(id))
    }

    async fn try_get_by_key(&self, key: &str) -> MtResult<Option<TenantInfo>> {
        let normalized = self.comparison.normalize(key);
        Ok(self.tenants.get(&normalized).map(|entry| entry.clone()))
    }

    async fn get_all(&self) -> MtResult<Vec<TenantInfo>> {
        Ok(self
            .tenants
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn try_add(&self, tenant: TenantInfo) -> MtResult<bool> {
        if tenant.id.is_empty() || tenant.key.is_empty() {
            return Ok(false);
        }
        if self.find_by_id(&tenant.id).is_some() {
            return Ok(false);
        }
        let normalized = self.comparison.normalize(&tenant.key);
        match self.tenants.entry(normalized) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(tenant);
                Ok(true)
            }
        }
    }

    async fn try_update(&self, tenant: TenantInfo) -> MtResult<bool> {
        let Some(current) = self.map_key_by_id(&tenant.id) else {
            return Ok(false);
        };
        let normalized = self.comparison.normalize(&tenant.key);
        if current != normalized {
            if self.tenants.contains_key(&normalized) {
                return Ok(false);
            }
            self.tenants.remove(&current);
        }
        self.tenants.insert(normalized, tenant);
        Ok(true)
    }

    async fn try_remove(&self, key: &str) -> MtResult<bool> {
        let normalized = self.comparison.normalize(key);
        Ok(self.tenants.remove(&normalized).is_some())
    }
}
