//! Store capability: key/id-based CRUD over tenant records.

use async_trait::async_trait;

use crate::error::MtResult;
use crate::tenant::TenantInfo;

/// Backing storage for tenant records.
///
/// All lookups are best-effort: a missing record is `Ok(None)` / `Ok(false)`,
/// never an error. Variants that cannot implement an optional operation
/// (e.g. enumerating a distributed cache) return
/// [`MultiTenantError::NotSupported`](crate::MultiTenantError::NotSupported).
#[async_trait]
pub trait MultiTenantStore: Send + Sync {
    /// Short diagnostic name, used in logs and resolution events.
    fn name(&self) -> &'static str;

    /// Looks up a tenant by its immutable id.
    async fn try_get(&self, id: &str) -> MtResult<Option<TenantInfo>>;

    /// Looks up a tenant by its lookup key.
    async fn try_get_by_key(&self, key: &str) -> MtResult<Option<TenantInfo>>;

    /// Enumerates all tenants.
    async fn get_all(&self) -> MtResult<Vec<TenantInfo>>;

    /// Adds a tenant. Returns `false` when a record with the same id or key
    /// already exists.
    async fn try_add(&self, tenant: TenantInfo) -> MtResult<bool>;

    /// Replaces the record whose id matches `tenant.id`. Returns `false`
    /// when no such record exists. The key may change as part of an update.
    async fn try_update(&self, tenant: TenantInfo) -> MtResult<bool>;

    /// Removes the record with the given key. Returns `false` if not found.
    async fn try_remove(&self, key: &str) -> MtResult<bool>;
}
