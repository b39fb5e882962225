//! The outcome of a resolution call.

use std::fmt;
use std::sync::Arc;

use crate::store::MultiTenantStore;
use crate::strategy::MultiTenantStrategy;
use crate::tenant::TenantInfo;

/// Contextual multi-tenant information for one request.
///
/// Created fresh per resolution call and immutable afterwards; callers own
/// its lifetime and typically attach it to the request's extension bag. The
/// strategy and store references are diagnostic only.
#[derive(Clone)]
pub struct MultiTenantContext {
    tenant: Option<TenantInfo>,
    strategy: Option<Arc<dyn MultiTenantStrategy>>,
    store: Option<Arc<dyn MultiTenantStore>>,
}

impl MultiTenantContext {
    pub(crate) fn resolved(
        tenant: TenantInfo,
        strategy: Arc<dyn MultiTenantStrategy>,
        store: Arc<dyn MultiTenantStore>,
    ) -> Self {
        Self {
            tenant: Some(tenant),
            strategy: Some(strategy),
            store: Some(store),
        }
    }

    pub(crate) fn unresolved() -> Self {
        Self {
            tenant: None,
            strategy: None,
            store: None,
        }
    }

    /// The resolved tenant, present iff resolution succeeded.
    pub fn tenant(&self) -> Option<&TenantInfo> {
        self.tenant.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.tenant.is_some()
    }

    /// The strategy that produced the winning key.
    pub fn strategy(&self) -> Option<&Arc<dyn MultiTenantStrategy>> {
        self.strategy.as_ref()
    }

    /// The store that produced the winning tenant.
    pub fn store(&self) -> Option<&Arc<dyn MultiTenantStore>> {
        self.store.as_ref()
    }
}

impl fmt::Debug for MultiTenantContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiTenantContext")
            .field("tenant", &self.tenant)
            .field("strategy", &self.strategy.as_ref().map(|s| s.name()))
            .field("store", &self.store.as_ref().map(|s| s.name()))
            .finish()
    }
}
