//! Handler-side access to the resolved tenant.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tenantry_core::{MultiTenantContext, MultiTenantError, TenantInfo};

use crate::error::TenantAxumError;

/// Extracts the [`MultiTenantContext`] the middleware stored for this
/// request.
///
/// Rejects with a 500 when [`tenant_middleware`](crate::middleware::tenant_middleware)
/// is not installed on the route. An unresolved tenant is not a rejection;
/// check [`tenant`](Self::tenant) for `None`.
#[derive(Clone)]
pub struct CurrentTenant(pub Arc<MultiTenantContext>);

impl CurrentTenant {
    pub fn context(&self) -> &MultiTenantContext {
        &self.0
    }

    pub fn tenant(&self) -> Option<&TenantInfo> {
        self.0.tenant()
    }
}

impl<S> FromRequestParts<S> for CurrentTenant
where
    S: Send + Sync,
{
    type Rejection = TenantAxumError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<MultiTenantContext>>()
            .cloned()
            .map(CurrentTenant)
            .ok_or_else(|| {
                TenantAxumError(MultiTenantError::config(
                    "tenant middleware is not installed on this route",
                ))
            })
    }
}
