use std::sync::Arc;

use async_trait::async_trait;
use tenantry_core::strategy::RequestContext as OpaqueContext;
use tenantry_core::{MtResult, MultiTenantError, MultiTenantStrategy};

use super::downcast;
use crate::auth::{Authenticator, Principal, SchemeRegistry};

/// Reads the tenant key from a claim on the caller's principal.
///
/// Without a registry the strategy only inspects the principal already
/// attached to the request and yields the first value of the configured
/// claim when that principal is authenticated.
///
/// With a registry ([`with_registry`](Self::with_registry)) an unattached or
/// anonymous caller triggers the registry's default scheme handshake;
/// [`with_scheme`](Self::with_scheme) always runs the named scheme's
/// handshake instead. Either way the produced principal is inspected without
/// being installed on the request.
pub struct ClaimStrategy {
    claim_type: String,
    registry: Option<Arc<SchemeRegistry>>,
    scheme: Option<String>,
}

impl ClaimStrategy {
    pub fn new(claim_type: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            registry: None,
            scheme: None,
        }
    }

    pub fn with_registry(claim_type: impl Into<String>, registry: Arc<SchemeRegistry>) -> Self {
        Self {
            claim_type: claim_type.into(),
            registry: Some(registry),
            scheme: None,
        }
    }

    pub fn with_scheme(
        claim_type: impl Into<String>,
        scheme: impl Into<String>,
        registry: Arc<SchemeRegistry>,
    ) -> Self {
        Self {
            claim_type: claim_type.into(),
            registry: Some(registry),
            scheme: Some(scheme.into()),
        }
    }

    fn authenticator(&self, registry: &Arc<SchemeRegistry>) -> MtResult<Arc<dyn Authenticator>> {
        match &self.scheme {
            Some(name) => registry.get(name).cloned().ok_or_else(|| {
                MultiTenantError::config(format!("unknown authentication scheme \"{name}\""))
            }),
            None => registry.default_scheme().cloned().ok_or_else(|| {
                MultiTenantError::config("authentication scheme registry has no default scheme")
            }),
        }
    }

    fn key_from(&self, principal: &Principal) -> Option<String> {
        if !principal.is_authenticated() {
            return None;
        }
        principal.claim(&self.claim_type).map(str::to_owned)
    }
}

#[async_trait]
impl MultiTenantStrategy for ClaimStrategy {
    fn name(&self) -> &'static str {
        "claim"
    }

    async fn get_key(&self, ctx: &OpaqueContext) -> MtResult<Option<String>> {
        let request = downcast(ctx, self.name())?;

        // An attached authenticated principal answers directly, unless a
        // scheme was named, which always runs its own handshake.
        if self.scheme.is_none() {
            if let Some(principal) = request.principal() {
                if principal.is_authenticated() {
                    return Ok(self.key_from(principal));
                }
            }
        }

        let Some(registry) = &self.registry else {
            return Ok(None);
        };
        let authenticator = self.authenticator(registry)?;
        Ok(authenticator
            .authenticate(request)
            .await?
            .and_then(|principal| self.key_from(&principal)))
    }
}
