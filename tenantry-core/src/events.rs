//! Extensibility events fired by the resolver.

use async_trait::async_trait;

use crate::strategy::RequestContext;
use crate::tenant::TenantInfo;

/// Payload for a successful resolution.
pub struct ResolvedEvent<'a> {
    /// The opaque request context the resolution ran against.
    pub context: &'a RequestContext,
    pub tenant: &'a TenantInfo,
    /// Name of the strategy that produced the winning key.
    pub strategy: &'static str,
    /// Name of the store that produced the tenant.
    pub store: &'static str,
}

/// Payload for an exhausted resolution.
pub struct NotResolvedEvent<'a> {
    pub context: &'a RequestContext,
    /// The last candidate key any strategy produced, if any.
    pub key: Option<&'a str>,
}

/// Hooks invoked inline during resolution, before the resolver returns.
/// An error from a hook propagates as a resolution failure.
#[async_trait]
pub trait ResolutionEvents: Send + Sync {
    async fn on_tenant_resolved(&self, _event: ResolvedEvent<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn on_tenant_not_resolved(&self, _event: NotResolvedEvent<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}

pub(crate) struct NoopEvents;

#[async_trait]
impl ResolutionEvents for NoopEvents {}
