//! Strategy capability and the transport-agnostic variants.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::{MtResult, MultiTenantError};

/// Opaque request context handed to strategies.
///
/// The resolver never inspects it; each strategy downcasts to the concrete
/// host request type it understands and fails with
/// [`MultiTenantError::InvalidContext`] otherwise.
pub type RequestContext = dyn Any + Send + Sync;

/// Determines the tenant key for a request.
#[async_trait]
pub trait MultiTenantStrategy: Send + Sync {
    /// Short diagnostic name, used in logs and resolution events.
    fn name(&self) -> &'static str;

    /// Strategy execution order. Higher values are evaluated first; equal
    /// values keep registration order.
    fn priority(&self) -> i32 {
        0
    }

    /// Extracts a candidate tenant key from the request context, or `None`
    /// when this strategy has nothing to offer for the request.
    async fn get_key(&self, ctx: &RequestContext) -> MtResult<Option<String>>;

    /// Writes a resolved key back to the request context, for strategies
    /// with a writable backing (e.g. a session). Unsupported by default.
    async fn set_key(&self, _ctx: &RequestContext, _key: &str) -> MtResult<()> {
        Err(MultiTenantError::not_supported(self.name(), "set_key"))
    }
}

/// Always returns a fixed key. Registered as a catch-all: its priority puts
/// it after every other strategy.
pub struct StaticStrategy {
    key: String,
}

impl StaticStrategy {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[async_trait]
impl MultiTenantStrategy for StaticStrategy {
    fn name(&self) -> &'static str {
        "static"
    }

    fn priority(&self) -> i32 {
        -1000
    }

    async fn get_key(&self, _ctx: &RequestContext) -> MtResult<Option<String>> {
        Ok(Some(self.key.clone()))
    }
}

/// Signature for user-supplied delegate strategies.
pub type DelegateFn = dyn for<'a> Fn(&'a RequestContext) -> BoxFuture<'a, MtResult<Option<String>>>
    + Send
    + Sync;

/// Wraps a user-supplied async closure as a strategy.
pub struct DelegateStrategy {
    delegate: Arc<DelegateFn>,
}

impl DelegateStrategy {
    pub fn new<F>(delegate: F) -> Self
    where
        F: for<'a> Fn(&'a RequestContext) -> BoxFuture<'a, MtResult<Option<String>>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            delegate: Arc::new(delegate),
        }
    }
}

#[async_trait]
impl MultiTenantStrategy for DelegateStrategy {
    fn name(&self) -> &'static str {
        "delegate"
    }

    async fn get_key(&self, ctx: &RequestContext) -> MtResult<Option<String>> {
        (self.delegate)(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_strategy_always_yields_its_key() {
        let strategy = StaticStrategy::new("default");
        let ctx: Box<RequestContext> = Box::new(());
        assert_eq!(
            strategy.get_key(ctx.as_ref()).await.unwrap(),
            Some("default".to_string())
        );
        assert_eq!(strategy.priority(), -1000);
    }

    #[tokio::test]
    async fn delegate_strategy_can_downcast_its_context() {
        let strategy = DelegateStrategy::new(|ctx| {
            Box::pin(async move {
                Ok(ctx
                    .downcast_ref::<String>()
                    .map(|host| host.split('.').next().unwrap_or_default().to_string()))
            })
        });

        let ctx: Box<RequestContext> = Box::new("acme.example.com".to_string());
        assert_eq!(
            strategy.get_key(ctx.as_ref()).await.unwrap(),
            Some("acme".to_string())
        );
    }

    #[tokio::test]
    async fn set_key_is_unsupported_by_default() {
        let strategy = StaticStrategy::new("default");
        let ctx: Box<RequestContext> = Box::new(());
        let err = strategy.set_key(ctx.as_ref(), "acme").await.unwrap_err();
        assert!(err.is_not_supported());
    }
}
