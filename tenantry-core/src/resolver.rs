//! The resolver: ordered strategies against ordered stores.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::context::MultiTenantContext;
use crate::error::{MtResult, MultiTenantError};
use crate::events::{NoopEvents, NotResolvedEvent, ResolutionEvents, ResolvedEvent};
use crate::store::MultiTenantStore;
use crate::strategy::{MultiTenantStrategy, RequestContext};
use crate::wrappers::{StoreWrapper, StrategyWrapper};

/// Resolves the current tenant for a request.
///
/// Strategies run in descending priority order (ties keep registration
/// order); for each candidate key, stores run in registration order. The
/// first store hit wins and stops all further evaluation. Everything is
/// sequential on purpose: later strategies and stores are only consulted on
/// a miss, so speculative concurrency would just waste I/O.
pub struct TenantResolver {
    strategies: Vec<Arc<dyn MultiTenantStrategy>>,
    stores: Vec<Arc<dyn MultiTenantStore>>,
    ignored_keys: Vec<String>,
    events: Arc<dyn ResolutionEvents>,
}

impl TenantResolver {
    pub fn builder() -> TenantResolverBuilder {
        TenantResolverBuilder::default()
    }

    /// Resolves a tenant for the given request context.
    ///
    /// Returns an unresolved [`MultiTenantContext`] when no strategy/store
    /// pair matches; that is not an error. Errors mean a strategy or event
    /// hook failed and the outcome cannot be trusted.
    pub async fn resolve(&self, ctx: &RequestContext) -> MtResult<MultiTenantContext> {
        let mut last_key: Option<String> = None;

        for strategy in &self.strategies {
            let wrapped = StrategyWrapper::new(Arc::clone(strategy));
            let mut key = wrapped.get_key(ctx).await?;

            if let Some(candidate) = &key {
                if self
                    .ignored_keys
                    .iter()
                    .any(|ignored| ignored.eq_ignore_ascii_case(candidate))
                {
                    info!(key = %candidate, "ignored tenant key");
                    key = None;
                }
            }

            last_key.clone_from(&key);
            let Some(key) = key else {
                continue;
            };

            for store in &self.stores {
                let wrapped_store = StoreWrapper::new(Arc::clone(store));
                let Some(tenant) = wrapped_store.try_get_by_key(&key).await? else {
                    continue;
                };

                self.events
                    .on_tenant_resolved(ResolvedEvent {
                        context: ctx,
                        tenant: &tenant,
                        strategy: strategy.name(),
                        store: store.name(),
                    })
                    .await
                    .map_err(MultiTenantError::Event)?;

                return Ok(MultiTenantContext::resolved(
                    tenant,
                    Arc::clone(strategy),
                    Arc::clone(store),
                ));
            }
        }

        self.events
            .on_tenant_not_resolved(NotResolvedEvent {
                context: ctx,
                key: last_key.as_deref(),
            })
            .await
            .map_err(MultiTenantError::Event)?;

        Ok(MultiTenantContext::unresolved())
    }

    /// Like [`resolve`](Self::resolve), but abandons in-flight work and
    /// fails with [`MultiTenantError::Canceled`] when the token fires.
    /// A canceled resolution never yields a partial context.
    pub async fn resolve_cancellable(
        &self,
        ctx: &RequestContext,
        cancel: &CancellationToken,
    ) -> MtResult<MultiTenantContext> {
        match cancel.run_until_cancelled(self.resolve(ctx)).await {
            Some(outcome) => outcome,
            None => Err(MultiTenantError::Canceled),
        }
    }
}

/// Assembles a [`TenantResolver`]. Strategy registration order is kept for
/// equal priorities; store registration order is the lookup order.
#[derive(Default)]
pub struct TenantResolverBuilder {
    strategies: Vec<Arc<dyn MultiTenantStrategy>>,
    stores: Vec<Arc<dyn MultiTenantStore>>,
    ignored_keys: Vec<String>,
    events: Option<Arc<dyn ResolutionEvents>>,
}

impl TenantResolverBuilder {
    pub fn with_strategy(self, strategy: impl MultiTenantStrategy + 'static) -> Self {
        self.with_strategy_arc(Arc::new(strategy))
    }

    pub fn with_strategy_arc(mut self, strategy: Arc<dyn MultiTenantStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn with_store(self, store: impl MultiTenantStore + 'static) -> Self {
        self.with_store_arc(Arc::new(store))
    }

    pub fn with_store_arc(mut self, store: Arc<dyn MultiTenantStore>) -> Self {
        self.stores.push(store);
        self
    }

    /// Keys that never resolve: a matching candidate (case-insensitive) is
    /// treated as if the strategy had returned nothing.
    pub fn ignore_key(mut self, key: impl Into<String>) -> Self {
        self.ignored_keys.push(key.into());
        self
    }

    pub fn events(mut self, events: Arc<dyn ResolutionEvents>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn build(mut self) -> TenantResolver {
        // Stable sort: equal priorities keep registration order.
        self.strategies
            .sort_by_key(|strategy| std::cmp::Reverse(strategy.priority()));
        TenantResolver {
            strategies: self.strategies,
            stores: self.stores,
            ignored_keys: self.ignored_keys,
            events: self.events.unwrap_or_else(|| Arc::new(NoopEvents)),
        }
    }
}
