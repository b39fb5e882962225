//! tenantry-core: framework-agnostic multi-tenant resolution.
//!
//! The core of a multi-tenant web application is answering one question per
//! request: *which tenant is this?* tenantry splits that question into two
//! pluggable capabilities and one orchestrator:
//!
//! - a [`MultiTenantStrategy`] extracts a candidate tenant key from an opaque
//!   request context (header, host name, session, claim, ...),
//! - a [`MultiTenantStore`] maps keys to [`TenantInfo`] records (in-memory,
//!   configuration, distributed cache, remote HTTP, ...),
//! - the [`TenantResolver`] walks strategies in priority order and stores in
//!   registration order, short-circuiting on the first hit.
//!
//! Transport adapters (see `tenantry-axum`) supply the concrete request
//! context type and the HTTP-facing strategies.

pub mod context;
pub mod error;
pub mod events;
pub mod resolver;
pub mod store;
pub mod stores;
pub mod strategy;
pub mod tenant;
pub mod wrappers;

pub use context::MultiTenantContext;
pub use error::{MtResult, MultiTenantError};
pub use events::{NotResolvedEvent, ResolutionEvents, ResolvedEvent};
pub use resolver::{TenantResolver, TenantResolverBuilder};
pub use store::MultiTenantStore;
pub use stores::cache::{DistributedCache, DistributedCacheStore, MemoryCache};
pub use stores::config::{ConfigurationStore, TenantConfig, TenantConfigEntry};
pub use stores::memory::InMemoryStore;
pub use stores::remote::{HttpRemoteStore, RemoteClient, RemoteResponse};
pub use strategy::{DelegateStrategy, MultiTenantStrategy, RequestContext, StaticStrategy};
pub use tenant::{KeyComparison, TenantInfo, TENANT_ID_MAX_LENGTH};
pub use wrappers::{StoreWrapper, StrategyWrapper};
