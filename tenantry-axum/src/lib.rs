//! tenantry-axum: Axum adapter for tenantry.
//!
//! Supplies the HTTP-facing strategies (header, host, base-path, route,
//! session, claim), the concrete [`RequestContext`](request::RequestContext)
//! those strategies downcast to, and the middleware/extractor pair that wires
//! a [`tenantry_core::TenantResolver`] into a router:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::{middleware, routing::get, Router};
//! use tenantry_axum::{tenant_middleware, CurrentTenant, HeaderStrategy};
//! use tenantry_core::{InMemoryStore, KeyComparison, TenantResolver};
//!
//! let resolver = Arc::new(
//!     TenantResolver::builder()
//!         .with_strategy(HeaderStrategy::new("X-Tenant"))
//!         .with_store(InMemoryStore::new(KeyComparison::default()))
//!         .build(),
//! );
//!
//! let app: Router = Router::new()
//!     .route("/", get(|tenant: CurrentTenant| async move {
//!         tenant.tenant().map(|t| t.name.clone()).unwrap_or_default()
//!     }))
//!     .layer(middleware::from_fn_with_state(resolver, tenant_middleware));
//! ```

pub mod auth;
mod error;
pub mod extract;
pub mod middleware;
pub mod request;
pub mod session;
pub mod strategies;

pub use auth::{Authenticator, Principal, SchemeRegistry};
pub use error::TenantAxumError;
pub use extract::CurrentTenant;
pub use middleware::tenant_middleware;
pub use request::RequestContext;
pub use session::{MemorySession, SessionAccess, SessionHandle};
pub use strategies::{
    BasePathStrategy, ClaimStrategy, HeaderStrategy, HostStrategy, RouteStrategy, SessionStrategy,
    TENANT_TOKEN,
};
