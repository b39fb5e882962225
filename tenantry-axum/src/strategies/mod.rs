//! HTTP-facing tenant strategies.
//!
//! All of them downcast the resolver's opaque context to
//! [`RequestContext`](crate::request::RequestContext) and fail with
//! `InvalidContext` when handed anything else.

mod claim;
mod header;
mod host;
mod path;
mod session;

pub use claim::ClaimStrategy;
pub use header::HeaderStrategy;
pub use host::{HostStrategy, TENANT_TOKEN};
pub use path::{BasePathStrategy, RouteStrategy};
pub use session::SessionStrategy;

use tenantry_core::strategy::RequestContext as OpaqueContext;
use tenantry_core::{MtResult, MultiTenantError};

use crate::request::RequestContext;

fn downcast<'a>(ctx: &'a OpaqueContext, strategy: &'static str) -> MtResult<&'a RequestContext> {
    ctx.downcast_ref::<RequestContext>()
        .ok_or(MultiTenantError::InvalidContext { strategy })
}
