use async_trait::async_trait;
use tenantry_core::strategy::RequestContext as OpaqueContext;
use tenantry_core::{MtResult, MultiTenantStrategy};

use super::downcast;

/// Takes the first path segment as the tenant key, so `/acme/orders` keys
/// tenant `acme`. Case is preserved; stores decide how to compare.
#[derive(Default)]
pub struct BasePathStrategy;

impl BasePathStrategy {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MultiTenantStrategy for BasePathStrategy {
    fn name(&self) -> &'static str {
        "base_path"
    }

    async fn get_key(&self, ctx: &OpaqueContext) -> MtResult<Option<String>> {
        let request = downcast(ctx, self.name())?;
        Ok(request
            .uri()
            .path()
            .split('/')
            .find(|segment| !segment.is_empty())
            .map(str::to_owned))
    }
}

/// Reads the tenant key from a named route parameter, e.g. the `tenant` in a
/// route registered as `/{tenant}/orders`.
pub struct RouteStrategy {
    param: String,
}

impl RouteStrategy {
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
        }
    }
}

#[async_trait]
impl MultiTenantStrategy for RouteStrategy {
    fn name(&self) -> &'static str {
        "route"
    }

    async fn get_key(&self, ctx: &OpaqueContext) -> MtResult<Option<String>> {
        let request = downcast(ctx, self.name())?;
        Ok(request.route_params().get(&self.param).cloned())
    }
}
