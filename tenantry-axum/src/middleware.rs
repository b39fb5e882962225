//! Router glue: resolve the tenant once per request and stash the outcome in
//! request extensions.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{FromRequestParts, RawPathParams, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tenantry_core::TenantResolver;
use tracing::debug;

use crate::error::TenantAxumError;
use crate::request::RequestContext;

/// Runs the resolver against the incoming request and inserts the resulting
/// [`MultiTenantContext`](tenantry_core::MultiTenantContext) into request
/// extensions, where [`CurrentTenant`](crate::extract::CurrentTenant) picks
/// it up. Install with `middleware::from_fn_with_state(resolver, tenant_middleware)`.
///
/// An unresolved tenant is not an error and the request proceeds; a failed
/// resolution short-circuits with the error response.
pub async fn tenant_middleware(
    State(resolver): State<Arc<TenantResolver>>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let route_params: HashMap<String, String> =
        match RawPathParams::from_request_parts(&mut parts, &()).await {
            Ok(params) => params
                .iter()
                .map(|(name, value)| (name.to_owned(), value.to_owned()))
                .collect(),
            Err(_) => HashMap::new(),
        };

    let ctx = RequestContext::from_parts(&parts, route_params);
    let resolved = match resolver.resolve(&ctx).await {
        Ok(context) => context,
        Err(err) => return TenantAxumError(err).into_response(),
    };
    debug!(resolved = resolved.is_resolved(), "tenant middleware ran");
    parts.extensions.insert(Arc::new(resolved));

    next.run(Request::from_parts(parts, body)).await
}
