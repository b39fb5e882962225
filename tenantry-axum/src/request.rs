//! The concrete request shape HTTP strategies downcast to.

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Uri};
use tenantry_core::{MtResult, MultiTenantError};

use crate::auth::Principal;
use crate::session::SessionHandle;

/// Snapshot of the parts of an HTTP request that tenant strategies read.
///
/// Built by the middleware from the incoming request; buildable by hand for
/// tests or for running the resolver outside a router.
pub struct RequestContext {
    headers: HeaderMap,
    uri: Uri,
    route_params: HashMap<String, String>,
    session: Option<SessionHandle>,
    principal: Option<Arc<Principal>>,
}

impl RequestContext {
    pub fn from_parts(parts: &Parts, route_params: HashMap<String, String>) -> Self {
        Self {
            headers: parts.headers.clone(),
            uri: parts.uri.clone(),
            route_params,
            session: parts.extensions.get::<SessionHandle>().cloned(),
            principal: parts.extensions.get::<Arc<Principal>>().cloned(),
        }
    }

    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::default()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Request host without the port, from the Host header or, failing that,
    /// the URI authority.
    pub fn host(&self) -> Option<String> {
        if let Some(value) = self.headers.get(HOST).and_then(|v| v.to_str().ok()) {
            return Some(strip_port(value).to_owned());
        }
        self.uri.host().map(str::to_owned)
    }

    pub fn route_params(&self) -> &HashMap<String, String> {
        &self.route_params
    }

    pub fn session(&self) -> Option<&SessionHandle> {
        self.session.as_ref()
    }

    pub fn principal(&self) -> Option<&Arc<Principal>> {
        self.principal.as_ref()
    }
}

fn strip_port(host: &str) -> &str {
    // Bracketed IPv6 hosts keep everything up to the closing bracket.
    if let Some(rest) = host.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            return &host[..end + 2];
        }
    }
    host.split(':').next().unwrap_or(host)
}

#[derive(Default)]
pub struct RequestContextBuilder {
    headers: HeaderMap,
    uri: Uri,
    route_params: HashMap<String, String>,
    session: Option<SessionHandle>,
    principal: Option<Arc<Principal>>,
}

impl RequestContextBuilder {
    pub fn header(mut self, name: &str, value: &str) -> MtResult<Self> {
        let header_name = HeaderName::try_from(name).map_err(|err| {
            MultiTenantError::config(format!("invalid header name \"{name}\": {err}"))
        })?;
        let header_value = HeaderValue::try_from(value).map_err(|err| {
            MultiTenantError::config(format!("invalid value for header \"{name}\": {err}"))
        })?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn uri(mut self, uri: Uri) -> Self {
        self.uri = uri;
        self
    }

    pub fn path(self, path: &str) -> Self {
        let uri = Uri::try_from(path).expect("valid path");
        self.uri(uri)
    }

    pub fn host(self, host: &str) -> MtResult<Self> {
        self.header("host", host)
    }

    pub fn route_param(mut self, name: &str, value: &str) -> Self {
        self.route_params.insert(name.to_owned(), value.to_owned());
        self
    }

    pub fn session(mut self, session: SessionHandle) -> Self {
        self.session = Some(session);
        self
    }

    pub fn principal(mut self, principal: Principal) -> Self {
        self.principal = Some(Arc::new(principal));
        self
    }

    pub fn build(self) -> RequestContext {
        RequestContext {
            headers: self.headers,
            uri: self.uri,
            route_params: self.route_params,
            session: self.session,
            principal: self.principal,
        }
    }
}
