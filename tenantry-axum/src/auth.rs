//! Just enough of an authentication model for claim-based resolution.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tenantry_core::MtResult;

use crate::request::RequestContext;

/// An authenticated (or anonymous) caller with a claims multimap.
#[derive(Debug, Clone, Default)]
pub struct Principal {
    authenticated: bool,
    claims: Vec<(String, String)>,
}

impl Principal {
    /// An authenticated principal with no claims yet.
    pub fn authenticated() -> Self {
        Self {
            authenticated: true,
            claims: Vec::new(),
        }
    }

    /// An anonymous principal.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_claim(mut self, kind: impl Into<String>, value: impl Into<String>) -> Self {
        self.claims.push((kind.into(), value.into()));
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// First value of the named claim.
    pub fn claim(&self, kind: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, v)| v.as_str())
    }
}

/// Runs an authentication handshake against one scheme, producing a
/// principal for inspection without installing it on the request.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, ctx: &RequestContext) -> MtResult<Option<Principal>>;
}

/// Named authentication schemes with an optional default, mirroring how web
/// frameworks register cookie/bearer/etc. handlers side by side.
#[derive(Default)]
pub struct SchemeRegistry {
    schemes: HashMap<String, Arc<dyn Authenticator>>,
    default: Option<String>,
}

impl SchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        mut self,
        name: impl Into<String>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        self.schemes.insert(name.into(), authenticator);
        self
    }

    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default = Some(name.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Authenticator>> {
        self.schemes.get(name)
    }

    pub fn default_scheme(&self) -> Option<&Arc<dyn Authenticator>> {
        self.default.as_deref().and_then(|name| self.get(name))
    }
}
