use anyhow::anyhow;
use async_trait::async_trait;
use tenantry_core::strategy::RequestContext as OpaqueContext;
use tenantry_core::{MtResult, MultiTenantError, MultiTenantStrategy};

use super::downcast;

/// Reads the tenant key from a session value, and can write a resolved key
/// back so later requests skip slower strategies.
pub struct SessionStrategy {
    session_key: String,
}

impl SessionStrategy {
    pub fn new(session_key: impl Into<String>) -> Self {
        Self {
            session_key: session_key.into(),
        }
    }
}

#[async_trait]
impl MultiTenantStrategy for SessionStrategy {
    fn name(&self) -> &'static str {
        "session"
    }

    async fn get_key(&self, ctx: &OpaqueContext) -> MtResult<Option<String>> {
        let request = downcast(ctx, self.name())?;
        Ok(request
            .session()
            .and_then(|session| session.get(&self.session_key)))
    }

    async fn set_key(&self, ctx: &OpaqueContext, key: &str) -> MtResult<()> {
        let request = downcast(ctx, self.name())?;
        let session = request.session().ok_or_else(|| {
            MultiTenantError::Unexpected(anyhow!(
                "cannot store tenant key: request carries no session"
            ))
        })?;
        session.set(&self.session_key, key);
        Ok(())
    }
}
