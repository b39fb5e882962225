use async_trait::async_trait;
use tenantry_core::strategy::RequestContext as OpaqueContext;
use tenantry_core::{MtResult, MultiTenantStrategy};

use super::downcast;

/// Reads the tenant key from a named request header.
pub struct HeaderStrategy {
    header: String,
}

impl HeaderStrategy {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

#[async_trait]
impl MultiTenantStrategy for HeaderStrategy {
    fn name(&self) -> &'static str {
        "header"
    }

    async fn get_key(&self, ctx: &OpaqueContext) -> MtResult<Option<String>> {
        let request = downcast(ctx, self.name())?;
        Ok(request
            .headers()
            .get(&self.header)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestContext;
    use tenantry_core::MultiTenantError;

    #[tokio::test]
    async fn returns_first_value_of_the_named_header() {
        let ctx = RequestContext::builder()
            .header("X-Tenant", "acme")
            .unwrap()
            .build();
        let strategy = HeaderStrategy::new("X-Tenant");
        assert_eq!(strategy.get_key(&ctx).await.unwrap(), Some("acme".into()));
    }

    #[tokio::test]
    async fn missing_header_is_none() {
        let ctx = RequestContext::builder().build();
        let strategy = HeaderStrategy::new("X-Tenant");
        assert_eq!(strategy.get_key(&ctx).await.unwrap(), None);
    }

    #[tokio::test]
    async fn wrong_context_type_is_an_invalid_context_error() {
        let strategy = HeaderStrategy::new("X-Tenant");
        let err = strategy.get_key(&"not a request".to_string()).await.unwrap_err();
        assert!(matches!(
            err,
            MultiTenantError::InvalidContext { strategy: "header" }
        ));
    }
}
