use async_trait::async_trait;
use regex::Regex;
use tenantry_core::strategy::RequestContext as OpaqueContext;
use tenantry_core::{MtResult, MultiTenantError, MultiTenantStrategy};

use super::downcast;

/// Placeholder for the tenant key inside a host template.
pub const TENANT_TOKEN: &str = "{__tenant__}";

/// Matches the request host against a wildcard template and captures the
/// tenant key.
///
/// Template grammar, segments separated by dots:
/// - `{__tenant__}` marks the key segment (a bare token template captures
///   the whole host);
/// - `*` matches any run of segments and may appear at most once;
/// - `?` matches exactly one segment;
/// - both wildcards must occupy an entire segment.
///
/// Invalid templates fail construction. Matching runs on the `regex` crate,
/// whose linear-time engine cannot backtrack catastrophically, so no match
/// timeout is needed.
pub struct HostStrategy {
    template: Regex,
}

impl HostStrategy {
    pub fn new(template: &str) -> MtResult<Self> {
        Ok(Self {
            template: compile_template(template)?,
        })
    }
}

fn compile_template(template: &str) -> MtResult<Regex> {
    let pattern = if template == TENANT_TOKEN {
        // Bare token: the whole host is the key.
        "(?P<key>.+)".to_owned()
    } else {
        if template.trim().is_empty() {
            return Err(MultiTenantError::config("host template cannot be empty"));
        }
        if template.matches('*').count() > 1 {
            return Err(MultiTenantError::config(
                "\"*\" wildcard may occur at most once in a host template",
            ));
        }
        for segment in template.split('.') {
            if segment.contains('*') && segment != "*" {
                return Err(MultiTenantError::config(
                    "\"*\" wildcard must be the only token in its template segment",
                ));
            }
            if segment.contains('?') && segment != "?" {
                return Err(MultiTenantError::config(
                    "\"?\" wildcard must be the only token in its template segment",
                ));
            }
        }

        let mut pattern = template.trim().replace('.', r"\.");
        // A trailing ".*" swallows any number of trailing segments.
        if pattern.ends_with(r"\.*") {
            pattern.truncate(pattern.len() - 3);
            pattern.push_str(r"(\.[^\.]+)*");
        }
        // A leading (or interior) "*." swallows any number of segments.
        let pattern = pattern.replace(r"*\.", r"([^\.]+\.)*");
        let pattern = pattern.replace('?', r"[^\.]+");
        pattern.replace(TENANT_TOKEN, r"(?P<key>[^\.]+)")
    };

    Regex::new(&format!("^{pattern}$"))
        .map_err(|err| MultiTenantError::config(format!("invalid host template: {err}")))
}

#[async_trait]
impl MultiTenantStrategy for HostStrategy {
    fn name(&self) -> &'static str {
        "host"
    }

    async fn get_key(&self, ctx: &OpaqueContext) -> MtResult<Option<String>> {
        let request = downcast(ctx, self.name())?;
        let Some(host) = request.host() else {
            return Ok(None);
        };
        Ok(self
            .template
            .captures(&host)
            .and_then(|captures| captures.name("key"))
            .map(|key| key.as_str().to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestContext;

    async fn extract(template: &str, host: &str) -> Option<String> {
        let strategy = HostStrategy::new(template).unwrap();
        let ctx = RequestContext::builder().host(host).unwrap().build();
        strategy.get_key(&ctx).await.unwrap()
    }

    #[tokio::test]
    async fn captures_the_subdomain() {
        assert_eq!(
            extract("{__tenant__}.example.com", "acme.example.com").await,
            Some("acme".into())
        );
    }

    #[tokio::test]
    async fn bare_domain_does_not_match_a_subdomain_template() {
        assert_eq!(extract("{__tenant__}.example.com", "example.com").await, None);
    }

    #[tokio::test]
    async fn bare_token_captures_the_whole_host() {
        assert_eq!(
            extract(TENANT_TOKEN, "acme.example.com").await,
            Some("acme.example.com".into())
        );
    }

    #[tokio::test]
    async fn leading_wildcard_spans_segments() {
        let template = "*.{__tenant__}.example.com";
        assert_eq!(
            extract(template, "a.b.acme.example.com").await,
            Some("acme".into())
        );
        assert_eq!(extract(template, "acme.example.com").await, Some("acme".into()));
    }

    #[tokio::test]
    async fn trailing_wildcard_spans_segments() {
        let template = "{__tenant__}.example.*";
        assert_eq!(extract(template, "acme.example.com").await, Some("acme".into()));
        assert_eq!(extract(template, "acme.example.co.uk").await, Some("acme".into()));
    }

    #[tokio::test]
    async fn question_mark_matches_exactly_one_segment() {
        let template = "?.{__tenant__}.example.com";
        assert_eq!(
            extract(template, "www.acme.example.com").await,
            Some("acme".into())
        );
        assert_eq!(extract(template, "acme.example.com").await, None);
    }

    #[test]
    fn rejects_two_star_wildcards() {
        assert!(matches!(
            HostStrategy::new("*.{__tenant__}.*"),
            Err(MultiTenantError::Config(_))
        ));
    }

    #[test]
    fn rejects_partial_segment_wildcards() {
        assert!(matches!(
            HostStrategy::new("a*.{__tenant__}.com"),
            Err(MultiTenantError::Config(_))
        ));
        assert!(matches!(
            HostStrategy::new("a?.{__tenant__}.com"),
            Err(MultiTenantError::Config(_))
        ));
    }

    #[test]
    fn rejects_empty_template() {
        assert!(matches!(
            HostStrategy::new("   "),
            Err(MultiTenantError::Config(_))
        ));
    }

    #[tokio::test]
    async fn missing_host_is_none() {
        let strategy = HostStrategy::new("{__tenant__}.example.com").unwrap();
        let ctx = RequestContext::builder().path("/x").build();
        assert_eq!(strategy.get_key(&ctx).await.unwrap(), None);
    }
}
