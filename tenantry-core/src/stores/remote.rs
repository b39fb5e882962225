use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use url::form_urlencoded;

use crate::error::{MtResult, MultiTenantError};
use crate::store::MultiTenantStore;
use crate::tenant::TenantInfo;

/// Placeholder substituted with the escaped tenant key when building the
/// remote endpoint URI.
pub const ENDPOINT_TENANT_TOKEN: &str = "{__tenant__}";

/// Minimal response surface the remote store needs.
pub struct RemoteResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RemoteResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// GET-capable client abstraction, so the store stays testable and the HTTP
/// stack swappable.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn get(&self, uri: &str) -> anyhow::Result<RemoteResponse>;
}

/// Read-only store that asks a remote HTTP service for tenant records.
///
/// The key is percent-escaped into the endpoint template. A non-success
/// status or an undeserializable body is a miss, never an error; only
/// transport failures surface (and the store wrapper turns those into a miss
/// during resolution). Mutations and enumeration are unsupported.
pub struct HttpRemoteStore {
    client: Arc<dyn RemoteClient>,
    endpoint_template: String,
}

impl HttpRemoteStore {
    pub fn new(client: Arc<dyn RemoteClient>, endpoint_template: impl Into<String>) -> MtResult<Self> {
        let endpoint_template = endpoint_template.into();
        if !endpoint_template.contains(ENDPOINT_TENANT_TOKEN) {
            return Err(MultiTenantError::config(format!(
                "remote endpoint template must contain the {ENDPOINT_TENANT_TOKEN} token"
            )));
        }
        Ok(Self {
            client,
            endpoint_template,
        })
    }

    fn endpoint_for(&self, key: &str) -> String {
        let escaped: String = form_urlencoded::byte_serialize(key.as_bytes()).collect();
        self.endpoint_template.replace(ENDPOINT_TENANT_TOKEN, &escaped)
    }

    async fn fetch(&self, key: &str) -> MtResult<Option<TenantInfo>> {
        let uri = self.endpoint_for(key);
        let response = self
            .client
            .get(&uri)
            .await
            .map_err(MultiTenantError::Store)?;

        if !response.is_success() {
            debug!(status = response.status, %uri, "remote tenant lookup missed");
            return Ok(None);
        }

        match serde_json::from_slice::<TenantInfo>(&response.body) {
            Ok(tenant) => Ok(Some(tenant)),
            Err(err) => {
                debug!(error = %err, %uri, "remote tenant payload did not deserialize");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl MultiTenantStore for HttpRemoteStore {
    fn name(&self) -> &'static str {
        "http_remote"
    }

    // Remote endpoints key on a single identifier; both lookup axes go
    // through the same template.
    async fn try_get(&self, id: &str) -> MtResult<Option<TenantInfo>> {
        self.fetch(id).await
    }

    async fn try_get_by_key(&self, key: &str) -> MtResult<Option<TenantInfo>> {
        self.fetch(key).await
    }

    async fn get_all(&self) -> MtResult<Vec<TenantInfo>> {
        Err(MultiTenantError::not_supported(self.name(), "get_all"))
    }

    async fn try_add(&self, _tenant: TenantInfo) -> MtResult<bool> {
        Err(MultiTenantError::not_supported(self.name(), "try_add"))
    }

    async fn try_update(&self, _tenant: TenantInfo) -> MtResult<bool> {
        Err(MultiTenantError::not_supported(self.name(), "try_update"))
    }

    async fn try_remove(&self, _key: &str) -> MtResult<bool> {
        Err(MultiTenantError::not_supported(self.name(), "try_remove"))
    }
}

/// [`RemoteClient`] over reqwest.
#[cfg(feature = "reqwest")]
pub struct ReqwestClient {
    client: reqwest::Client,
}

#[cfg(feature = "reqwest")]
impl ReqwestClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "reqwest")]
impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[cfg(feature = "reqwest")]
#[async_trait]
impl RemoteClient for ReqwestClient {
    async fn get(&self, uri: &str) -> anyhow::Result<RemoteResponse> {
        let response = self.client.get(uri).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(RemoteResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct StubClient {
        status: u16,
        body: &'static str,
        requests: Mutex<Vec<String>>,
    }

    impl StubClient {
        fn new(status: u16, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl RemoteClient for StubClient {
        async fn get(&self, uri: &str) -> anyhow::Result<RemoteResponse> {
            self.requests.lock().push(uri.to_owned());
            Ok(RemoteResponse {
                status: self.status,
                body: self.body.as_bytes().to_vec(),
            })
        }
    }

    #[tokio::test]
    async fn substitutes_escaped_key_into_template() {
        let client = StubClient::new(200, r#"{"id":"t1","key":"a b","name":"A B"}"#);
        let store = HttpRemoteStore::new(
            client.clone(),
            "https://tenants.internal/api/{__tenant__}",
        )
        .unwrap();

        let tenant = store.try_get_by_key("a b").await.unwrap().unwrap();
        assert_eq!(tenant.id, "t1");
        assert_eq!(
            client.requests.lock().as_slice(),
            ["https://tenants.internal/api/a+b"]
        );
    }

    #[tokio::test]
    async fn non_success_status_is_a_miss() {
        let client = StubClient::new(404, "");
        let store =
            HttpRemoteStore::new(client, "https://tenants.internal/api/{__tenant__}").unwrap();
        assert!(store.try_get_by_key("acme").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn undeserializable_body_is_a_miss() {
        let client = StubClient::new(200, "not json");
        let store =
            HttpRemoteStore::new(client, "https://tenants.internal/api/{__tenant__}").unwrap();
        assert!(store.try_get_by_key("acme").await.unwrap().is_none());
    }

    #[test]
    fn template_must_contain_the_token() {
        let client = StubClient::new(200, "{}");
        assert!(matches!(
            HttpRemoteStore::new(client, "https://tenants.internal/api/"),
            Err(MultiTenantError::Config(_))
        ));
    }

    #[tokio::test]
    async fn mutations_are_unsupported() {
        let client = StubClient::new(200, "{}");
        let store =
            HttpRemoteStore::new(client, "https://t/{__tenant__}").unwrap();
        assert!(store.get_all().await.unwrap_err().is_not_supported());
        let tenant = TenantInfo::new("t", "k", "n").unwrap();
        assert!(store.try_add(tenant).await.unwrap_err().is_not_supported());
        assert!(store.try_remove("k").await.unwrap_err().is_not_supported());
    }
}
