use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, error};

use crate::error::{MtResult, MultiTenantError};
use crate::store::MultiTenantStore;
use crate::tenant::{KeyComparison, TenantInfo};

/// One tenant entry as it appears in configuration. All fields optional so
/// `Defaults` can fill the gaps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantConfigEntry {
    #[serde(alias = "Id", default)]
    pub id: Option<String>,
    #[serde(alias = "Key", default)]
    pub key: Option<String>,
    #[serde(alias = "Name", default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TenantConfigEntry {
    /// Entry values win over defaults; custom fields merge the same way.
    fn merged_with(&self, defaults: Option<&TenantConfigEntry>) -> TenantConfigEntry {
        let Some(defaults) = defaults else {
            return self.clone();
        };
        let mut extra = defaults.extra.clone();
        for (field, value) in &self.extra {
            extra.insert(field.clone(), value.clone());
        }
        TenantConfigEntry {
            id: self.id.clone().or_else(|| defaults.id.clone()),
            key: self.key.clone().or_else(|| defaults.key.clone()),
            name: self.name.clone().or_else(|| defaults.name.clone()),
            extra,
        }
    }
}

/// The `Stores.ConfigurationStore` section: a list of tenants plus an
/// optional defaults entry merged into each of them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantConfig {
    #[serde(alias = "Defaults", default)]
    pub defaults: Option<TenantConfigEntry>,
    #[serde(alias = "Tenants", default)]
    pub tenants: Vec<TenantConfigEntry>,
}

impl TenantConfig {
    /// Extracts the `Stores.ConfigurationStore` section from a configuration
    /// root. Section names bind case-insensitively, matching how the tenant
    /// fields themselves bind.
    pub fn from_root(root: &Value) -> MtResult<Self> {
        let section = child(root, "Stores")
            .and_then(|stores| child(stores, "ConfigurationStore"))
            .ok_or_else(|| {
                MultiTenantError::config("missing Stores.ConfigurationStore configuration section")
            })?;
        Self::from_section(section)
    }

    /// Parses an already-extracted section value.
    pub fn from_section(section: &Value) -> MtResult<Self> {
        serde_json::from_value(section.clone()).map_err(|err| {
            MultiTenantError::config(format!("invalid tenant configuration section: {err}"))
        })
    }
}

fn child<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value
        .as_object()?
        .iter()
        .find(|(field, _)| field.eq_ignore_ascii_case(name))
        .map(|(_, v)| v)
}

type TenantMap = HashMap<String, TenantInfo>;

/// Read-only store materialized from structured configuration.
///
/// The configuration arrives on a `watch` channel; whenever the sender
/// publishes a new value the map is rebuilt and swapped in atomically, so
/// concurrent readers see either the old or the new map, never a mix.
/// Add/update/remove are unsupported.
pub struct ConfigurationStore {
    receiver: Mutex<watch::Receiver<TenantConfig>>,
    tenants: ArcSwap<TenantMap>,
    comparison: KeyComparison,
}

impl ConfigurationStore {
    pub fn new(receiver: watch::Receiver<TenantConfig>) -> MtResult<Self> {
        Self::with_comparison(receiver, KeyComparison::default())
    }

    pub fn with_comparison(
        mut receiver: watch::Receiver<TenantConfig>,
        comparison: KeyComparison,
    ) -> MtResult<Self> {
        let initial = build_map(&receiver.borrow_and_update(), comparison)?;
        Ok(Self {
            receiver: Mutex::new(receiver),
            tenants: ArcSwap::from_pointee(initial),
            comparison,
        })
    }

    /// Convenience constructor for configuration that never reloads.
    pub fn fixed(config: TenantConfig) -> MtResult<Self> {
        let (sender, receiver) = watch::channel(config);
        // Dropping the sender closes the channel; has_changed then reports an
        // error, which lookups treat as "no change".
        drop(sender);
        Self::new(receiver)
    }

    fn refresh_if_changed(&self) {
        let mut receiver = self.receiver.lock();
        if !receiver.has_changed().unwrap_or(false) {
            return;
        }
        let config = receiver.borrow_and_update().clone();
        drop(receiver);

        match build_map(&config, self.comparison) {
            Ok(map) => {
                debug!(tenants = map.len(), "tenant configuration reloaded");
                self.tenants.store(Arc::new(map));
            }
            Err(err) => {
                // Keep serving the previous snapshot.
                error!(error = %err, "tenant configuration reload failed");
            }
        }
    }
}

fn build_map(config: &TenantConfig, comparison: KeyComparison) -> MtResult<TenantMap> {
    let mut map = TenantMap::with_capacity(config.tenants.len());
    for entry in &config.tenants {
        let merged = entry.merged_with(config.defaults.as_ref());
        let key = merged
            .key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                MultiTenantError::config("tenant configuration entry is missing a key")
            })?;
        let tenant = TenantInfo {
            id: merged.id.unwrap_or_default(),
            key: key.clone(),
            name: merged.name.unwrap_or_default(),
            extra: merged.extra,
        };
        map.insert(comparison.normalize(&key), tenant);
    }
    Ok(map)
}

#[async_trait]
impl MultiTenantStore for ConfigurationStore {
    fn name(&self) -> &'static str {
        "configuration"
    }

    async fn try_get(&self, id: &str) -> MtResult<Option<TenantInfo>> {
        self.refresh_if_changed();
        let map = self.tenants.load();
        Ok(map.values().find(|tenant| tenant.id == id).cloned())
    }

    async fn try_get_by_key(&self, key: &str) -> MtResult<Option<TenantInfo>> {
        self.refresh_if_changed();
        let normalized = self.comparison.normalize(key);
        Ok(self.tenants.load().get(&normalized).cloned())
    }

    async fn get_all(&self) -> MtResult<Vec<TenantInfo>> {
        self.refresh_if_changed();
        Ok(self.tenants.load().values().cloned().collect())
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
