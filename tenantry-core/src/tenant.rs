//! Tenant record and key comparison rules.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{MtResult, MultiTenantError};

/// Upper bound on tenant id length.
pub const TENANT_ID_MAX_LENGTH: usize = 64;

/// How stores compare tenant keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyComparison {
    /// `"Acme"` and `"acme"` name the same tenant.
    #[default]
    CaseInsensitive,
    CaseSensitive,
}

impl KeyComparison {
    /// Normalized form of a key under this comparison.
    pub fn normalize(&self, key: &str) -> String {
        match self {
            KeyComparison::CaseInsensitive => key.to_lowercase(),
            KeyComparison::CaseSensitive => key.to_owned(),
        }
    }
}

/// Basic tenant information.
///
/// `id` is the stable identity and is never meant to change once assigned;
/// `key` is the lookup-oriented identifier strategies extract from requests
/// and may be updated; `name` is display-only. Custom per-tenant fields
/// (connection strings, plan names, ...) live in the flattened `extra` map,
/// so the record stays open without subtyping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TenantInfo {
    #[serde(alias = "Id", default)]
    pub id: String,
    #[serde(alias = "Key", default)]
    pub key: String,
    #[serde(alias = "Name", default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TenantInfo {
    /// Builds a tenant record, enforcing the id length bound.
    pub fn new(
        id: impl Into<String>,
        key: impl Into<String>,
        name: impl Into<String>,
    ) -> MtResult<Self> {
        let id = id.into();
        if id.chars().count() > TENANT_ID_MAX_LENGTH {
            return Err(MultiTenantError::config(format!(
                "tenant id cannot exceed {TENANT_ID_MAX_LENGTH} characters"
            )));
        }
        Ok(Self {
            id,
            key: key.into(),
            name: name.into(),
            extra: Map::new(),
        })
    }

    /// Adds a custom field to the record.
    pub fn with_extra(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(field.into(), value.into());
        self
    }

    /// Reads a custom field, if present.
    pub fn extra(&self, field: &str) -> Option<&Value> {
        self.extra.get(field)
    }
}
