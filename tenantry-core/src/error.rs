use thiserror::Error;

/// Result type for tenant resolution operations.
pub type MtResult<T> = Result<T, MultiTenantError>;

/// Error taxonomy for tenant resolution.
///
/// The propagation policy is asymmetric on purpose: strategy failures abort
/// the whole resolution attempt (an identifier from a half-broken source
/// cannot be trusted), while store failures are logged and treated as a miss
/// so later stores may still answer.
#[derive(Error, Debug)]
pub enum MultiTenantError {
    /// Invalid construction-time input: bad host template, duplicate tenant
    /// in a seeded store, missing configuration section. Fatal at startup.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A strategy received a request context of an unexpected type.
    #[error("Strategy \"{strategy}\" received a request context of unexpected type")]
    InvalidContext { strategy: &'static str },

    /// A strategy failed during key extraction. Raised by the strategy
    /// wrapper; aborts resolution for the current request.
    #[error("Strategy \"{strategy}\" failed during key extraction")]
    Resolution {
        strategy: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A store collaborator failed during lookup or mutation. The store
    /// wrapper catches this and converts it to a miss.
    #[error("Store operation failed")]
    Store(#[source] anyhow::Error),

    /// An optional operation the variant does not implement, e.g. `get_all`
    /// on a cache-backed store. Surfaced to the caller directly.
    #[error("\"{component}\" does not support {operation}")]
    NotSupported {
        component: &'static str,
        operation: &'static str,
    },

    /// A resolution event hook failed; propagates as a resolution failure.
    #[error("Resolution event hook failed")]
    Event(#[source] anyhow::Error),

    /// The caller-supplied cancellation signal fired mid-resolution.
    #[error("Resolution canceled")]
    Canceled,

    /// Anything a collaborator (delegate closure, authenticator, cache or
    /// remote backend) reports outside the fixed taxonomy.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl MultiTenantError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn not_supported(component: &'static str, operation: &'static str) -> Self {
        Self::NotSupported {
            component,
            operation,
        }
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported { .. })
    }
}

impl From<serde_json::Error> for MultiTenantError {
    fn from(err: serde_json::Error) -> Self {
        Self::Store(err.into())
    }
}
