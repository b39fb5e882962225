//! Server-side session access, as the session strategy sees it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// String key/value view over whatever session mechanism the application
/// uses. A session layer inserts a [`SessionHandle`] into request extensions
/// and the session strategy reads (and optionally writes) through it.
pub trait SessionAccess: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

pub type SessionHandle = Arc<dyn SessionAccess>;

/// In-process session backing for tests and single-node demos.
#[derive(Default)]
pub struct MemorySession {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(self) -> SessionHandle {
        Arc::new(self)
    }
}

impl SessionAccess for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_owned(), value.to_owned());
    }
}
