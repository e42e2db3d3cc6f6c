//! In-memory API key store (spec §4.1 data model: `ApiKey{key, name,
//! permissions, createdAt, lastUsed}`).
//!
//! Keys are created by issuance and destroyed by revocation; there is no
//! persistence requirement (the gateway's process-local state is
//! restart-lossy, same as the model manager's metadata).

use dashmap::DashMap;
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct ApiKey {
    pub key: String,
    pub name: String,
    pub permissions: HashSet<String>,
    pub created_at: u64,
    pub last_used: Option<u64>,
}

impl ApiKey {
    pub fn new(key: impl Into<String>, name: impl Into<String>, permissions: Vec<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            permissions: permissions.into_iter().collect(),
            created_at: now_ms(),
            last_used: None,
        }
    }

    /// Holding the `*` wildcard grants every permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains("*") || self.permissions.contains(permission)
    }
}

/// Keyed by the opaque key string itself — lookups are the hot path on
/// every authenticated request, so this is a flat map, not an index.
#[derive(Default)]
pub struct Keystore {
    keys: DashMap<String, ApiKey>,
}

impl Keystore {
    pub fn new() -> Self {
        Self { keys: DashMap::new() }
    }

    pub fn issue(&self, key: ApiKey) {
        self.keys.insert(key.key.clone(), key);
    }

    pub fn revoke(&self, key: &str) -> bool {
        self.keys.remove(key).is_some()
    }

    /// Look up `key`; on hit, stamp `lastUsed = now` and return a snapshot.
    pub fn authenticate(&self, key: &str) -> Option<ApiKey> {
        let mut entry = self.keys.get_mut(key)?;
        entry.last_used = Some(now_ms());
        Some(entry.clone())
    }
}
