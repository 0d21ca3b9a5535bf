//! Pluggable key/value persistence for session state.
//!
//! The engine persists the auth key and server salt per endpoint, plus two
//! global values, under these keys:
//!
//! * `<endpoint_id>authKey` — the 256-byte authorization key
//! * `<endpoint_id>serverSalt` — current salt, 8 bytes little-endian
//! * `timeOffset` — clock skew in seconds, 4 bytes little-endian
//! * `defaultEndpointId` — 4 bytes little-endian

use std::collections::HashMap;
use std::sync::Mutex;

/// An abstraction over where session data is persisted.
///
/// Implementations must serialize concurrent access per key; the engine
/// never requires cross-key transactions.
pub trait Storage: Send + Sync {
    /// Fetch a stored value, or `None` if absent.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value, replacing any previous one.
    fn set(&self, key: &str, value: Vec<u8>);

    /// Remove a stored value (e.g. on key invalidation).
    fn remove(&self, key: &str);
}

/// An ephemeral store that keeps everything in memory.
///
/// Useful for testing or for clients that should always start fresh.
#[derive(Default)]
pub struct InMemoryStorage {
    data: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for InMemoryStorage {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.data.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: Vec<u8>) {
        self.data.lock().unwrap().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.data.lock().unwrap().remove(key);
    }
}

/// Storage key for an endpoint's auth key.
pub(crate) fn auth_key_key(endpoint_id: i32) -> String {
    format!("{endpoint_id}authKey")
}

/// Storage key for an endpoint's server salt.
pub(crate) fn salt_key(endpoint_id: i32) -> String {
    format!("{endpoint_id}serverSalt")
}

/// Storage key for the global clock offset.
pub(crate) const TIME_OFFSET_KEY: &str = "timeOffset";

/// Storage key for the default endpoint id.
pub(crate) const DEFAULT_ENDPOINT_KEY: &str = "defaultEndpointId";
