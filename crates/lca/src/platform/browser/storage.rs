use web_sys::Storage;

use crate::error::{InitError, StoreError};
use crate::store::KeyValueStore;

/// `window.localStorage`. Values are stored as plain strings so earlier saves
/// stay readable.
pub struct LocalStore {
    storage: Option<Storage>,
}

impl LocalStore {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|window| window.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("localStorage is not available, nothing will be persisted");
        }
        Self { storage }
    }

    /// Like [`LocalStore::new`], but refuses a window without localStorage.
    pub fn open() -> Result<Self, InitError> {
        let store = Self::new();
        if store.is_available() {
            Ok(store)
        } else {
            Err(InitError::StorageUnavailable)
        }
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_some()
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok()?
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = self.storage.as_ref().ok_or(StoreError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|error| StoreError::Write {
                key: key.to_owned(),
                reason: format!("{error:?}"),
            })
    }
}
