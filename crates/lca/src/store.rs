//! String-keyed, string-valued persistent storage.
//!
//! Reads never fail: a missing key, an unreadable backend and an undecodable
//! value all look like "absent" to the caller.

use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::project::{self, Project};

pub mod keys {
    pub const THEME: &str = "lca_theme";
    pub const FONT_SIZE: &str = "lca_font_size";
    pub const AUTO_RUN: &str = "lca_auto_run";
    pub const PROJECTS: &str = "lca_projects";
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Saved projects in save order. Undecodable lists load as empty.
pub fn load_projects(store: &impl KeyValueStore) -> Vec<Project> {
    let Some(json) = store.get(keys::PROJECTS) else {
        return Vec::new();
    };
    match project::decode_projects(&json) {
        Ok(projects) => projects,
        Err(error) => {
            log::warn!("Ignoring unreadable saved projects: {error}");
            Vec::new()
        }
    }
}

pub fn persist_projects(
    store: &mut impl KeyValueStore,
    projects: &[Project],
) -> Result<(), StoreError> {
    let json = project::encode_projects(projects).map_err(|source| StoreError::Encode {
        key: keys::PROJECTS.to_owned(),
        source,
    })?;
    store.set(keys::PROJECTS, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::SourceTexts;
    use chrono::Utc;

    #[test]
    fn absent_list_is_empty() {
        assert!(load_projects(&MemoryStore::new()).is_empty());
    }

    #[test]
    fn corrupt_list_is_treated_as_absent() {
        let mut store = MemoryStore::new();
        store.set(keys::PROJECTS, "{not json").unwrap();
        assert!(load_projects(&store).is_empty());
    }

    #[test]
    fn persisted_list_loads_back_in_order() {
        let mut store = MemoryStore::new();
        let projects = vec![
            Project::new(SourceTexts::new("1", "", ""), Utc::now()),
            Project::new(SourceTexts::new("2", "", ""), Utc::now()),
        ];
        persist_projects(&mut store, &projects).unwrap();
        assert_eq!(load_projects(&store), projects);
    }

    #[test]
    fn set_overwrites_in_place() {
        let mut store = MemoryStore::new();
        store.set(keys::THEME, "dark").unwrap();
        store.set(keys::THEME, "light").unwrap();
        assert_eq!(store.get(keys::THEME).as_deref(), Some("light"));
        assert_eq!(store.len(), 1);
    }
}
