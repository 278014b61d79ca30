//! In-process `DefinitionStore`, for tests and embedders without a database.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use super::{DefinitionRow, DefinitionStore, Identity, InPlaceUpdate, Scope, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: u64,
    offline: bool,
    rows: BTreeMap<Identity, DefinitionRow>,
}

impl Inner {
    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn latest(&self, name: &str, scope: &Scope) -> Option<&DefinitionRow> {
        self.rows
            .values()
            .filter(|row| row.name == name && &row.scope == scope)
            .max_by_key(|row| row.version)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Simulate an outage: every call fails with `Unavailable` until reset.
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().offline = offline;
    }

    /// All revisions of `name` in `scope`, oldest first.
    pub fn revisions(&self, name: &str, scope: &Scope) -> Vec<(u32, Identity)> {
        let inner = self.inner.lock();
        let mut found: Vec<(u32, Identity)> = inner
            .rows
            .iter()
            .filter(|(_, row)| row.name == name && &row.scope == scope)
            .map(|(identity, row)| (row.version, *identity))
            .collect();
        found.sort();
        found
    }

    pub fn len(&self) -> usize {
        self.inner.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().rows.is_empty()
    }
}

impl DefinitionStore for MemoryStore {
    fn find_latest(
        &self,
        name: &str,
        scope: &Scope,
    ) -> Result<Option<(u32, DefinitionRow)>, StoreError> {
        let inner = self.inner.lock();
        inner.check_online()?;
        Ok(inner
            .latest(name, scope)
            .map(|row| (row.version, row.clone())))
    }

    fn insert_revision(
        &self,
        mut row: DefinitionRow,
        expected_latest: Option<u32>,
    ) -> Result<Identity, StoreError> {
        let mut inner = self.inner.lock();
        inner.check_online()?;

        let found = inner.latest(&row.name, &row.scope).map(|r| r.version);
        if found != expected_latest {
            return Err(StoreError::Conflict {
                name: row.name,
                expected: expected_latest,
                found,
            });
        }

        inner.last_id += 1;
        let identity = Identity(inner.last_id);
        row.identity = Some(identity);
        inner.rows.insert(identity, row);
        Ok(identity)
    }

    fn update_in_place(&self, identity: Identity, update: InPlaceUpdate) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.check_online()?;

        let renamed_in = match inner.rows.get(&identity) {
            Some(row) if row.name != update.name => Some(row.scope.clone()),
            Some(_) => None,
            None => return Err(StoreError::NotFound(identity)),
        };
        if let Some(scope) = renamed_in {
            let found = inner.latest(&update.name, &scope).map(|r| r.version);
            if found.is_some() {
                return Err(StoreError::Conflict {
                    name: update.name,
                    expected: None,
                    found,
                });
            }
        }

        let row = inner
            .rows
            .get_mut(&identity)
            .ok_or(StoreError::NotFound(identity))?;
        row.name = update.name;
        row.text = update.text;
        row.ext_version = update.ext_version;
        row.last_updated = update.last_updated;
        row.last_updated_by = update.last_updated_by;
        Ok(())
    }

    fn load_by_identity(&self, identity: Identity) -> Result<DefinitionRow, StoreError> {
        let inner = self.inner.lock();
        inner.check_online()?;
        inner
            .rows
            .get(&identity)
            .cloned()
            .ok_or(StoreError::NotFound(identity))
    }
}
