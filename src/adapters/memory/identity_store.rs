use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::core::errors::{Result, Step, WardenError};
use crate::core::models::identity::Identity;
use crate::core::traits::identity_store::IdentityStore;

/// In-memory identity store for testing.
#[derive(Default)]
pub struct MemoryIdentityStore {
    records: RwLock<BTreeMap<String, Identity>>,
    writes: AtomicUsize,
    fail_deletes: AtomicBool,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record without counting it as a write.
    pub fn seed(&self, identity: Identity) {
        self.records
            .write()
            .unwrap()
            .insert(identity.name.clone(), identity);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.read().unwrap().contains_key(name)
    }

    /// Number of successful inserts, updates and deletes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn insert(&self, identity: &Identity) -> Result<()> {
        let mut records = self.records.write().unwrap();
        if records.contains_key(&identity.name) {
            return Err(WardenError::Storage {
                step: Step::Insert,
                entity: identity.name.clone(),
                reason: "a user with this name already exists".into(),
            });
        }
        records.insert(identity.name.clone(), identity.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn find_by_name(&self, name: &str) -> Result<Identity> {
        self.records
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| WardenError::UserNotFound {
                step: Step::Lookup,
                name: name.to_string(),
            })
    }

    fn update_by_name(&self, name: &str, identity: &Identity) -> Result<()> {
        let mut records = self.records.write().unwrap();
        let slot = records.get_mut(name).ok_or_else(|| WardenError::UserNotFound {
            step: Step::Update,
            name: name.to_string(),
        })?;
        *slot = identity.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn delete_by_name(&self, name: &str) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(WardenError::Storage {
                step: Step::DeleteRecord,
                entity: name.to_string(),
                reason: "store unavailable".into(),
            });
        }
        self.records
            .write()
            .unwrap()
            .remove(name)
            .ok_or_else(|| WardenError::UserNotFound {
                step: Step::DeleteRecord,
                name: name.to_string(),
            })?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Identity>> {
        Ok(self.records.read().unwrap().values().cloned().collect())
    }
}
