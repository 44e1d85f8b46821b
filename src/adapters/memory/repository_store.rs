use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, RwLock};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::errors::{Result, Step, WardenError};
use crate::core::models::repository::RepositoryAccess;
use crate::core::traits::repository_store::{RepositoryStore, UsersUpdate};

/// In-memory repository store for testing.
///
/// `fail_updates_after(n)` lets the first `n` access-list writes through
/// and rejects the rest.
#[derive(Default)]
pub struct MemoryRepositoryStore {
    records: RwLock<BTreeMap<String, RepositoryAccess>>,
    writes: AtomicUsize,
    fail_after: Mutex<Option<usize>>,
}

impl MemoryRepositoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repositories<I>(repositories: I) -> Self
    where
        I: IntoIterator<Item = RepositoryAccess>,
    {
        let store = Self::new();
        for repo in repositories {
            store
                .records
                .write()
                .unwrap()
                .insert(repo.name.clone(), repo);
        }
        store
    }

    pub fn users_of(&self, name: &str) -> Vec<String> {
        self.records
            .read()
            .unwrap()
            .get(name)
            .map(|r| r.users.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn delete(&self, name: &str) {
        self.records.write().unwrap().remove(name);
    }

    pub fn all(&self) -> Vec<RepositoryAccess> {
        self.records.read().unwrap().values().cloned().collect()
    }

    /// Number of successful access-list writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_updates_after(&self, successful: usize) {
        *self.fail_after.lock().unwrap() = Some(successful);
    }
}

impl RepositoryStore for MemoryRepositoryStore {
    fn insert(&self, repository: &RepositoryAccess) -> Result<()> {
        let mut records = self.records.write().unwrap();
        if records.contains_key(&repository.name) {
            return Err(WardenError::Storage {
                step: Step::Insert,
                entity: repository.name.clone(),
                reason: "a repository with this name already exists".into(),
            });
        }
        records.insert(repository.name.clone(), repository.clone());
        Ok(())
    }

    fn find_by_name(&self, name: &str) -> Result<RepositoryAccess> {
        self.records
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| WardenError::RepositoryNotFound {
                name: name.to_string(),
            })
    }

    fn list(&self) -> Result<Vec<RepositoryAccess>> {
        Ok(self.all())
    }

    fn find_all_referencing(&self, user: &str) -> Result<Vec<RepositoryAccess>> {
        Ok(self
            .records
            .read()
            .unwrap()
            .values()
            .filter(|r| r.users.contains(user))
            .cloned()
            .collect())
    }

    fn update_users(
        &self,
        repository: &str,
        users: &BTreeSet<String>,
        expected_revision: u64,
    ) -> Result<UsersUpdate> {
        if let Some(limit) = *self.fail_after.lock().unwrap()
            && self.write_count() >= limit
        {
            return Err(WardenError::Storage {
                step: Step::Update,
                entity: repository.to_string(),
                reason: "store unavailable".into(),
            });
        }

        let mut records = self.records.write().unwrap();
        let record = records
            .get_mut(repository)
            .ok_or_else(|| WardenError::RepositoryNotFound {
                name: repository.to_string(),
            })?;

        if record.revision != expected_revision {
            return Ok(UsersUpdate::Stale {
                current: record.revision,
            });
        }

        record.users = users.clone();
        record.revision += 1;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(UsersUpdate::Applied {
            revision: record.revision,
        })
    }
}
