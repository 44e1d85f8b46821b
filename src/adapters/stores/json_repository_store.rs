use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::adapters::stores::json_file;
use crate::core::errors::{Result, Step, WardenError};
use crate::core::models::repository::RepositoryAccess;
use crate::core::traits::repository_store::{RepositoryStore, UsersUpdate};

/// Repository access records kept as a JSON array in a single file.
///
/// `update_users` is a compare-and-swap on `revision`: the write only
/// lands if the record still has the revision the caller read.
pub struct JsonRepositoryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonRepositoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn load(&self, step: Step, entity: &str) -> Result<Vec<RepositoryAccess>> {
        json_file::load(&self.path).map_err(|reason| storage(step, entity, reason))
    }

    fn save(&self, records: &[RepositoryAccess], step: Step, entity: &str) -> Result<()> {
        json_file::save(&self.path, records).map_err(|reason| storage(step, entity, reason))
    }
}

fn storage(step: Step, entity: &str, reason: String) -> WardenError {
    WardenError::Storage {
        step,
        entity: entity.to_string(),
        reason,
    }
}

impl RepositoryStore for JsonRepositoryStore {
    fn insert(&self, repository: &RepositoryAccess) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut records = self.load(Step::Insert, &repository.name)?;

        if records.iter().any(|r| r.name == repository.name) {
            return Err(storage(
                Step::Insert,
                &repository.name,
                "a repository with this name already exists".into(),
            ));
        }

        records.push(RepositoryAccess {
            revision: 1,
            ..repository.clone()
        });
        self.save(&records, Step::Insert, &repository.name)
    }

    fn find_by_name(&self, name: &str) -> Result<RepositoryAccess> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.load(Step::Lookup, name)?
            .into_iter()
            .find(|r| r.name == name)
            .ok_or_else(|| WardenError::RepositoryNotFound {
                name: name.to_string(),
            })
    }

    fn list(&self) -> Result<Vec<RepositoryAccess>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut records = self.load(Step::Lookup, "*")?;
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    fn find_all_referencing(&self, user: &str) -> Result<Vec<RepositoryAccess>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut records: Vec<_> = self
            .load(Step::Lookup, user)?
            .into_iter()
            .filter(|r| r.users.contains(user))
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    fn update_users(
        &self,
        repository: &str,
        users: &BTreeSet<String>,
        expected_revision: u64,
    ) -> Result<UsersUpdate> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut records = self.load(Step::Update, repository)?;

        let record = records
            .iter_mut()
            .find(|r| r.name == repository)
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
        let revision = record.revision;

        self.save(&records, Step::Update, repository)?;
        Ok(UsersUpdate::Applied { revision })
    }
}
