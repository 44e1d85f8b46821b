use std::path::PathBuf;
use std::sync::Mutex;

use crate::adapters::stores::json_file;
use crate::core::errors::{Result, Step, WardenError};
use crate::core::models::identity::Identity;
use crate::core::traits::identity_store::IdentityStore;

/// Identity records kept as a JSON array in a single file.
///
/// Every call reads the document, applies one change and writes it back.
/// Calls through the same instance are serialized; separate processes
/// sharing the file are not coordinated.
pub struct JsonIdentityStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonIdentityStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn load(&self, step: Step, entity: &str) -> Result<Vec<Identity>> {
        json_file::load(&self.path).map_err(|reason| storage(step, entity, reason))
    }

    fn save(&self, records: &[Identity], step: Step, entity: &str) -> Result<()> {
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

fn not_found(step: Step, name: &str) -> WardenError {
    WardenError::UserNotFound {
        step,
        name: name.to_string(),
    }
}

impl IdentityStore for JsonIdentityStore {
    fn insert(&self, identity: &Identity) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut records = self.load(Step::Insert, &identity.name)?;

        if records.iter().any(|r| r.name == identity.name) {
            return Err(storage(
                Step::Insert,
                &identity.name,
                "a user with this name already exists".into(),
            ));
        }

        records.push(identity.clone());
        self.save(&records, Step::Insert, &identity.name)
    }

    fn find_by_name(&self, name: &str) -> Result<Identity> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.load(Step::Lookup, name)?
            .into_iter()
            .find(|r| r.name == name)
            .ok_or_else(|| not_found(Step::Lookup, name))
    }

    fn update_by_name(&self, name: &str, identity: &Identity) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut records = self.load(Step::Update, name)?;

        let slot = records
            .iter_mut()
            .find(|r| r.name == name)
            .ok_or_else(|| not_found(Step::Update, name))?;
        *slot = identity.clone();

        self.save(&records, Step::Update, name)
    }

    fn delete_by_name(&self, name: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut records = self.load(Step::DeleteRecord, name)?;

        let before = records.len();
        records.retain(|r| r.name != name);
        if records.len() == before {
            return Err(not_found(Step::DeleteRecord, name));
        }

        self.save(&records, Step::DeleteRecord, name)
    }

    fn list(&self) -> Result<Vec<Identity>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut records = self.load(Step::Lookup, "*")?;
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }
}
