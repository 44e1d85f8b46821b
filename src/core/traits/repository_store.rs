use std::collections::BTreeSet;

use crate::core::errors::Result;
use crate::core::models::repository::RepositoryAccess;

/// Outcome of a revision-checked write to a repository's access list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsersUpdate {
    /// The write went through; `revision` is the record's new revision.
    Applied { revision: u64 },
    /// The record moved on since it was read. Nothing was written.
    Stale { current: u64 },
}

/// Port for repository access records.
///
/// Only the `users` field is written through this port. `insert`, `find_by_name`
/// and `list` exist for the repository commands; the identity services use
/// `find_all_referencing` and `update_users`.
pub trait RepositoryStore: Send + Sync {
    fn insert(&self, repository: &RepositoryAccess) -> Result<()>;

    fn find_by_name(&self, name: &str) -> Result<RepositoryAccess>;

    fn list(&self) -> Result<Vec<RepositoryAccess>>;

    /// Every repository whose access list contains `user`.
    fn find_all_referencing(&self, user: &str) -> Result<Vec<RepositoryAccess>>;

    /// Replace the access list of `repository` if its revision still equals
    /// `expected_revision`.
    fn update_users(
        &self,
        repository: &str,
        users: &BTreeSet<String>,
        expected_revision: u64,
    ) -> Result<UsersUpdate>;
}
