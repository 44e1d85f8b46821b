use crate::core::errors::Result;
use crate::core::models::identity::Identity;

/// Port for the collection of identity records, keyed by name.
///
/// Lookups of a missing name fail with `UserNotFound`; every other
/// failure surfaces as a `Storage` error.
pub trait IdentityStore: Send + Sync {
    /// Insert a new record. Fails if the name is already taken.
    fn insert(&self, identity: &Identity) -> Result<()>;

    fn find_by_name(&self, name: &str) -> Result<Identity>;

    /// Replace the record stored under `name`.
    fn update_by_name(&self, name: &str, identity: &Identity) -> Result<()>;

    fn delete_by_name(&self, name: &str) -> Result<()>;

    /// All records, ordered by name.
    fn list(&self) -> Result<Vec<Identity>>;
}
