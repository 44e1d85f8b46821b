use crate::core::errors::{Result, Step};
use crate::core::models::identity::{Identity, validate_key};
use crate::core::services::access_revocation::AccessRevocation;
use crate::core::traits::identity_store::IdentityStore;
use crate::core::traits::key_authorizer::KeyAuthorizer;
use crate::core::traits::repository_store::RepositoryStore;

/// What a successful removal changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub identity: Identity,
    /// Repositories the user was taken out of.
    pub revoked_from: Vec<String>,
}

/// Owns the identity lifecycle: create, remove, add key.
///
/// Store writes always happen before key propagation. The store is the
/// source of truth; the key authorizer mirrors it and is never used to
/// roll the store back. Each method documents which steps stay committed
/// when a later step fails.
pub struct UserService<S: IdentityStore, R: RepositoryStore, K: KeyAuthorizer> {
    pub users: S,
    pub repositories: R,
    pub keys: K,
}

impl<S: IdentityStore, R: RepositoryStore, K: KeyAuthorizer> UserService<S, R, K> {
    /// Create a user and authorize its keys.
    ///
    /// Validation and insert failures leave nothing behind. If key
    /// propagation fails the record stays and the `Gateway` error is
    /// returned; retry with `add_key` or remove the user.
    pub fn create(&self, name: &str, keys: &[String]) -> Result<Identity> {
        let identity = Identity::new(name, keys.to_vec())?;

        self.users
            .insert(&identity)
            .map_err(|e| e.at(Step::Insert))?;

        self.keys
            .bulk_add(&identity.keys, &identity.name)
            .map_err(|e| e.at(Step::PropagateKeys))?;

        Ok(identity)
    }

    /// Remove a user, its repository access and its keys.
    ///
    /// A `SoleOwner` conflict leaves everything untouched. A failure to
    /// delete the record leaves the repository access lists already
    /// stripped; a failure to revoke keys leaves the record deleted.
    pub fn remove(&self, name: &str) -> Result<Removal> {
        let identity = self
            .users
            .find_by_name(name)
            .map_err(|e| e.at(Step::Lookup))?;

        let revoked_from =
            AccessRevocation::new(&self.repositories).evaluate_and_revoke(&identity.name)?;

        self.users
            .delete_by_name(&identity.name)
            .map_err(|e| e.at(Step::DeleteRecord))?;

        self.keys
            .bulk_remove(&identity.keys, &identity.name)
            .map_err(|e| e.at(Step::RevokeKeys))?;

        Ok(Removal {
            identity,
            revoked_from,
        })
    }

    /// Append a key to an existing user and authorize it.
    ///
    /// A key that cannot be written as one authorized_keys line is
    /// rejected before the store is touched. Duplicates are kept. If
    /// propagation fails the key stays recorded.
    pub fn add_key(&self, name: &str, key: &str) -> Result<Identity> {
        validate_key(name, key)?;

        let mut identity = self
            .users
            .find_by_name(name)
            .map_err(|e| e.at(Step::Lookup))?;

        identity.keys.push(key.to_string());
        self.users
            .update_by_name(&identity.name, &identity)
            .map_err(|e| e.at(Step::Update))?;

        self.keys
            .add(key, &identity.name)
            .map_err(|e| e.at(Step::PropagateKeys))?;

        Ok(identity)
    }
}
