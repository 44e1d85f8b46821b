use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The access-control view of a repository: which identities may use it.
///
/// `revision` is bumped by the store on every write and lets writers
/// detect that the record changed since they read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryAccess {
    pub name: String,
    pub users: BTreeSet<String>,
    #[serde(default)]
    pub revision: u64,
}

impl RepositoryAccess {
    pub fn new<I, S>(name: &str, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            users: users.into_iter().map(Into::into).collect(),
            revision: 0,
        }
    }

    /// True when `user` is the only identity with access.
    pub fn is_sole_user(&self, user: &str) -> bool {
        self.users.len() == 1 && self.users.contains(user)
    }

    /// The access list with `user` taken out.
    pub fn users_without(&self, user: &str) -> BTreeSet<String> {
        self.users.iter().filter(|u| *u != user).cloned().collect()
    }
}
