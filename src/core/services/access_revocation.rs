use crate::core::errors::{Result, Step, WardenError};
use crate::core::models::repository::RepositoryAccess;
use crate::core::traits::repository_store::{RepositoryStore, UsersUpdate};

/// Repositories a user can be taken out of, as observed by the guard phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationPlan {
    pub user: String,
    /// Records exactly as read, including the revision each write must match.
    pub repositories: Vec<RepositoryAccess>,
}

/// Strips a user from every repository access list it appears in,
/// refusing to leave any repository without users.
///
/// Runs in two phases. `evaluate` reads and checks without writing;
/// `apply` writes. Writes are revision-checked, so a repository that
/// changed after `evaluate` read it is never written from stale data.
pub struct AccessRevocation<'a, R: RepositoryStore> {
    pub repositories: &'a R,
}

impl<'a, R: RepositoryStore> AccessRevocation<'a, R> {
    pub fn new(repositories: &'a R) -> Self {
        Self { repositories }
    }

    /// Guard phase: find every repository referencing `user` and fail
    /// with `SoleOwner` if `user` is the last user of any of them.
    ///
    /// One sole-owner repository blocks the whole revocation. All blocking
    /// repositories are named in the error.
    pub fn evaluate(&self, user: &str) -> Result<RevocationPlan> {
        let repositories = self
            .repositories
            .find_all_referencing(user)
            .map_err(|e| e.at(Step::Guard))?;

        let mut blocking: Vec<String> = repositories
            .iter()
            .filter(|r| r.is_sole_user(user))
            .map(|r| r.name.clone())
            .collect();

        if !blocking.is_empty() {
            blocking.sort();
            return Err(WardenError::SoleOwner {
                name: user.to_string(),
                repositories: blocking,
            });
        }

        Ok(RevocationPlan {
            user: user.to_string(),
            repositories,
        })
    }

    /// Mutation phase: write each access list without the user.
    ///
    /// Stops at the first failed write. Repositories already written stay
    /// written. Returns the names of the repositories updated.
    pub fn apply(&self, plan: &RevocationPlan) -> Result<Vec<String>> {
        let mut revoked = Vec::with_capacity(plan.repositories.len());

        for repo in &plan.repositories {
            let remaining = repo.users_without(&plan.user);
            if remaining.is_empty() {
                return Err(WardenError::SoleOwner {
                    name: plan.user.clone(),
                    repositories: vec![repo.name.clone()],
                });
            }

            // Earlier repositories may already be written, so a record that
            // vanished since `evaluate` is a failed write, not a lookup miss.
            let outcome = self
                .repositories
                .update_users(&repo.name, &remaining, repo.revision)
                .map_err(|e| match e {
                    WardenError::RepositoryNotFound { name } => WardenError::Storage {
                        step: Step::RevokeRepositories,
                        entity: plan.user.clone(),
                        reason: format!("repository '{name}' no longer exists"),
                    },
                    other => other.at(Step::RevokeRepositories),
                })?;

            match outcome {
                UsersUpdate::Applied { .. } => revoked.push(repo.name.clone()),
                UsersUpdate::Stale { current } => {
                    return Err(WardenError::StaleRepository {
                        name: plan.user.clone(),
                        repository: repo.name.clone(),
                        expected: repo.revision,
                        found: current,
                    });
                }
            }
        }

        Ok(revoked)
    }

    /// Guard, then strip. A `SoleOwner` error means nothing was written.
    pub fn evaluate_and_revoke(&self, user: &str) -> Result<Vec<String>> {
        let plan = self.evaluate(user)?;
        self.apply(&plan)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::adapters::memory::repository_store::MemoryRepositoryStore;
    use crate::core::errors::ErrorKind;

    fn repo(name: &str, users: &[&str]) -> RepositoryAccess {
        RepositoryAccess::new(name, users.iter().copied())
    }

    #[test]
    fn user_without_repositories_is_a_noop() {
        let store = MemoryRepositoryStore::with_repositories([repo("infra", &["bob"])]);
        let revoked = AccessRevocation::new(&store)
            .evaluate_and_revoke("alice")
            .unwrap();

        assert!(revoked.is_empty());
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn strips_user_from_shared_repositories() {
        let store = MemoryRepositoryStore::with_repositories([
            repo("infra", &["alice", "bob"]),
            repo("docs", &["alice", "carol", "dave"]),
            repo("site", &["carol"]),
        ]);

        let revoked = AccessRevocation::new(&store)
            .evaluate_and_revoke("alice")
            .unwrap();

        assert_eq!(revoked, vec!["docs", "infra"]);
        assert_eq!(store.users_of("infra"), vec!["bob"]);
        assert_eq!(store.users_of("docs"), vec!["carol", "dave"]);
        assert_eq!(store.users_of("site"), vec!["carol"]);
    }

    #[test]
    fn one_sole_owner_repository_blocks_everything() {
        let store = MemoryRepositoryStore::with_repositories([
            repo("a-shared", &["alice", "bob"]),
            repo("b-solo", &["alice"]),
        ]);

        let err = AccessRevocation::new(&store)
            .evaluate_and_revoke("alice")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(store.users_of("a-shared"), vec!["alice", "bob"]);
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn conflict_names_every_blocking_repository() {
        let store = MemoryRepositoryStore::with_repositories([
            repo("zeta", &["alice"]),
            repo("alpha", &["alice"]),
            repo("shared", &["alice", "bob"]),
        ]);

        match AccessRevocation::new(&store).evaluate("alice") {
            Err(WardenError::SoleOwner { repositories, .. }) => {
                assert_eq!(repositories, vec!["alpha", "zeta"]);
            }
            other => panic!("expected SoleOwner, got {other:?}"),
        }
    }

    #[test]
    fn evaluate_is_repeatable_and_side_effect_free() {
        let store = MemoryRepositoryStore::with_repositories([
            repo("infra", &["alice", "bob"]),
            repo("solo", &["bob"]),
        ]);
        let coordinator = AccessRevocation::new(&store);

        let first = coordinator.evaluate("alice").unwrap();
        let second = coordinator.evaluate("alice").unwrap();
        assert_eq!(first, second);

        let bob_first = coordinator.evaluate("bob").unwrap_err();
        let bob_second = coordinator.evaluate("bob").unwrap_err();
        assert_eq!(bob_first.to_string(), bob_second.to_string());

        assert_eq!(store.write_count(), 0);
        assert_eq!(store.users_of("infra"), vec!["alice", "bob"]);
    }

    #[test]
    fn failed_write_stops_and_keeps_earlier_writes() {
        let store = MemoryRepositoryStore::with_repositories([
            repo("a", &["alice", "bob"]),
            repo("b", &["alice", "bob"]),
            repo("c", &["alice", "bob"]),
        ]);
        store.fail_updates_after(1);

        let err = AccessRevocation::new(&store)
            .evaluate_and_revoke("alice")
            .unwrap_err();

        assert!(matches!(
            err,
            WardenError::Storage {
                step: Step::RevokeRepositories,
                ..
            }
        ));
        assert_eq!(store.users_of("a"), vec!["bob"]);
        assert_eq!(store.users_of("b"), vec!["alice", "bob"]);
        assert_eq!(store.users_of("c"), vec!["alice", "bob"]);
    }

    #[test]
    fn concurrent_change_after_guard_is_detected() {
        let store = MemoryRepositoryStore::with_repositories([repo("infra", &["alice", "bob"])]);
        let coordinator = AccessRevocation::new(&store);

        let alice_plan = coordinator.evaluate("alice").unwrap();
        let bob_plan = coordinator.evaluate("bob").unwrap();

        coordinator.apply(&bob_plan).unwrap();
        let err = coordinator.apply(&alice_plan).unwrap_err();

        assert!(matches!(
            err,
            WardenError::StaleRepository {
                expected: 0,
                found: 1,
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(store.users_of("infra"), vec!["alice"]);
    }

    #[test]
    fn repository_deleted_after_guard_is_a_storage_failure() {
        let store = MemoryRepositoryStore::with_repositories([
            repo("a", &["alice", "bob"]),
            repo("b", &["alice", "bob"]),
        ]);
        let coordinator = AccessRevocation::new(&store);

        let plan = coordinator.evaluate("alice").unwrap();
        store.delete("b");
        let err = coordinator.apply(&plan).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(matches!(
            err,
            WardenError::Storage {
                step: Step::RevokeRepositories,
                ..
            }
        ));
        assert!(err.to_string().contains("'b' no longer exists"));
        assert_eq!(store.users_of("a"), vec!["bob"]);
    }

    #[test]
    fn removing_users_one_by_one_never_empties_a_repository() {
        let users = ["u1", "u2", "u3", "u4"];
        let store = MemoryRepositoryStore::with_repositories([
            repo("r1", &["u1", "u2"]),
            repo("r2", &["u2", "u3", "u4"]),
            repo("r3", &["u1", "u4"]),
            repo("r4", &["u3"]),
        ]);
        let coordinator = AccessRevocation::new(&store);

        for _round in 0..users.len() {
            for user in users {
                let _ = coordinator.evaluate_and_revoke(user);
                for r in store.all() {
                    assert!(!r.users.is_empty(), "{} lost every user", r.name);
                }
            }
        }

        let survivors: BTreeSet<String> = store.all().into_iter().flat_map(|r| r.users).collect();
        assert!(!survivors.is_empty());
    }
}
