use crate::cli::RepoAction;
use crate::cli::commands::audit_helpers::log_audit;
use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::{Result, Step, WardenError};
use crate::core::models::audit_entry::AuditAction;
use crate::core::models::repository::RepositoryAccess;
use crate::core::traits::identity_store::IdentityStore;
use crate::core::traits::repository_store::RepositoryStore;

/// Execute the `keywarden repo` command.
///
/// Repositories are owned elsewhere; these commands only register the
/// access list and show it.
pub fn execute(action: &RepoAction) -> Result<()> {
    let ctx = Context::load()?;
    match action {
        RepoAction::Create { name, users } => execute_create(&ctx, name, users),
        RepoAction::List => execute_list(&ctx),
    }
}

/// Register a repository. Every listed user must already exist, and at
/// least one is required.
fn execute_create(ctx: &Context, name: &str, users: &[String]) -> Result<()> {
    if name.trim().is_empty() {
        return Err(WardenError::InvalidConfig {
            detail: "Repository name must not be empty".into(),
        });
    }

    let identities = ctx.identity_store();
    for user in users {
        identities.find_by_name(user).map_err(|e| e.at(Step::Validate))?;
    }

    let repo = RepositoryAccess::new(name, users.iter().cloned());
    if repo.users.is_empty() {
        return Err(WardenError::InvalidConfig {
            detail: "A repository needs at least one user".into(),
        });
    }

    ctx.repository_store().insert(&repo)?;
    output::success(&format!(
        "Registered repository {name} for {}",
        repo.users.iter().cloned().collect::<Vec<_>>().join(", ")
    ));

    let mut subjects = vec![name.to_string()];
    subjects.extend(repo.users.iter().cloned());
    log_audit(ctx, AuditAction::RepoCreate, subjects, None);
    Ok(())
}

fn execute_list(ctx: &Context) -> Result<()> {
    let repos = ctx.repository_store().list()?;

    if repos.is_empty() {
        output::warning("No repositories.");
        return Ok(());
    }

    output::header(&format!("Repositories ({})", repos.len()));
    for repo in &repos {
        let users: Vec<_> = repo.users.iter().cloned().collect();
        output::row(&repo.name, &users.join(", "));
    }
    Ok(())
}
