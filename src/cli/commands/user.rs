use colored::Colorize;

use crate::cli::UserAction;
use crate::cli::commands::audit_helpers::log_audit;
use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::{ErrorKind, Result, Step};
use crate::core::models::audit_entry::AuditAction;
use crate::core::models::identity::key_fingerprint;
use crate::core::traits::identity_store::IdentityStore;
use crate::core::traits::key_authorizer::AuthorizedKeysBackend;

/// Execute the `keywarden user` command.
pub fn execute(action: &UserAction) -> Result<()> {
    let ctx = Context::load()?;
    match action {
        UserAction::Create { name, keys } => execute_create(&ctx, name, keys),
        UserAction::Remove { name } => execute_remove(&ctx, name),
        UserAction::AddKey { name, key } => execute_add_key(&ctx, name, key),
        UserAction::List => execute_list(&ctx),
    }
}

/// Create a user and write its keys to authorized_keys.
fn execute_create(ctx: &Context, name: &str, keys: &[String]) -> Result<()> {
    let service = ctx.user_service()?;

    match service.create(name, keys) {
        Ok(identity) => {
            output::success(&format!("Created user {}", identity.name));
            output::success(&format!(
                "Authorized {} key(s) in {}",
                identity.keys.len(),
                service.keys.backend().location()
            ));
            log_audit(
                ctx,
                AuditAction::UserCreate,
                vec![identity.name.clone()],
                Some(format!("{} key(s)", identity.keys.len())),
            );
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::Gateway => {
            // The record is stored; only the authorized_keys mirror lags.
            log_audit(
                ctx,
                AuditAction::UserCreate,
                vec![name.to_string()],
                Some("keys not propagated".into()),
            );
            Err(e)
        }
        Err(e) => Err(e),
    }
}

/// Remove a user after stripping it from every repository it can access.
fn execute_remove(ctx: &Context, name: &str) -> Result<()> {
    let service = ctx.user_service()?;
    let removal = match service.remove(name) {
        Ok(removal) => removal,
        Err(e) => {
            // Failures after the guard leave committed changes behind.
            let detail = match (e.kind(), e.step()) {
                (ErrorKind::Gateway, _) => Some("record deleted, keys not revoked"),
                (ErrorKind::Storage, Some(Step::DeleteRecord)) => {
                    Some("repository access revoked, record not deleted")
                }
                (ErrorKind::Storage, Some(Step::RevokeRepositories)) => {
                    Some("repository access partially revoked")
                }
                _ => None,
            };
            if let Some(detail) = detail {
                log_audit(
                    ctx,
                    AuditAction::UserRemove,
                    vec![name.to_string()],
                    Some(detail.into()),
                );
            }
            return Err(e);
        }
    };

    output::success(&format!("Removed user {}", removal.identity.name));
    if removal.revoked_from.is_empty() {
        println!("  No repository access to revoke.");
    } else {
        output::success(&format!(
            "Revoked access to: {}",
            removal.revoked_from.join(", ")
        ));
    }
    output::success(&format!(
        "Revoked {} key(s) from authorized_keys",
        removal.identity.keys.len()
    ));

    let mut subjects = vec![removal.identity.name.clone()];
    subjects.extend(removal.revoked_from.iter().cloned());
    log_audit(
        ctx,
        AuditAction::UserRemove,
        subjects,
        Some(format!("{} key(s) revoked", removal.identity.keys.len())),
    );
    Ok(())
}

/// Append a key to a user and authorize it.
fn execute_add_key(ctx: &Context, name: &str, key: &str) -> Result<()> {
    let service = ctx.user_service()?;
    let fingerprint = key_fingerprint(key);

    match service.add_key(name, key) {
        Ok(identity) => {
            output::success(&format!("Added key {fingerprint} to {}", identity.name));
            log_audit(
                ctx,
                AuditAction::KeyAdd,
                vec![identity.name.clone()],
                Some(fingerprint),
            );
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::Gateway => {
            log_audit(
                ctx,
                AuditAction::KeyAdd,
                vec![name.to_string()],
                Some(format!("{fingerprint} not propagated")),
            );
            Err(e)
        }
        Err(e) => Err(e),
    }
}

fn execute_list(ctx: &Context) -> Result<()> {
    let users = ctx.identity_store().list()?;

    if users.is_empty() {
        output::warning("No users.");
        println!("  Run 'keywarden user create <name> --key <public-key>' to add one.");
        return Ok(());
    }

    output::header(&format!("Users ({})", users.len()));
    for user in &users {
        output::row(&user.name, &format!("{} key(s)", user.keys.len()));
        for key in &user.keys {
            output::sub(&key_fingerprint(key).dimmed().to_string());
        }
    }
    Ok(())
}
