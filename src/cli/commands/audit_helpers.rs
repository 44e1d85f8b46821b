use std::process::Command;

use chrono::Utc;

use crate::adapters::audit::json_audit_logger::JsonAuditLogger;
use crate::cli::context::Context;
use crate::cli::output;
use crate::core::models::audit_entry::{AuditAction, AuditEntry};
use crate::core::traits::audit::AuditLogger;

fn git_config(key: &str) -> Option<String> {
    let out = Command::new("git").args(["config", key]).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let val = String::from_utf8_lossy(&out.stdout).trim().to_string();
    if val.is_empty() { None } else { Some(val) }
}

/// Author for audit entries: git user name and email, falling back to
/// `$USER` and then `unknown`.
pub fn author() -> (String, Option<String>) {
    let name = git_config("user.name")
        .or_else(|| std::env::var("USER").ok().filter(|u| !u.is_empty()))
        .unwrap_or_else(|| "unknown".to_string());
    (name, git_config("user.email"))
}

/// Record an audit event. Warns on failure instead of propagating
/// the error, since audit should not block the main operation.
pub fn log_audit(ctx: &Context, action: AuditAction, subjects: Vec<String>, detail: Option<String>) {
    let audit = ctx.config.audit.as_ref();
    if !JsonAuditLogger::is_enabled(audit) {
        return;
    }

    let (author, email) = author();
    let entry = AuditEntry {
        timestamp: Utc::now(),
        author,
        email,
        action,
        subjects,
        detail,
    };

    let logger = JsonAuditLogger::from_config(&ctx.state_dir, audit);
    if let Err(e) = logger.log_event(&entry) {
        output::warning(&format!("Could not write audit log: {e}"));
    }
}
