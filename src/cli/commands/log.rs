use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use colored::Colorize;

use crate::adapters::audit::json_audit_logger::JsonAuditLogger;
use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::{Result, WardenError};
use crate::core::models::audit_entry::{AuditAction, AuditEntry};
use crate::core::traits::audit::{AuditFilter, AuditLogger};

/// Execute the `keywarden log` command.
pub fn execute(
    author: Option<&str>,
    subject: Option<&str>,
    since: Option<&str>,
    last: Option<usize>,
) -> Result<()> {
    let ctx = Context::load()?;
    let logger = JsonAuditLogger::from_config(&ctx.state_dir, ctx.config.audit.as_ref());

    let filter = AuditFilter {
        author: author.map(str::to_string),
        subject: subject.map(str::to_string),
        since: since.map(parse_since).transpose()?,
    };
    let entries = logger.query(&filter)?;

    output::header("keywarden log");
    if entries.is_empty() {
        output::warning("No audit entries found");
        if author.is_some() || subject.is_some() || since.is_some() {
            println!("  Try removing filters to see all entries.");
        }
        return Ok(());
    }

    let skip = last.map_or(0, |n| entries.len().saturating_sub(n));
    for entry in entries.iter().skip(skip) {
        print_entry(entry);
    }
    Ok(())
}

/// Parse `YYYY-MM-DD` as midnight UTC.
fn parse_since(s: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| WardenError::InvalidConfig {
        detail: format!("Invalid date '{s}'. Expected YYYY-MM-DD, e.g. 2026-01-15"),
    })?;
    Ok(date.and_time(NaiveTime::default()).and_utc())
}

fn print_entry(entry: &AuditEntry) {
    let subjects = if entry.subjects.is_empty() {
        "—".dimmed().to_string()
    } else {
        entry.subjects.join(", ")
    };
    println!(
        "  {} {} {:<12} {} {} {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
        "│".dimmed(),
        action_label(&entry.action),
        subjects,
        entry.detail.as_deref().unwrap_or("").dimmed(),
        format!("({})", entry.author).dimmed(),
    );
}

fn action_label(action: &AuditAction) -> String {
    match action {
        AuditAction::Init => "init".cyan().to_string(),
        AuditAction::UserCreate => "user create".green().to_string(),
        AuditAction::UserRemove => "user rm".red().to_string(),
        AuditAction::KeyAdd => "key add".green().to_string(),
        AuditAction::RepoCreate => "repo create".blue().to_string(),
    }
}
