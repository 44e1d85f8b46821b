use chrono::{DateTime, Utc};

use crate::core::errors::Result;
use crate::core::models::audit_entry::AuditEntry;

/// Criteria for `AuditLogger::query`. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Case-insensitive substring of the author name or email.
    pub author: Option<String>,
    /// Exact user or repository name among the entry's subjects.
    pub subject: Option<String>,
    pub since: Option<DateTime<Utc>>,
}

impl AuditFilter {
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(author) = &self.author {
            let needle = author.to_lowercase();
            let by_name = entry.author.to_lowercase().contains(&needle);
            let by_email = entry
                .email
                .as_ref()
                .is_some_and(|e| e.to_lowercase().contains(&needle));
            if !by_name && !by_email {
                return false;
            }
        }
        if let Some(subject) = &self.subject
            && !entry.subjects.iter().any(|s| s == subject)
        {
            return false;
        }
        self.since.is_none_or(|since| entry.timestamp >= since)
    }
}

/// Port for recording and querying audit events.
pub trait AuditLogger: Send + Sync {
    /// Append an entry to the audit log.
    fn log_event(&self, entry: &AuditEntry) -> Result<()>;

    /// Entries matching `filter`, oldest first.
    fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>>;
}
