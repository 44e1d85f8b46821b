use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::config::app_config::AuditSection;
use crate::core::errors::{Result, WardenError};
use crate::core::models::audit_entry::AuditEntry;
use crate::core::traits::audit::{AuditFilter, AuditLogger};

/// Audit trail of identity operations, one JSON object per line.
pub struct JsonAuditLogger {
    log_path: PathBuf,
}

impl JsonAuditLogger {
    /// Create a logger that writes to `{state_dir}/{log_file}`.
    pub fn new(state_dir: &Path, log_file: &str) -> Self {
        Self {
            log_path: state_dir.join(log_file),
        }
    }

    /// Logger for the `[audit]` section, `audit.log` when it is absent.
    pub fn from_config(state_dir: &Path, audit: Option<&AuditSection>) -> Self {
        let log_file = audit.map(|a| a.log_file.as_str()).unwrap_or("audit.log");
        Self::new(state_dir, log_file)
    }

    /// Auditing is on unless the config turns it off.
    pub fn is_enabled(audit: Option<&AuditSection>) -> bool {
        audit.is_none_or(|a| a.enabled)
    }

    fn audit_error(detail: String) -> WardenError {
        WardenError::AuditError { detail }
    }
}

impl AuditLogger for JsonAuditLogger {
    fn log_event(&self, entry: &AuditEntry) -> Result<()> {
        let line = serde_json::to_string(entry)
            .map_err(|e| Self::audit_error(format!("cannot serialize entry: {e}")))?;

        if let Some(parent) = self.log_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| {
                Self::audit_error(format!("cannot open {}: {e}", self.log_path.display()))
            })?;

        writeln!(file, "{line}").map_err(|e| Self::audit_error(format!("cannot write entry: {e}")))
    }

    fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.log_path)
            .map_err(|e| Self::audit_error(format!("cannot read {}: {e}", self.log_path.display())))?;

        let mut entries = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| Self::audit_error(format!("line {}: {e}", idx + 1)))?;
            if line.trim().is_empty() {
                continue;
            }

            let entry: AuditEntry = serde_json::from_str(line.trim())
                .map_err(|e| Self::audit_error(format!("malformed entry at line {}: {e}", idx + 1)))?;

            if filter.matches(&entry) {
                entries.push(entry);
            }
        }

        Ok(entries)
    }
}
