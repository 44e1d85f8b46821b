use std::fmt;

/// Ordered steps of the identity operations.
///
/// Removal runs `Lookup → Guard → RevokeRepositories → DeleteRecord → RevokeKeys`.
/// None of the steps is compensated: once a step commits, later failures
/// leave it in place and the error names the step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Validate,
    Lookup,
    Insert,
    Update,
    Guard,
    RevokeRepositories,
    DeleteRecord,
    PropagateKeys,
    RevokeKeys,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::Validate => "validate input",
            Step::Lookup => "look up record",
            Step::Insert => "insert record",
            Step::Update => "update record",
            Step::Guard => "check repository access",
            Step::RevokeRepositories => "revoke repository access",
            Step::DeleteRecord => "delete record",
            Step::PropagateKeys => "propagate keys",
            Step::RevokeKeys => "revoke keys",
        };
        f.write_str(s)
    }
}

/// Coarse classification used by callers that only care about the
/// failure category, not the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Storage,
    Gateway,
    Config,
    Io,
}

/// All domain errors for keywarden.
///
/// Each variant provides enough context (step, entity, cause) to log
/// and act on the failure.
#[derive(Debug, thiserror::Error)]
pub enum WardenError {
    #[error(
        "Invalid user name '{name}'\n\n  \
         Names must be non-empty and may only contain ASCII letters,\n  \
         digits, '.' and '@'."
    )]
    InvalidName { name: String },

    #[error("Invalid key for '{name}': {reason}")]
    InvalidKey { name: String, reason: String },

    #[error("User '{name}' not found ({step})")]
    UserNotFound { step: Step, name: String },

    #[error("Repository '{name}' not found")]
    RepositoryNotFound { name: String },

    #[error(
        "Could not remove user '{name}': it is the only user with access to: {}\n\n  \
         Grant another user access or delete the repository first.",
        .repositories.join(", ")
    )]
    SoleOwner {
        name: String,
        repositories: Vec<String>,
    },

    #[error("Could not {step} for '{entity}': {reason}")]
    Storage {
        step: Step,
        entity: String,
        reason: String,
    },

    #[error(
        "Repository '{repository}' changed while revoking access for '{name}' \
         (expected revision {expected}, found {found})\n\n  \
         Repositories updated before this point keep their new access list.\n  \
         Re-run the removal to continue."
    )]
    StaleRepository {
        name: String,
        repository: String,
        expected: u64,
        found: u64,
    },

    #[error(
        "Could not {step} for '{name}': {reason}\n\n  \
         Store changes are kept; the authorized keys file needs to be reconciled."
    )]
    Gateway {
        step: Step,
        name: String,
        reason: String,
    },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error(
        "This project uses format version {project_version}, but this keywarden \
         only supports up to version {supported_version}."
    )]
    FormatVersionTooNew {
        project_version: u32,
        supported_version: u32,
    },

    #[error("Audit log error: {detail}")]
    AuditError { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WardenError {
    /// Failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WardenError::InvalidName { .. } | WardenError::InvalidKey { .. } => {
                ErrorKind::Validation
            }
            WardenError::UserNotFound { .. } | WardenError::RepositoryNotFound { .. } => {
                ErrorKind::NotFound
            }
            WardenError::SoleOwner { .. } => ErrorKind::Conflict,
            WardenError::Storage { .. } | WardenError::StaleRepository { .. } => {
                ErrorKind::Storage
            }
            WardenError::Gateway { .. } => ErrorKind::Gateway,
            WardenError::InvalidConfig { .. } | WardenError::FormatVersionTooNew { .. } => {
                ErrorKind::Config
            }
            WardenError::AuditError { .. }
            | WardenError::Io(_) => ErrorKind::Io,
        }
    }

    /// Step a storage, gateway or lookup failure surfaced in, if it carries one.
    pub fn step(&self) -> Option<Step> {
        match self {
            WardenError::UserNotFound { step, .. }
            | WardenError::Storage { step, .. }
            | WardenError::Gateway { step, .. } => Some(*step),
            WardenError::StaleRepository { .. } => Some(Step::RevokeRepositories),
            _ => None,
        }
    }

    /// Re-tag a storage or gateway error with the step it surfaced in.
    pub fn at(self, step: Step) -> Self {
        match self {
            WardenError::Storage { entity, reason, .. } => WardenError::Storage {
                step,
                entity,
                reason,
            },
            WardenError::Gateway { name, reason, .. } => WardenError::Gateway {
                step,
                name,
                reason,
            },
            WardenError::UserNotFound { name, .. } => WardenError::UserNotFound { step, name },
            other => other,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WardenError>;
