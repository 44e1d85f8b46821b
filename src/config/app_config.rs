use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::errors::{Result, WardenError};

/// Top-level keywarden configuration read from `.keywarden/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub keywarden: KeywardenSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub authorized_keys: AuthorizedKeysSection,
    pub audit: Option<AuditSection>,
}

impl AppConfig {
    /// Load the configuration from `{state_dir}/config.toml`.
    ///
    /// After parsing, validates the store and audit file names so a
    /// tampered config cannot point them outside the state directory.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let config_path = state_dir.join("config.toml");
        if !config_path.exists() {
            return Err(WardenError::InvalidConfig {
                detail: "config.toml not found. Run 'keywarden init' first.".into(),
            });
        }
        let content = std::fs::read_to_string(&config_path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| WardenError::InvalidConfig {
            detail: format!("Failed to parse config.toml: {e}"),
        })?;

        if config.keywarden.format_version > CURRENT_FORMAT_VERSION {
            return Err(WardenError::FormatVersionTooNew {
                project_version: config.keywarden.format_version,
                supported_version: CURRENT_FORMAT_VERSION,
            });
        }

        if config.keywarden.bin_path.trim().is_empty() {
            return Err(WardenError::InvalidConfig {
                detail: "[keywarden] bin_path must not be empty".into(),
            });
        }

        validate_simple_filename(&config.storage.users_file, "users file")?;
        validate_simple_filename(&config.storage.repositories_file, "repositories file")?;
        if let Some(audit) = &config.audit {
            validate_simple_filename(&audit.log_file, "audit log file")?;
        }

        Ok(config)
    }

    /// Resolve the authorized_keys location: an explicit override wins,
    /// then the configured path (with `~/` expanded), then
    /// `$HOME/.ssh/authorized_keys`. `None` means the default location.
    pub fn authorized_keys_path(&self, override_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = override_path {
            return Some(path.to_path_buf());
        }
        self.authorized_keys.path.as_deref().map(expand_home)
    }
}

/// Current format version supported by this build of keywarden.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// The `[keywarden]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywardenSection {
    /// Format version for backward compatibility. Defaults to 1 if missing.
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    /// Command forced on every managed key; receives the user name as
    /// its only argument.
    pub bin_path: String,
}

fn default_format_version() -> u32 {
    1
}

/// The `[storage]` section. File names are relative to the state directory.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    #[serde(default = "default_users_file")]
    pub users_file: String,
    #[serde(default = "default_repositories_file")]
    pub repositories_file: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            users_file: default_users_file(),
            repositories_file: default_repositories_file(),
        }
    }
}

fn default_users_file() -> String {
    "users.json".into()
}

fn default_repositories_file() -> String {
    "repositories.json".into()
}

/// The `[authorized_keys]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizedKeysSection {
    pub path: Option<String>,
}

/// The `[audit]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditSection {
    pub enabled: bool,
    pub log_file: String,
}

/// Reject anything that is not a bare file name.
pub fn validate_simple_filename(name: &str, what: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0');
    if invalid {
        return Err(WardenError::InvalidConfig {
            detail: format!("Invalid {what} '{name}': must be a plain file name"),
        });
    }
    Ok(())
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
