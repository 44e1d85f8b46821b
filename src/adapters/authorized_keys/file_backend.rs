use std::path::PathBuf;

use crate::core::errors::{Result, WardenError};
use crate::core::traits::key_authorizer::AuthorizedKeysBackend;

/// Authorized keys document stored on disk, normally
/// `$HOME/.ssh/authorized_keys`.
///
/// A missing file reads as empty; the file and its parent directory are
/// created on the first write.
#[derive(Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Backend for `$HOME/.ssh/authorized_keys`.
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| WardenError::InvalidConfig {
            detail: "Cannot determine home directory for authorized_keys. \
                     Set [authorized_keys] path in config.toml."
                .into(),
        })?;
        Ok(Self::new(home.join(".ssh").join("authorized_keys")))
    }
}

impl AuthorizedKeysBackend for FileBackend {
    fn read(&self) -> Result<String> {
        if !self.path.exists() {
            return Ok(String::new());
        }
        Ok(std::fs::read_to_string(&self.path)?)
    }

    fn write(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
