use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::adapters::authorized_keys::file_backend::FileBackend;
use crate::adapters::stores::json_identity_store::JsonIdentityStore;
use crate::adapters::stores::json_repository_store::JsonRepositoryStore;
use crate::config::app_config::AppConfig;
use crate::core::errors::{Result, WardenError};
use crate::core::services::key_gateway::KeyGateway;
use crate::core::services::user_service::UserService;

static STATE_DIR: OnceLock<PathBuf> = OnceLock::new();
static AUTHORIZED_KEYS: OnceLock<Option<PathBuf>> = OnceLock::new();

/// The service as wired for the command line.
pub type CliUserService = UserService<JsonIdentityStore, JsonRepositoryStore, KeyGateway<FileBackend>>;

/// Record the global `--dir` and `--authorized-keys` settings.
pub fn init(dir: Option<&str>, authorized_keys: Option<&Path>) {
    let dir = dir
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".keywarden"));
    let _ = STATE_DIR.set(dir);
    let _ = AUTHORIZED_KEYS.set(authorized_keys.map(Path::to_path_buf));
}

/// Get the current state directory path.
pub fn state_dir() -> &'static Path {
    STATE_DIR
        .get()
        .map(|p| p.as_path())
        .unwrap_or(Path::new(".keywarden"))
}

fn authorized_keys_override() -> Option<&'static Path> {
    AUTHORIZED_KEYS.get().and_then(|p| p.as_deref())
}

/// Loaded configuration plus the directory it came from.
pub struct Context {
    pub state_dir: PathBuf,
    pub config: AppConfig,
}

impl Context {
    /// Load `config.toml` from the state directory.
    pub fn load() -> Result<Self> {
        let dir = state_dir();
        if !dir.exists() {
            return Err(WardenError::InvalidConfig {
                detail: format!(
                    "keywarden not initialized in {}. Run 'keywarden init' first.",
                    dir.display()
                ),
            });
        }
        Ok(Self {
            state_dir: dir.to_path_buf(),
            config: AppConfig::load(dir)?,
        })
    }

    pub fn identity_store(&self) -> JsonIdentityStore {
        JsonIdentityStore::new(self.state_dir.join(&self.config.storage.users_file))
    }

    pub fn repository_store(&self) -> JsonRepositoryStore {
        JsonRepositoryStore::new(self.state_dir.join(&self.config.storage.repositories_file))
    }

    pub fn key_backend(&self) -> Result<FileBackend> {
        match self.config.authorized_keys_path(authorized_keys_override()) {
            Some(path) => Ok(FileBackend::new(path)),
            None => FileBackend::default_location(),
        }
    }

    /// Wire the file-backed stores and the authorized_keys gateway.
    pub fn user_service(&self) -> Result<CliUserService> {
        let gateway = KeyGateway::new(self.key_backend()?, &self.config.keywarden.bin_path);
        Ok(UserService {
            users: self.identity_store(),
            repositories: self.repository_store(),
            keys: gateway,
        })
    }
}
