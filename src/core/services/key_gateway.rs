use std::sync::Mutex;

use crate::core::errors::{Result, Step, WardenError};
use crate::core::models::identity::validate_key;
use crate::core::traits::key_authorizer::{AuthorizedKeysBackend, KeyAuthorizer};

/// Options prepended to every managed key. Only the forced command is
/// reachable through a managed key.
const KEY_OPTIONS: &str = "no-port-forwarding,no-X11-forwarding,no-agent-forwarding,no-pty";

/// Key gateway that renders keys as authorized_keys lines.
///
/// Each key becomes one line that forces `<bin_path> <name>` as the
/// session command, so the transport hands the identity name to the
/// gatekeeper binary:
///
/// ```text
/// no-port-forwarding,no-X11-forwarding,no-agent-forwarding,no-pty,command="/usr/local/bin/keywarden-serve alice" ssh-ed25519 AAAA...
/// ```
///
/// Lines the gateway did not write are left alone.
pub struct KeyGateway<B: AuthorizedKeysBackend> {
    backend: B,
    bin_path: String,
    // Serializes read-modify-write cycles on the backend.
    lock: Mutex<()>,
}

impl<B: AuthorizedKeysBackend> KeyGateway<B> {
    pub fn new(backend: B, bin_path: &str) -> Self {
        Self {
            backend,
            bin_path: bin_path.to_string(),
            lock: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Render the authorized_keys line for `key` owned by `name`.
    pub fn format_line(&self, key: &str, name: &str) -> String {
        format!(
            "{KEY_OPTIONS},command=\"{} {name}\" {}",
            self.bin_path,
            key.trim()
        )
    }

    fn render(&self, keys: &[String], name: &str, step: Step) -> Result<Vec<String>> {
        keys.iter()
            .map(|key| {
                validate_key(name, key).map_err(|e| WardenError::Gateway {
                    step,
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;
                Ok(self.format_line(key, name))
            })
            .collect()
    }

    fn append(&self, keys: &[String], name: &str) -> Result<()> {
        let step = Step::PropagateKeys;
        let lines = self.render(keys, name, step)?;
        if lines.is_empty() {
            return Ok(());
        }

        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut content = self.backend.read().map_err(|e| self.failure(step, name, e))?;
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        for line in lines {
            content.push_str(&line);
            content.push('\n');
        }
        self.backend
            .write(&content)
            .map_err(|e| self.failure(step, name, e))
    }

    /// Keys that cannot be rendered were never written, so they are
    /// skipped and the rest are still removed.
    fn strip(&self, keys: &[String], name: &str) -> Result<()> {
        let step = Step::RevokeKeys;
        let lines: Vec<String> = keys
            .iter()
            .filter(|key| validate_key(name, key).is_ok())
            .map(|key| self.format_line(key, name))
            .collect();
        if lines.is_empty() {
            return Ok(());
        }

        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let content = self.backend.read().map_err(|e| self.failure(step, name, e))?;
        let kept: Vec<&str> = content
            .lines()
            .filter(|line| !lines.iter().any(|l| l == line.trim_end()))
            .collect();

        let mut updated = kept.join("\n");
        if !updated.is_empty() {
            updated.push('\n');
        }
        if updated == content {
            return Ok(());
        }
        self.backend
            .write(&updated)
            .map_err(|e| self.failure(step, name, e))
    }

    fn failure(&self, step: Step, name: &str, cause: WardenError) -> WardenError {
        WardenError::Gateway {
            step,
            name: name.to_string(),
            reason: format!("{}: {cause}", self.backend.location()),
        }
    }
}

impl<B: AuthorizedKeysBackend> KeyAuthorizer for KeyGateway<B> {
    fn add(&self, key: &str, name: &str) -> Result<()> {
        self.append(&[key.to_string()], name)
    }

    /// Remove every line granting `key` to `name`. A key that is not
    /// present is not an error.
    fn remove(&self, key: &str, name: &str) -> Result<()> {
        self.strip(&[key.to_string()], name)
    }

    fn bulk_add(&self, keys: &[String], name: &str) -> Result<()> {
        self.append(keys, name)
    }

    fn bulk_remove(&self, keys: &[String], name: &str) -> Result<()> {
        self.strip(keys, name)
    }
}
