use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::errors::{Result, WardenError};

/// Anything that is not an ASCII letter, digit, `.` or `@`.
static INVALID_NAME_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9.@]").expect("static pattern compiles"));

/// A named principal and the public keys it authenticates with.
///
/// `keys` keeps insertion order and is never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    #[serde(default)]
    pub keys: Vec<String>,
}

impl Identity {
    /// Build an identity after checking the name grammar and every key.
    pub fn new(name: &str, keys: Vec<String>) -> Result<Self> {
        validate_name(name)?;
        for key in &keys {
            validate_key(name, key)?;
        }
        Ok(Self {
            name: name.to_string(),
            keys,
        })
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} keys)", self.name, self.keys.len())
    }
}

/// Check that `name` is non-empty and uses only ASCII letters, digits,
/// `.` and `@`. Whitespace is rejected by the same rule.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || INVALID_NAME_CHAR.is_match(name) {
        return Err(WardenError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Check that `key` can be written as one authorized_keys line:
/// something other than whitespace, and no line breaks.
pub fn validate_key(name: &str, key: &str) -> Result<()> {
    let reason = if key.trim().is_empty() {
        "key is empty"
    } else if key.trim().contains(['\n', '\r']) {
        "key must fit on a single line"
    } else {
        return Ok(());
    };
    Err(WardenError::InvalidKey {
        name: name.to_string(),
        reason: reason.into(),
    })
}

/// Short, stable fingerprint of an opaque key for display.
pub fn key_fingerprint(key: &str) -> String {
    let digest = Sha256::digest(key.trim().as_bytes());
    let hex: String = digest.iter().take(8).map(|b| format!("{b:02x}")).collect();
    format!("sha256:{hex}")
}
