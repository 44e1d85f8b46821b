use crate::core::errors::Result;

/// Port for the mechanism that grants transport-level access to a key.
///
/// Every key is tagged with the identity it belongs to. Failures are
/// reported as `Gateway` errors; callers never roll back store changes
/// because of them.
pub trait KeyAuthorizer: Send + Sync {
    fn add(&self, key: &str, name: &str) -> Result<()>;

    fn remove(&self, key: &str, name: &str) -> Result<()>;

    /// Grant all `keys` in the given order.
    fn bulk_add(&self, keys: &[String], name: &str) -> Result<()>;

    fn bulk_remove(&self, keys: &[String], name: &str) -> Result<()>;
}

/// Storage capability behind the key gateway: the raw authorized keys
/// document.
///
/// Implementations live in `adapters::authorized_keys` (file or memory).
pub trait AuthorizedKeysBackend: Send + Sync {
    /// Current content. A document that does not exist yet reads as empty.
    fn read(&self) -> Result<String>;

    /// Replace the whole document.
    fn write(&self, content: &str) -> Result<()>;

    /// Human-readable location, used in error messages.
    fn location(&self) -> String;
}
