use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::core::errors::Result;
use crate::core::traits::key_authorizer::AuthorizedKeysBackend;

/// In-memory authorized keys document for tests.
///
/// Counts writes and can be told to fail them.
#[derive(Default)]
pub struct MemoryBackend {
    content: RwLock<String>,
    writes: AtomicUsize,
    fail: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(content: &str) -> Self {
        Self {
            content: RwLock::new(content.to_string()),
            ..Self::default()
        }
    }

    pub fn content(&self) -> String {
        self.content.read().unwrap().clone()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl AuthorizedKeysBackend for MemoryBackend {
    fn read(&self) -> Result<String> {
        Ok(self.content())
    }

    fn write(&self, content: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("write rejected").into());
        }
        *self.content.write().unwrap() = content.to_string();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
