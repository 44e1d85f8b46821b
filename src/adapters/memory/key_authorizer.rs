use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::errors::{Result, Step, WardenError};
use crate::core::traits::key_authorizer::KeyAuthorizer;

/// A call received by `RecordingAuthorizer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Add { key: String, name: String },
    Remove { key: String, name: String },
    BulkAdd { keys: Vec<String>, name: String },
    BulkRemove { keys: Vec<String>, name: String },
}

/// Key authorizer that records every call, optionally failing them.
#[derive(Default)]
pub struct RecordingAuthorizer {
    calls: Mutex<Vec<GatewayCall>>,
    fail: AtomicBool,
}

impl RecordingAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_calls(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: GatewayCall, step: Step, name: &str) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail.load(Ordering::SeqCst) {
            return Err(WardenError::Gateway {
                step,
                name: name.to_string(),
                reason: "authorized keys unavailable".into(),
            });
        }
        Ok(())
    }
}

impl KeyAuthorizer for RecordingAuthorizer {
    fn add(&self, key: &str, name: &str) -> Result<()> {
        let call = GatewayCall::Add {
            key: key.to_string(),
            name: name.to_string(),
        };
        self.record(call, Step::PropagateKeys, name)
    }

    fn remove(&self, key: &str, name: &str) -> Result<()> {
        let call = GatewayCall::Remove {
            key: key.to_string(),
            name: name.to_string(),
        };
        self.record(call, Step::RevokeKeys, name)
    }

    fn bulk_add(&self, keys: &[String], name: &str) -> Result<()> {
        let call = GatewayCall::BulkAdd {
            keys: keys.to_vec(),
            name: name.to_string(),
        };
        self.record(call, Step::PropagateKeys, name)
    }

    fn bulk_remove(&self, keys: &[String], name: &str) -> Result<()> {
        let call = GatewayCall::BulkRemove {
            keys: keys.to_vec(),
            name: name.to_string(),
        };
        self.record(call, Step::RevokeKeys, name)
    }
}
