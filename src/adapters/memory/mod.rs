//! In-memory adapters used by the service tests.

pub mod identity_store;
pub mod key_authorizer;
pub mod repository_store;
