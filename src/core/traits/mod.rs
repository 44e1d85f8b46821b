pub mod audit;
pub mod identity_store;
pub mod key_authorizer;
pub mod repository_store;
