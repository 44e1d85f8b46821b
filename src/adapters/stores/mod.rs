pub mod json_file;
pub mod json_identity_store;
pub mod json_repository_store;
