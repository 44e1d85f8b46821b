pub mod audit_helpers;
pub mod init;
pub mod log;
pub mod repo;
pub mod user;
