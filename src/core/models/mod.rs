pub mod audit_entry;
pub mod identity;
pub mod repository;
