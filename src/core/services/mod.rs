pub mod access_revocation;
pub mod key_gateway;
pub mod user_service;
