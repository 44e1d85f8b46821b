pub mod audit;
pub mod authorized_keys;
#[cfg(test)]
pub mod memory;
pub mod stores;
