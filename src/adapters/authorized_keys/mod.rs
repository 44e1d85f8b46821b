pub mod file_backend;
#[cfg(test)]
pub mod memory_backend;
