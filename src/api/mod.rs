//! Transactions API backends

pub mod backend;
pub mod client;
pub mod errors;
pub mod memory;
#[cfg(test)]
pub mod testing;
pub mod types;

pub use backend::Backend;
pub use client::HttpBackend;
pub use errors::ApiError;
pub use memory::InMemoryBackend;
pub use types::*;
