pub mod file_store;
pub mod key;
pub mod store;
pub mod types;
mod core;

// Re-export cache types
pub use types::*;
// Re-export stores
pub use file_store::FileStore;
pub use store::{CacheStore, MemoryStore};
// Re-export key construction
pub use key::{CacheKey, build_key};
// Re-export the manager
pub use core::CacheManager;
