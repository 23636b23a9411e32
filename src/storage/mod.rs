pub mod cache;
pub mod keystore;

pub use cache::ExpiringCache;
pub use keystore::{FileStore, KeyStore, KeyValueStore, MemoryStore};
