//! Typed key-value cache for the bespoke configurator.
//!
//! Provides a small, ergonomic API over the host's durable local key-value
//! facility with automatic JSON serialization. On `wasm32` the Spin
//! Key-Value Store backs it; elsewhere an in-memory store does.
//!
//! # Example
//!
//! ```rust
//! use bespoke_cache::{cache_key, Cache};
//!
//! let cache = Cache::in_memory();
//! let key = cache_key!("designs", "device-1");
//! cache.set(&key, &vec![1, 2, 3]).unwrap();
//! let stored: Option<Vec<i32>> = cache.get(&key).unwrap();
//! assert_eq!(stored, Some(vec![1, 2, 3]));
//! ```

mod error;
mod kv;

pub use error::CacheError;
pub use kv::{Cache, KeyValueStore, MemoryStore};

#[cfg(target_arch = "wasm32")]
pub use kv::SpinStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, KeyValueStore, MemoryStore};
}
