//! A concurrent, size-bounded LRU cache for values that own heavyweight
//! external resources.
//!
//! `larder` is built for long-lived services that hand large binary
//! payloads (open file handles, memory-mapped buffers, network-sourced
//! byte streams) to many concurrent callers and want to trade a bounded
//! number of resident bytes for not re-materializing them. Entries are
//! ordered by recency of access; admission is driven by a cumulative byte
//! budget, with victims taken from the least-recently-used end. A
//! background scavenger expires aged entries on a configurable period, and
//! every payload's release hook runs exactly once, on whichever path
//! removes it (removal, eviction, expiry, clear, dispose, or replacement).
//!
//! Payloads describe themselves through the [`Resource`] trait: a byte
//! size, sampled once at insertion, and a `release` hook. An optional
//! [`EvictionListener`] observes removals on a dedicated worker.
//!
//! # Example
//! ```
//! use larder::CacheBuilder;
//! use std::time::Duration;
//!
//! let cache: larder::Cache<String, Vec<u8>> = CacheBuilder::new()
//!   .capacity(10 * 1024 * 1024)
//!   .element_lifetime(Duration::from_secs(3600))
//!   .build()
//!   .unwrap();
//!
//! cache.insert("avatar-7".to_string(), vec![0u8; 1024]).unwrap();
//! let hit = cache.get(&"avatar-7".to_string()).unwrap();
//! assert_eq!(hit.map(|v| v.len()), Some(1024));
//! cache.dispose();
//! ```

pub mod builder;
pub mod error;
pub mod iter;
pub mod listener;
pub mod metrics;
pub mod resource;

mod cache;
mod entry;
mod list;
mod shared;
mod task;

pub use builder::CacheBuilder;
pub use cache::Cache;
pub use error::{BuildError, CacheError};
pub use iter::Iter;
pub use listener::{EvictionListener, EvictionReason};
pub use metrics::MetricsSnapshot;
pub use resource::Resource;
