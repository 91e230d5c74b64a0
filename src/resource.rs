//! The capability every cached value must provide.
//!
//! The cache never inspects the payload itself; it consumes exactly two
//! facts about it: how many bytes it occupies, and how to surrender the
//! external resource it owns.  Both are expressed through the [`Resource`]
//! trait, bound on the value type at construction time.
//!
//! # Example
//! ```
//! use larder::Resource;
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! /// A payload backed by an open file handle.
//! struct MappedFile {
//!   len: u64,
//!   closed: AtomicBool,
//! }
//!
//! impl Resource for MappedFile {
//!   fn size(&self) -> u64 {
//!     self.len
//!   }
//!
//!   fn release(&self) {
//!     self.closed.store(true, Ordering::Release);
//!   }
//! }
//! ```

/// A value that owns a heavyweight external resource.
///
/// Implementations must be `Send + Sync` so payloads can be shared across
/// the threads that call into the cache.
pub trait Resource: Send + Sync {
  /// The size of the resource in bytes.
  ///
  /// Sampled exactly once, when the value is handed to the cache; the cache
  /// treats entries as immutable in size for their lifetime and never
  /// re-reads this.
  fn size(&self) -> u64;

  /// Surrenders the external resource (closes the handle, unmaps the
  /// buffer, frees the connection).
  ///
  /// The cache calls this exactly once per stored value, on whichever path
  /// removes it: explicit removal, capacity eviction, expiry, `clear`,
  /// `dispose`, or replacement.  Callers must not release a value they have
  /// handed to the cache.
  fn release(&self);
}

/// Plain byte buffers carry no external resource; releasing them is a
/// no-op and their size is their length.
impl Resource for Vec<u8> {
  #[inline]
  fn size(&self) -> u64 {
    self.len() as u64
  }

  fn release(&self) {}
}

impl Resource for String {
  #[inline]
  fn size(&self) -> u64 {
    self.len() as u64
  }

  fn release(&self) {}
}
