#![allow(dead_code)]

use larder::{Cache, CacheBuilder, Resource};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Observable release bookkeeping for a [`TestResource`], shared with the
/// test so it survives the payload being handed to the cache.
pub struct ReleaseState {
  releases: AtomicUsize,
}

impl ReleaseState {
  pub fn count(&self) -> usize {
    self.releases.load(Ordering::SeqCst)
  }
}

/// The error a [`TestResource`] reports when used after release. This is
/// the payload's own failure, not the cache's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceReleased;

/// A stand-in for a heavyweight payload such as an open file handle: it
/// has a byte length, records every release, and refuses reads afterwards.
pub struct TestResource {
  bytes: usize,
  state: Arc<ReleaseState>,
}

impl TestResource {
  pub fn new(bytes: usize) -> Self {
    Self::with_state(bytes).0
  }

  pub fn with_state(bytes: usize) -> (Self, Arc<ReleaseState>) {
    let state = Arc::new(ReleaseState {
      releases: AtomicUsize::new(0),
    });
    (
      Self {
        bytes,
        state: Arc::clone(&state),
      },
      state,
    )
  }

  pub fn release_count(&self) -> usize {
    self.state.count()
  }

  /// Reads the payload, failing once the resource has been surrendered.
  pub fn read(&self) -> Result<usize, ResourceReleased> {
    if self.state.count() > 0 {
      Err(ResourceReleased)
    } else {
      Ok(self.bytes)
    }
  }
}

impl Resource for TestResource {
  fn size(&self) -> u64 {
    self.bytes as u64
  }

  fn release(&self) {
    self.state.releases.fetch_add(1, Ordering::SeqCst);
  }
}

/// A cache whose timer stays far out of the way, so tests drive eviction
/// deterministically through inserts.
pub fn quiet_cache(capacity: u64) -> Cache<u64, TestResource> {
  CacheBuilder::new()
    .capacity(capacity)
    .element_lifetime(Duration::from_secs(100))
    .scavenge_period(Duration::from_secs(100))
    .initial_scavenge_delay(Duration::from_secs(2000))
    .build()
    .unwrap()
}
