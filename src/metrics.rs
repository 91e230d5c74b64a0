use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_utils::CachePadded;

/// A thread-safe, internal metrics collector for the cache.
/// All fields are atomic to allow for lock-free updates.
#[derive(Debug)]
pub(crate) struct Metrics {
  pub(crate) hits: CachePadded<AtomicU64>,
  pub(crate) misses: CachePadded<AtomicU64>,
  pub(crate) inserts: CachePadded<AtomicU64>,
  pub(crate) replacements: CachePadded<AtomicU64>,
  pub(crate) removals: CachePadded<AtomicU64>,
  pub(crate) evicted_by_capacity: CachePadded<AtomicU64>,
  pub(crate) evicted_by_expiry: CachePadded<AtomicU64>,
  pub(crate) scavenge_passes: CachePadded<AtomicU64>,
  created_at: Instant,
}

impl Default for Metrics {
  fn default() -> Self {
    Self {
      hits: CachePadded::new(AtomicU64::new(0)),
      misses: CachePadded::new(AtomicU64::new(0)),
      inserts: CachePadded::new(AtomicU64::new(0)),
      replacements: CachePadded::new(AtomicU64::new(0)),
      removals: CachePadded::new(AtomicU64::new(0)),
      evicted_by_capacity: CachePadded::new(AtomicU64::new(0)),
      evicted_by_expiry: CachePadded::new(AtomicU64::new(0)),
      scavenge_passes: CachePadded::new(AtomicU64::new(0)),
      created_at: Instant::now(),
    }
  }
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// Creates a point-in-time snapshot. Count and cumulative size live under
  /// the cache lock, so the facade passes them in.
  pub(crate) fn snapshot(&self, count: usize, current_size: u64) -> MetricsSnapshot {
    let hits = self.hits.load(Ordering::Relaxed);
    let misses = self.misses.load(Ordering::Relaxed);
    let total_lookups = hits + misses;

    MetricsSnapshot {
      hits,
      misses,
      hit_ratio: if total_lookups == 0 {
        0.0
      } else {
        hits as f64 / total_lookups as f64
      },
      inserts: self.inserts.load(Ordering::Relaxed),
      replacements: self.replacements.load(Ordering::Relaxed),
      removals: self.removals.load(Ordering::Relaxed),
      evicted_by_capacity: self.evicted_by_capacity.load(Ordering::Relaxed),
      evicted_by_expiry: self.evicted_by_expiry.load(Ordering::Relaxed),
      scavenge_passes: self.scavenge_passes.load(Ordering::Relaxed),
      count,
      current_size,
      uptime_secs: self.created_at.elapsed().as_secs(),
    }
  }
}

/// A point-in-time, public-facing snapshot of the cache's metrics.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
  /// The number of successful lookups.
  pub hits: u64,
  /// The number of failed lookups.
  pub misses: u64,
  /// The cache hit ratio (hits / (hits + misses)).
  pub hit_ratio: f64,
  /// The total number of entries inserted into the cache.
  pub inserts: u64,
  /// The total number of values swapped in via `replace`.
  pub replacements: u64,
  /// The total number of explicit removals (including `clear`).
  pub removals: u64,
  /// The number of entries evicted to keep the byte budget.
  pub evicted_by_capacity: u64,
  /// The number of entries removed because their lifetime ran out.
  pub evicted_by_expiry: u64,
  /// The number of completed timer-driven scavenge passes.
  pub scavenge_passes: u64,
  /// The number of live entries at snapshot time.
  pub count: usize,
  /// The cumulative byte size of all live entries at snapshot time.
  pub current_size: u64,
  /// The number of seconds the cache has been running.
  pub uptime_secs: u64,
}
