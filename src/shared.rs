use crate::entry::CacheEntry;
use crate::list::LruList;
use crate::listener::EvictionReason;
use crate::metrics::Metrics;
use crate::resource::Resource;
use crate::task::notifier::{Notification, Notifier};
use crate::task::scavenger::Scavenger;

use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Sender;
use parking_lot::{Mutex, RwLock};

/// Configuration consumed by both the facade and the scavenger. All timer
/// durations are pre-clamped by the builder.
#[derive(Debug, Clone)]
pub(crate) struct CacheConfig {
  pub(crate) capacity: u64,
  pub(crate) cleanup_threshold: f64,
  pub(crate) scavenge_time_bound: Duration,
  pub(crate) element_lifetime: Duration,
  pub(crate) expire_elements: bool,
}

/// The state guarded by the cache's single reader-writer lock: the recency
/// list (which embeds the key index and the cumulative size) plus the
/// disposal flag.
pub(crate) struct Core<K, V, H> {
  pub(crate) list: LruList<K, V, H>,
  pub(crate) disposed: bool,
}

/// The internal, thread-safe core of the cache.
///
/// Every scavenge pass, inline or timer-driven, holds the write lock on
/// `core` for its whole walk; that lock is what serializes passes and
/// gives the at-most-one-scavenge guarantee.
pub(crate) struct CacheShared<K: Send, V: Resource, H> {
  pub(crate) core: Arc<RwLock<Core<K, V, H>>>,
  pub(crate) metrics: Arc<Metrics>,
  pub(crate) config: CacheConfig,
  pub(crate) scavenger: Mutex<Option<Scavenger>>,
  pub(crate) notifier: Mutex<Option<Notifier>>,
  pub(crate) notification_sender: Mutex<Option<Sender<Notification<K, V>>>>,
}

impl<K: Send, V: Resource, H> fmt::Debug for CacheShared<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheShared")
      .field("capacity", &self.config.capacity)
      .field("element_lifetime", &self.config.element_lifetime)
      .field("expire_elements", &self.config.expire_elements)
      .finish_non_exhaustive()
  }
}

impl<K: Send, V: Resource, H> CacheShared<K, V, H> {
  /// Releases each removed payload and hands the pair to the notifier.
  /// Runs after the state lock is dropped; structural removal under the
  /// lock has already made each entry unreachable, which is what makes the
  /// release exactly-once.
  pub(crate) fn finish_removals(&self, removed: Vec<(K, CacheEntry<V>)>, reason: EvictionReason) {
    if removed.is_empty() {
      return;
    }
    let sender = self.notification_sender.lock().clone();
    release_and_notify(sender.as_ref(), removed, reason);
  }

  /// Stops the workers, releases everything still resident, and marks the
  /// cache disposed. Idempotent.
  pub(crate) fn shut_down(&self) {
    // Join the scavenger before touching state so a final pass cannot
    // interleave with the drain below.
    let scavenger = self.scavenger.lock().take();
    if let Some(scavenger) = scavenger {
      scavenger.stop();
    }

    let drained = {
      let mut core = self.core.write();
      if core.disposed {
        Vec::new()
      } else {
        core.disposed = true;
        core.list.drain()
      }
    };
    self
      .metrics
      .removals
      .fetch_add(drained.len() as u64, Ordering::Relaxed);
    self.finish_removals(drained, EvictionReason::Removed);

    // Drop our half of the channel, then wait for the notifier to deliver
    // whatever is still queued.
    *self.notification_sender.lock() = None;
    let notifier = self.notifier.lock().take();
    if let Some(notifier) = notifier {
      notifier.stop();
    }
  }
}

impl<K: Send, V: Resource, H> Drop for CacheShared<K, V, H> {
  fn drop(&mut self) {
    self.shut_down();
  }
}

/// Invokes the release hook on each removed payload, exactly once per
/// entry, and forwards the pair to the notifier channel when a listener is
/// registered. A full channel drops the notification rather than stalling
/// the caller.
pub(crate) fn release_and_notify<K, V: Resource>(
  sender: Option<&Sender<Notification<K, V>>>,
  removed: Vec<(K, CacheEntry<V>)>,
  reason: EvictionReason,
) {
  for (key, entry) in removed {
    entry.value.release();
    if let Some(tx) = sender {
      let _ = tx.try_send((key, entry.value(), reason));
    }
  }
}
