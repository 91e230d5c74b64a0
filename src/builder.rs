use crate::cache::Cache;
use crate::error::BuildError;
use crate::list::LruList;
use crate::listener::EvictionListener;
use crate::metrics::Metrics;
use crate::resource::Resource;
use crate::shared::{CacheConfig, CacheShared, Core};
use crate::task::notifier::Notifier;
use crate::task::scavenger::{Scavenger, ScavengerContext};

use core::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

/// Timer durations are clamped to the 32-bit millisecond range; anything
/// longer (about 49.7 days) behaves as "never".
const MAX_TIMER: Duration = Duration::from_millis(u32::MAX as u64);

fn clamp_timer(duration: Duration) -> Duration {
  duration.min(MAX_TIMER)
}

/// A builder for creating [`Cache`] instances.
///
/// Defaults: unbounded capacity, a one-minute scavenge period, a 300 ms
/// scavenge time bound, a 20 s initial scavenge delay, a one-hour element
/// lifetime with expiry enabled, a cleanup threshold of 1.0, and room for
/// 100 elements pre-sized into the index.
pub struct CacheBuilder<K, V, H = ahash::RandomState> {
  capacity: u64,
  scavenge_period: Duration,
  cleanup_threshold: f64,
  scavenge_time_bound: Duration,
  initial_scavenge_delay: Duration,
  expected_element_count: usize,
  element_lifetime: Duration,
  expire_elements: bool,
  hasher: H,
  listener: Option<Arc<dyn EvictionListener<K, V>>>,
}

impl<K, V, H> fmt::Debug for CacheBuilder<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheBuilder")
      .field("capacity", &self.capacity)
      .field("scavenge_period", &self.scavenge_period)
      .field("cleanup_threshold", &self.cleanup_threshold)
      .field("element_lifetime", &self.element_lifetime)
      .field("expire_elements", &self.expire_elements)
      .field("has_listener", &self.listener.is_some())
      .finish_non_exhaustive()
  }
}

impl<K, V, H: BuildHasher + Default> CacheBuilder<K, V, H> {
  /// Creates a new `CacheBuilder` with default settings.
  pub fn new() -> Self {
    Self {
      capacity: 0,
      scavenge_period: Duration::from_secs(60),
      cleanup_threshold: 1.0,
      scavenge_time_bound: Duration::from_millis(300),
      initial_scavenge_delay: Duration::from_secs(20),
      expected_element_count: 100,
      element_lifetime: Duration::from_secs(60 * 60),
      expire_elements: true,
      hasher: H::default(),
      listener: None,
    }
  }
}

impl<K, V> Default for CacheBuilder<K, V, ahash::RandomState> {
  fn default() -> Self {
    Self::new()
  }
}

impl<K, V, H> CacheBuilder<K, V, H> {
  /// Sets the byte budget of the cache. A capacity of zero disables budget
  /// enforcement entirely.
  pub fn capacity(mut self, capacity: u64) -> Self {
    self.capacity = capacity;
    self
  }

  /// Sets the interval between timer-driven scavenge passes.
  pub fn scavenge_period(mut self, period: Duration) -> Self {
    self.scavenge_period = period;
    self
  }

  /// Sets the fill ratio above which a timer pass eagerly shrinks the
  /// resident set. Must lie in `(0, 1]`; validated at build time.
  pub fn cleanup_threshold(mut self, threshold: f64) -> Self {
    self.cleanup_threshold = threshold;
    self
  }

  /// Sets the wall-clock budget of a single scavenge pass, inline or
  /// timer-driven. A pass that exceeds it aborts mid-walk and leaves the
  /// remainder for the next tick.
  pub fn scavenge_time_bound(mut self, bound: Duration) -> Self {
    self.scavenge_time_bound = bound;
    self
  }

  /// Sets how long after construction the first timer pass fires.
  pub fn initial_scavenge_delay(mut self, delay: Duration) -> Self {
    self.initial_scavenge_delay = delay;
    self
  }

  /// Pre-sizes the node arena and the key index.
  pub fn expected_element_count(mut self, count: usize) -> Self {
    self.expected_element_count = count;
    self
  }

  /// Sets how long an entry may live before a timer pass removes it.
  pub fn element_lifetime(mut self, lifetime: Duration) -> Self {
    self.element_lifetime = lifetime;
    self
  }

  /// Enables or disables lifetime-based expiry. When disabled, timer
  /// passes only shrink the resident set back under the cleanup watermark.
  pub fn expire_elements(mut self, expire: bool) -> Self {
    self.expire_elements = expire;
    self
  }

  /// Sets the eviction listener for the cache.
  pub fn eviction_listener<Listener>(mut self, listener: Listener) -> Self
  where
    Listener: EvictionListener<K, V> + 'static,
  {
    self.listener = Some(Arc::new(listener));
    self
  }

  /// Sets the hasher for the key index.
  pub fn hasher(mut self, hasher: H) -> Self {
    self.hasher = hasher;
    self
  }
}

// The full set of trait bounds required to actually construct the cache,
// including everything the worker threads capture.
impl<K, V, H> CacheBuilder<K, V, H>
where
  K: Eq + Hash + Clone + Send + Sync + 'static,
  V: Resource + 'static,
  H: BuildHasher + Clone + Send + Sync + 'static,
{
  /// Builds the cache and starts its scavenger worker (and, when a
  /// listener is registered, the notifier worker).
  pub fn build(self) -> Result<Cache<K, V, H>, BuildError> {
    self.validate()?;

    let config = CacheConfig {
      capacity: self.capacity,
      cleanup_threshold: self.cleanup_threshold,
      scavenge_time_bound: self.scavenge_time_bound,
      element_lifetime: self.element_lifetime,
      expire_elements: self.expire_elements,
    };

    let core = Arc::new(RwLock::new(Core {
      list: LruList::with_capacity(self.expected_element_count, self.hasher.clone()),
      disposed: false,
    }));
    let metrics = Arc::new(Metrics::new());

    let (notifier, sender) = match self.listener {
      Some(listener) => {
        let (notifier, sender) = Notifier::spawn(listener);
        (Some(notifier), Some(sender))
      }
      None => (None, None),
    };

    let context = ScavengerContext {
      core: Arc::clone(&core),
      metrics: Arc::clone(&metrics),
      config: config.clone(),
      sender: sender.clone(),
    };
    let scavenger = Scavenger::spawn(
      context,
      clamp_timer(self.initial_scavenge_delay),
      clamp_timer(self.scavenge_period),
    );

    Ok(Cache {
      shared: Arc::new(CacheShared {
        core,
        metrics,
        config,
        scavenger: Mutex::new(Some(scavenger)),
        notifier: Mutex::new(notifier),
        notification_sender: Mutex::new(sender),
      }),
    })
  }

  fn validate(&self) -> Result<(), BuildError> {
    if !(self.cleanup_threshold > 0.0 && self.cleanup_threshold <= 1.0) {
      return Err(BuildError::InvalidCleanupThreshold(self.cleanup_threshold));
    }
    Ok(())
  }
}
