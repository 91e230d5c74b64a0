use crate::entry::CacheEntry;
use crate::list::LruList;
use crate::listener::EvictionReason;
use crate::metrics::Metrics;
use crate::resource::Resource;
use crate::shared::{release_and_notify, CacheConfig, Core};
use crate::task::notifier::Notification;

use std::hash::{BuildHasher, Hash};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use parking_lot::{Condvar, Mutex, RwLock};

/// Everything the scavenger worker needs, shared with the facade. The
/// worker deliberately does not hold the facade itself, so dropping the
/// last cache handle tears the worker down rather than leaking it.
pub(crate) struct ScavengerContext<K: Send, V: Resource, H> {
  pub(crate) core: Arc<RwLock<Core<K, V, H>>>,
  pub(crate) metrics: Arc<Metrics>,
  pub(crate) config: CacheConfig,
  pub(crate) sender: Option<Sender<Notification<K, V>>>,
}

/// Shutdown coordination for the worker thread: a flag plus a condvar so
/// that `stop` interrupts a sleeping worker immediately instead of waiting
/// out the remainder of a tick.
struct Shutdown {
  stopped: Mutex<bool>,
  wake: Condvar,
}

impl Shutdown {
  /// Sleeps for `duration` or until tripped. Returns true when the worker
  /// should exit.
  fn sleep(&self, duration: Duration) -> bool {
    let deadline = Instant::now() + duration;
    let mut stopped = self.stopped.lock();
    while !*stopped {
      if self.wake.wait_until(&mut stopped, deadline).timed_out() {
        break;
      }
    }
    *stopped
  }

  fn trip(&self) {
    *self.stopped.lock() = true;
    self.wake.notify_all();
  }
}

/// The background worker that expires aged entries and shrinks the
/// resident set back under the configured watermark.
pub(crate) struct Scavenger {
  handle: JoinHandle<()>,
  shutdown: Arc<Shutdown>,
}

impl Scavenger {
  /// Spawns the worker thread. It first fires after `initial_delay`, then
  /// every `period`.
  pub(crate) fn spawn<K, V, H>(
    context: ScavengerContext<K, V, H>,
    initial_delay: Duration,
    period: Duration,
  ) -> Self
  where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Resource + 'static,
    H: BuildHasher + Send + Sync + 'static,
  {
    let shutdown = Arc::new(Shutdown {
      stopped: Mutex::new(false),
      wake: Condvar::new(),
    });
    let shutdown_clone = Arc::clone(&shutdown);

    let handle = thread::spawn(move || {
      if shutdown_clone.sleep(initial_delay) {
        return;
      }
      loop {
        run_timer_pass(&context);
        if shutdown_clone.sleep(period) {
          return;
        }
      }
    });

    Self { handle, shutdown }
  }

  /// Signals the worker to stop and waits for it to finish. Any pass in
  /// flight completes first.
  pub(crate) fn stop(self) {
    self.shutdown.trip();
    let _ = self.handle.join();
  }
}

/// One timer-driven scavenge pass.
///
/// Expires aged entries, then shrinks the resident set back to
/// `capacity * cleanup_threshold`; both phases abort once the wall-clock
/// budget is exceeded, leaving the rest for the next tick. Every pass,
/// inline or timer-driven, holds the write lock for its whole walk and
/// never releases it between phases, so at most one scavenge runs at any
/// instant. Payloads are released only after the write lock is dropped;
/// removal from the list and index under the lock is what makes the
/// release exactly-once.
pub(crate) fn run_timer_pass<K, V, H>(context: &ScavengerContext<K, V, H>)
where
  K: Eq + Hash + Clone + Send,
  V: Resource,
  H: BuildHasher,
{
  let scavenge_start = Instant::now();
  let deadline = scavenge_start + context.config.scavenge_time_bound;
  let mut expired = Vec::new();
  let mut shrunk = Vec::new();

  {
    let mut core = context.core.write();
    if core.disposed {
      return;
    }

    if context.config.expire_elements {
      expire_aged(
        &mut core.list,
        context.config.element_lifetime,
        scavenge_start,
        deadline,
        &mut expired,
      );
    }

    if context.config.capacity > 0 {
      let watermark = (context.config.capacity as f64 * context.config.cleanup_threshold) as u64;
      if core.list.current_size() > watermark {
        shrink_to_budget(&mut core.list, watermark, deadline, false, &mut shrunk);
      }
    }
  }

  context.metrics.scavenge_passes.fetch_add(1, Ordering::Relaxed);
  if !expired.is_empty() {
    context
      .metrics
      .evicted_by_expiry
      .fetch_add(expired.len() as u64, Ordering::Relaxed);
    release_and_notify(context.sender.as_ref(), expired, EvictionReason::Expired);
  }
  if !shrunk.is_empty() {
    context
      .metrics
      .evicted_by_capacity
      .fetch_add(shrunk.len() as u64, Ordering::Relaxed);
    release_and_notify(context.sender.as_ref(), shrunk, EvictionReason::Capacity);
  }
}

/// Walks the list from the least-recently-used end, removing every entry
/// that had already outlived `lifetime` when the pass started.
///
/// Fresh entries cluster at the front, so the walk tends to find victims
/// early, but no monotonicity is assumed: every node is visited once
/// unless the deadline cuts the walk short.
fn expire_aged<K, V, H>(
  list: &mut LruList<K, V, H>,
  lifetime: Duration,
  scavenge_start: Instant,
  deadline: Instant,
  victims: &mut Vec<(K, CacheEntry<V>)>,
) where
  K: Eq + Hash + Clone,
  H: BuildHasher,
{
  let mut cursor = list.tail_index();
  while let Some(index) = cursor {
    if Instant::now() > deadline {
      log::debug!("expiry walk aborted: scavenge time bound exceeded");
      break;
    }
    cursor = list.prev_of(index);
    if list.entry_at(index).is_expired(lifetime, scavenge_start) {
      victims.push(list.remove_at(index));
    }
  }
}

/// Evicts from the least-recently-used end until the cumulative size is at
/// or below `target`, the deadline passes, or the list runs dry. Expiry is
/// never consulted on this path.
///
/// With `keep_front` set the walk spares the head node; budget-enforcing
/// callers that just promoted their own entry use this so the walk cannot
/// consume it.
pub(crate) fn shrink_to_budget<K, V, H>(
  list: &mut LruList<K, V, H>,
  target: u64,
  deadline: Instant,
  keep_front: bool,
  victims: &mut Vec<(K, CacheEntry<V>)>,
) where
  K: Eq + Hash + Clone,
  H: BuildHasher,
{
  while list.current_size() > target {
    if Instant::now() > deadline {
      log::debug!("eviction walk aborted: scavenge time bound exceeded");
      break;
    }
    if keep_front && list.len() <= 1 {
      break;
    }
    match list.pop_back() {
      Some(victim) => victims.push(victim),
      None => break,
    }
  }
}
