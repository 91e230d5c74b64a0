use crate::listener::{EvictionListener, EvictionReason};

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;

/// A message sent to the notifier worker.
pub(crate) type Notification<K, V> = (K, Arc<V>, EvictionReason);

const NOTIFICATION_CHANNEL_CAPACITY: usize = 128;

/// The background worker responsible for calling user-provided eviction
/// listeners, off the cache's lock.
pub(crate) struct Notifier {
  handle: JoinHandle<()>,
}

impl Notifier {
  /// Spawns a new notifier thread.
  pub(crate) fn spawn<K, V>(
    listener: Arc<dyn EvictionListener<K, V>>,
  ) -> (Self, Sender<Notification<K, V>>)
  where
    K: Send + 'static,
    V: Send + Sync + 'static,
  {
    let (tx, rx) = crossbeam_channel::bounded::<Notification<K, V>>(NOTIFICATION_CHANNEL_CAPACITY);

    let handle = thread::spawn(move || {
      // The loop ends when every sender is gone; notifications still
      // buffered in the channel are delivered before the worker exits.
      while let Ok((key, value, reason)) = rx.recv() {
        listener.on_evict(key, value, reason);
      }
    });

    (Self { handle }, tx)
  }

  /// Waits for the worker to drain and exit. Every sender must have been
  /// dropped before calling this.
  pub(crate) fn stop(self) {
    let _ = self.handle.join();
  }
}
