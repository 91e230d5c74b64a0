//! Contains types for iterating over a cache's contents.

use std::sync::Arc;

/// An iterator over a point-in-time snapshot of the cache.
///
/// Yields `(key, value)` pairs in recency order, most recent first. The
/// snapshot is taken under the cache's read lock when the iterator is
/// created; entries inserted, promoted, or removed afterwards are not
/// reflected.
pub struct Iter<K, V> {
  inner: std::vec::IntoIter<(K, Arc<V>)>,
}

impl<K, V> Iter<K, V> {
  pub(crate) fn new(snapshot: Vec<(K, Arc<V>)>) -> Self {
    Self {
      inner: snapshot.into_iter(),
    }
  }
}

impl<K, V> Iterator for Iter<K, V> {
  type Item = (K, Arc<V>);

  fn next(&mut self) -> Option<Self::Item> {
    self.inner.next()
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    self.inner.size_hint()
  }
}

impl<K, V> ExactSizeIterator for Iter<K, V> {}
