mod common;

use common::{quiet_cache, TestResource};
use larder::CacheError;

use std::sync::Arc;
use std::thread;

#[test]
fn test_dispose_empties_and_refuses_further_use() {
  let cache = quiet_cache(1000);
  let mut states = Vec::new();
  for key in 0..100u64 {
    let (resource, state) = TestResource::with_state(1);
    cache.insert(key, resource).unwrap();
    states.push(state);
  }

  cache.dispose();

  assert_eq!(cache.len(), 0);
  assert_eq!(cache.current_size(), 0);
  for state in &states {
    assert_eq!(state.count(), 1, "dispose releases each payload once");
  }

  assert_eq!(
    cache.insert(1, TestResource::new(1)),
    Err(CacheError::Disposed)
  );
  assert!(matches!(cache.get(&1), Err(CacheError::Disposed)));
  assert_eq!(cache.remove(&1), Err(CacheError::Disposed));
  assert_eq!(cache.clear(), Err(CacheError::Disposed));
  assert_eq!(
    cache.replace(&1, TestResource::new(1)),
    Err(CacheError::Disposed)
  );
  assert!(cache.iter().is_err());
  assert!(cache.keys().is_err());
  assert!(cache.values().is_err());
}

#[test]
fn test_dispose_is_idempotent() {
  let cache = quiet_cache(1000);
  let (resource, state) = TestResource::with_state(1);
  cache.insert(1, resource).unwrap();

  cache.dispose();
  cache.dispose();

  assert_eq!(state.count(), 1, "a second dispose must not re-release");
  assert_eq!(cache.len(), 0);
}

#[test]
fn test_failed_insert_does_not_release_after_dispose() {
  let cache = quiet_cache(1000);
  cache.dispose();

  let (candidate, state) = TestResource::with_state(1);
  assert_eq!(cache.insert(1, candidate), Err(CacheError::Disposed));
  assert_eq!(state.count(), 0);
}

#[test]
fn test_dispose_races_with_writers() {
  let cache = Arc::new(quiet_cache(10_000));
  for key in 0..100u64 {
    cache.insert(key, TestResource::new(1)).unwrap();
  }

  let writer = {
    let cache = Arc::clone(&cache);
    thread::spawn(move || {
      // Inserts race the dispose; each either lands (and is released by
      // the dispose) or is refused. Both outcomes are fine.
      for key in 100..2000u64 {
        if cache.insert(key, TestResource::new(1)).is_err() {
          break;
        }
      }
    })
  };

  cache.dispose();
  writer.join().unwrap();

  assert_eq!(cache.len(), 0);
  assert_eq!(cache.current_size(), 0);
}

#[test]
fn test_dropping_the_cache_releases_residents() {
  let (resource, state) = TestResource::with_state(1);
  {
    let cache = quiet_cache(1000);
    cache.insert(1, resource).unwrap();
    // No explicit dispose: the drop path performs the same teardown.
  }
  assert_eq!(state.count(), 1);
}
