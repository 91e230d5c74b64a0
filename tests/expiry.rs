mod common;

use common::TestResource;
use larder::{Cache, CacheBuilder};

use std::thread;
use std::time::Duration;

fn expiring_cache(
  period: Duration,
  lifetime: Duration,
  initial_delay: Duration,
) -> Cache<u64, TestResource> {
  CacheBuilder::new()
    .capacity(1000)
    .scavenge_period(period)
    .element_lifetime(lifetime)
    .initial_scavenge_delay(initial_delay)
    .build()
    .unwrap()
}

#[test]
fn test_timer_expires_aged_entries() {
  let cache = expiring_cache(
    Duration::from_secs(1),
    Duration::from_millis(1),
    Duration::from_millis(100),
  );

  for key in 0..1000u64 {
    cache.insert(key, TestResource::new(1)).unwrap();
  }
  assert_eq!(cache.len(), 1000);

  thread::sleep(Duration::from_millis(500));

  assert_eq!(cache.len(), 0, "the first pass should expire everything");
  assert_eq!(cache.current_size(), 0);
  assert_eq!(cache.metrics().evicted_by_expiry, 1000);
}

#[test]
fn test_partial_expiry_spares_younger_entries() {
  let cache = expiring_cache(
    Duration::from_millis(50),
    Duration::from_millis(500),
    Duration::from_millis(50),
  );

  for key in 0..10u64 {
    cache.insert(key, TestResource::new(1)).unwrap();
  }
  thread::sleep(Duration::from_millis(200));
  for key in 10..30u64 {
    cache.insert(key, TestResource::new(1)).unwrap();
  }
  thread::sleep(Duration::from_millis(400));

  // The first batch is past its lifetime; the second is not.
  assert_eq!(cache.len(), 20);
  let mut survivors = cache.keys().unwrap();
  survivors.sort_unstable();
  assert_eq!(survivors, (10..30u64).collect::<Vec<_>>());
}

#[test]
fn test_expiry_releases_payloads_once() {
  let cache = expiring_cache(
    Duration::from_millis(50),
    Duration::from_millis(1),
    Duration::from_millis(50),
  );

  let mut states = Vec::new();
  for key in 0..20u64 {
    let (resource, state) = TestResource::with_state(1);
    cache.insert(key, resource).unwrap();
    states.push(state);
  }

  thread::sleep(Duration::from_millis(300));

  assert_eq!(cache.len(), 0);
  for state in &states {
    assert_eq!(state.count(), 1);
  }
}

#[test]
fn test_expiry_can_be_disabled() {
  let cache: Cache<u64, TestResource> = CacheBuilder::new()
    .capacity(1000)
    .scavenge_period(Duration::from_millis(50))
    .element_lifetime(Duration::from_millis(1))
    .initial_scavenge_delay(Duration::from_millis(50))
    .expire_elements(false)
    .build()
    .unwrap();

  for key in 0..10u64 {
    cache.insert(key, TestResource::new(1)).unwrap();
  }
  thread::sleep(Duration::from_millis(300));

  assert_eq!(cache.len(), 10, "disabled expiry must leave entries alone");
}

#[test]
fn test_timer_shrinks_resident_set_past_threshold() {
  // No expiry; the timer pass still pulls the resident set back under
  // capacity * cleanup_threshold once it has drifted above it.
  let cache: Cache<u64, TestResource> = CacheBuilder::new()
    .capacity(100)
    .cleanup_threshold(0.5)
    .scavenge_period(Duration::from_millis(50))
    .initial_scavenge_delay(Duration::from_millis(50))
    .expire_elements(false)
    .build()
    .unwrap();

  for key in 0..10u64 {
    cache.insert(key, TestResource::new(10)).unwrap();
  }
  assert_eq!(cache.current_size(), 100);

  thread::sleep(Duration::from_millis(300));

  assert!(
    cache.current_size() <= 50,
    "timer should shrink to the watermark, got {}",
    cache.current_size()
  );
  // The survivors are the most recently inserted keys.
  let mut keys = cache.keys().unwrap();
  keys.sort_unstable();
  assert_eq!(keys, (5..10u64).collect::<Vec<_>>());
}
