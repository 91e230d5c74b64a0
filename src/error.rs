use std::fmt;

/// Errors that can occur when building a cache.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
  /// The cleanup threshold must be a fraction in `(0, 1]`.
  InvalidCleanupThreshold(f64),
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::InvalidCleanupThreshold(value) => {
        write!(f, "cleanup threshold must be in (0, 1], got {value}")
      }
    }
  }
}

impl std::error::Error for BuildError {}

/// Errors surfaced by cache operations.
///
/// A failed operation has no observable effect on cache state; in
/// particular, a failed `insert` or `replace` never invokes the candidate
/// payload's release hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
  /// The cache has been disposed; every operation other than `dispose`
  /// itself is refused.
  Disposed,
  /// `insert` was called with a key that is already present.
  DuplicateKey,
  /// `replace` was called with a key that is not present.
  AbsentKey,
}

impl fmt::Display for CacheError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CacheError::Disposed => write!(f, "the cache has been disposed"),
      CacheError::DuplicateKey => write!(f, "the key is already present"),
      CacheError::AbsentKey => write!(f, "the key is not present"),
    }
  }
}

impl std::error::Error for CacheError {}
