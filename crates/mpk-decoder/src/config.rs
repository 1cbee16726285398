use crate::engine::Limits;
use crate::error::UnpackError;

/// Initial buffer reservation for the current source (64 KiB). Also the
/// capacity of the in-memory buffer created by [`Unpacker::new`](crate::Unpacker::new).
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Largest declared str/bin/ext length or array/map count accepted
/// before anything is allocated or read (64 MiB).
pub const DEFAULT_MAX_LENGTH: usize = 64 * 1024 * 1024;

/// Deepest container nesting accepted by the generic decoder.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Configuration for an [`Unpacker`](crate::Unpacker).
///
/// ```text
/// ┌─────────────────┬───────────────────────────────────────────────┐
/// │ Field           │ Purpose                                       │
/// ├─────────────────┼───────────────────────────────────────────────┤
/// │ buffer_capacity │ Bytes reserved up front for the current source│
/// │ max_length      │ Cap on any declared length or element count   │
/// │ max_depth       │ Cap on array/map nesting                      │
/// └─────────────────┴───────────────────────────────────────────────┘
/// ```
///
/// Declared lengths are checked against `max_length` as soon as the
/// prefix is read, so a hostile 4 GiB `bin32` header on a stream fails
/// immediately instead of trying to buffer 4 GiB.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnpackerConfig {
  pub buffer_capacity: usize,
  pub max_length: usize,
  pub max_depth: usize,
}

impl Default for UnpackerConfig {
  fn default() -> Self {
    Self {
      buffer_capacity: DEFAULT_BUFFER_CAPACITY,
      max_length: DEFAULT_MAX_LENGTH,
      max_depth: DEFAULT_MAX_DEPTH,
    }
  }
}

impl UnpackerConfig {
  /// Reject settings that would make every decode fail.
  ///
  /// # Errors
  ///
  /// [`UnpackError::InvalidArgument`] if any field is zero.
  pub fn validate(&self) -> Result<(), UnpackError> {
    if self.buffer_capacity == 0 {
      return Err(UnpackError::invalid_argument("buffer_capacity must be non-zero"));
    }
    if self.max_length == 0 {
      return Err(UnpackError::invalid_argument("max_length must be non-zero"));
    }
    if self.max_depth == 0 {
      return Err(UnpackError::invalid_argument("max_depth must be non-zero"));
    }
    Ok(())
  }

  #[must_use]
  pub fn limits(&self) -> Limits {
    Limits {
      max_length: self.max_length,
      max_depth: self.max_depth,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_is_valid() {
    assert!(UnpackerConfig::default().validate().is_ok());
  }

  #[test]
  fn zero_fields_are_rejected() {
    let config = UnpackerConfig {
      max_length: 0,
      ..UnpackerConfig::default()
    };
    assert!(matches!(
      config.validate(),
      Err(UnpackError::InvalidArgument { .. })
    ));
  }
}
