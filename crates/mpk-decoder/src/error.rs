use std::io;

use mpk_types::{Shape, TypeError};
use mpk_wire::WireError;

/// Errors surfaced by the unpacker and its decoding engine.
///
/// Insufficient data during lazy decoding is deliberately absent from
/// this enum: it is absorbed by the source chain's tail detection and
/// only ever shows up as a source switch or as the end of the sequence.
///
/// Error hierarchy:
///
/// ```text
///   UnpackError
///   ├── InvalidArgument      ← bad buffer window or configuration
///   ├── Disposed             ← any operation after teardown
///   ├── Truncated            ← direct op ran out of bytes in the current source
///   ├── TypeMismatch         ← leading marker is not the requested shape
///   ├── Wire(WireError)      ← reserved marker, length/depth limit, overflow
///   ├── Text(TypeError)      ← payload invalid in the requested text encoding
///   ├── Io(std::io::Error)   ← stream read failed
///   └── Release              ← one or more owned streams failed to release
/// ```
#[derive(Debug, thiserror::Error)]
pub enum UnpackError {
  /// A construction or configuration argument was unusable. Raised
  /// before any state is touched.
  #[error("invalid argument: {reason}")]
  InvalidArgument { reason: String },

  /// The unpacker has been torn down.
  #[error("unpacker has been disposed")]
  Disposed,

  /// A direct operation needed more bytes than the current source holds.
  ///
  /// Direct operations never advance to a pending source, so this is
  /// raised even when more sources are queued.
  #[error("truncated input: needed {needed} bytes, {available} available")]
  Truncated { needed: usize, available: usize },

  /// The value at the cursor does not have the requested shape. Nothing
  /// was consumed.
  #[error("type mismatch: expected {expected}, found {found}")]
  TypeMismatch { expected: Shape, found: &'static str },

  #[error(transparent)]
  Wire(#[from] WireError),

  #[error(transparent)]
  Text(#[from] TypeError),

  #[error(transparent)]
  Io(#[from] io::Error),

  /// Disposal could not release every owned stream. Every owned stream
  /// was still attempted; this lists each failure in feed order.
  #[error("failed to release {} owned stream(s)", .failures.len())]
  Release { failures: Vec<ReleaseFailure> },
}

impl UnpackError {
  pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
    Self::InvalidArgument {
      reason: reason.into(),
    }
  }
}

/// One owned stream that failed to release.
#[derive(Debug, thiserror::Error)]
#[error("source #{source_id}: {error}")]
pub struct ReleaseFailure {
  /// Position of the source in feed order, starting at 0 for the
  /// construction-time source.
  pub source_id: usize,
  pub error: io::Error,
}
