use bytes::Bytes;
use mpk_types::{TextEncoding, Value};
use tracing::{debug, trace, warn};

use crate::chain::SourceChain;
use crate::config::{UnpackerConfig, DEFAULT_BUFFER_CAPACITY};
use crate::engine::{self, Decoded, Limits};
use crate::error::UnpackError;
use crate::source::Source;
use crate::stream::ByteStream;
use crate::values::Values;
use crate::view::ByteView;

/// Turns one or more chained byte sources into MessagePack values.
///
/// Values can be pulled lazily across every fed source, or extracted one
/// at a time with the direct `unpack_*` operations:
///
/// ```text
/// ┌──────────────────────┬──────────────────────┬──────────────────────┐
/// │                      │ Lazy (unpack_next)   │ Direct (unpack_*)    │
/// ├──────────────────────┼──────────────────────┼──────────────────────┤
/// │ Sources consulted    │ current, then        │ current only         │
/// │                      │ pending in order     │                      │
/// │ Not enough bytes     │ next source, or None │ Err(Truncated)       │
/// │ last_value           │ set on success       │ always cleared       │
/// └──────────────────────┴──────────────────────┴──────────────────────┘
/// ```
///
/// # Example
///
/// ```rust
/// use mpk_decoder::Unpacker;
/// use mpk_types::Value;
///
/// let mut unpacker = Unpacker::from_bytes(vec![0x01u8]);
/// unpacker.feed_bytes(vec![0x02u8]).unwrap();
///
/// let values: Vec<Value> = unpacker.values().collect::<Result<_, _>>().unwrap();
/// assert_eq!(values, vec![Value::UInt(1), Value::UInt(2)]);
/// ```
///
/// Dropping the unpacker disposes it. Call [`dispose`](Self::dispose)
/// directly to observe release failures.
pub struct Unpacker<'s> {
  chain: SourceChain<'s>,
  last_value: Option<Value>,
  config: UnpackerConfig,
}

impl Default for Unpacker<'_> {
  fn default() -> Self {
    Self::new()
  }
}

impl<'s> Unpacker<'s> {
  /// An unpacker over an empty in-memory buffer of
  /// [`DEFAULT_BUFFER_CAPACITY`] bytes. Feed it sources to give it input.
  #[must_use]
  pub fn new() -> Self {
    Self::from_source(Source::empty(DEFAULT_BUFFER_CAPACITY))
  }

  #[must_use]
  pub fn from_source(source: Source<'s>) -> Self {
    Self {
      chain: SourceChain::new(source),
      last_value: None,
      config: UnpackerConfig::default(),
    }
  }

  #[must_use]
  pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
    Self::from_source(Source::from_bytes(bytes))
  }

  /// # Errors
  ///
  /// [`UnpackError::InvalidArgument`] if the window does not fit in `buf`.
  pub fn from_slice_range(buf: &[u8], offset: usize, count: usize) -> Result<Self, UnpackError> {
    Source::from_slice_range(buf, offset, count).map(Self::from_source)
  }

  pub fn from_byte_iter<I>(iter: I) -> Self
  where
    I: IntoIterator<Item = u8>,
    I::IntoIter: 's,
  {
    Self::from_source(Source::from_byte_iter(iter))
  }

  /// Read from `stream`. With `owns_stream` set, the stream is released
  /// when the unpacker is disposed.
  pub fn from_stream(stream: impl ByteStream + 's, owns_stream: bool) -> Self {
    let mut unpacker = Self::from_source(Source::from_stream(stream, owns_stream));
    unpacker.chain.reserve_current(DEFAULT_BUFFER_CAPACITY);
    unpacker
  }

  /// Replace the configuration.
  ///
  /// # Errors
  ///
  /// [`UnpackError::InvalidArgument`] if `config` fails validation.
  pub fn with_config(mut self, config: UnpackerConfig) -> Result<Self, UnpackError> {
    config.validate()?;
    self.config = config;
    self.chain.reserve_current(config.buffer_capacity);
    Ok(self)
  }

  #[must_use]
  pub fn config(&self) -> &UnpackerConfig {
    &self.config
  }

  fn ensure_live(&self) -> Result<(), UnpackError> {
    if self.chain.is_usable() {
      Ok(())
    } else {
      Err(UnpackError::Disposed)
    }
  }

  // ── Feeding ──────────────────────────────────────────────────────────

  /// Queue `source` after everything already fed. Allowed at any time
  /// before disposal, including between lazy pulls.
  ///
  /// # Errors
  ///
  /// [`UnpackError::Disposed`] after teardown.
  pub fn feed(&mut self, source: Source<'s>) -> Result<(), UnpackError> {
    self.ensure_live()?;
    self.chain.feed(source);
    Ok(())
  }

  /// # Errors
  ///
  /// [`UnpackError::Disposed`] after teardown.
  pub fn feed_bytes(&mut self, bytes: impl Into<Bytes>) -> Result<(), UnpackError> {
    self.feed(Source::from_bytes(bytes))
  }

  /// # Errors
  ///
  /// [`UnpackError::Disposed`] after teardown.
  pub fn feed_byte_iter<I>(&mut self, iter: I) -> Result<(), UnpackError>
  where
    I: IntoIterator<Item = u8>,
    I::IntoIter: 's,
  {
    self.feed(Source::from_byte_iter(iter))
  }

  /// # Errors
  ///
  /// [`UnpackError::Disposed`] after teardown.
  pub fn feed_stream(
    &mut self,
    stream: impl ByteStream + 's,
    owns_stream: bool,
  ) -> Result<(), UnpackError> {
    self.feed(Source::from_stream(stream, owns_stream))
  }

  // ── Lazy sequence ────────────────────────────────────────────────────

  /// Pull the next value, moving on to pending sources as the current
  /// one runs dry.
  ///
  /// Returns `Ok(None)` once every source is exhausted. That is not
  /// final: feeding another source makes later pulls productive again.
  /// Bytes of a value split across sources are carried forward, so the
  /// split is invisible here.
  ///
  /// # Errors
  ///
  /// Corrupt input, a stream read failure, or [`UnpackError::Disposed`].
  /// Running out of bytes is never an error.
  pub fn unpack_next(&mut self) -> Result<Option<Value>, UnpackError> {
    let limits = self.config.limits();
    loop {
      let view = self.chain.current_view_mut().ok_or(UnpackError::Disposed)?;
      match engine::try_decode_one(view, limits)? {
        Decoded::Value(value) => {
          self.chain.clear_tail();
          trace!(%value, "decoded value");
          self.last_value = Some(value.clone());
          return Ok(Some(value));
        }
        Decoded::Incomplete => {
          self.chain.mark_tail();
          if self.chain.is_at_true_end() {
            return Ok(None);
          }
        }
      }
    }
  }

  /// The lazy sequence as an iterator. Obtaining it again resumes where
  /// the previous one stopped.
  pub fn values(&mut self) -> Values<'_, 's> {
    Values::new(self)
  }

  // Read-only queries below stay callable after disposal and report an
  // empty unpacker (`None`, 0, `true`). Everything that reads or feeds
  // bytes fails with `Disposed` instead.

  /// The value most recently produced by the lazy sequence. Cleared by
  /// every direct operation and by disposal.
  #[must_use]
  pub fn last_value(&self) -> Option<&Value> {
    self.last_value.as_ref()
  }

  /// Sources fed but not yet reached. 0 after disposal.
  #[must_use]
  pub fn pending_sources(&self) -> usize {
    self.chain.pending_len()
  }

  /// Bytes read from the current source but not yet decoded. After the
  /// lazy sequence ends this is the size of a trailing partial value.
  /// 0 after disposal.
  #[must_use]
  pub fn buffered_len(&self) -> usize {
    self.chain.buffered_len()
  }

  #[must_use]
  pub fn is_disposed(&self) -> bool {
    !self.chain.is_usable()
  }

  // ── Direct operations ────────────────────────────────────────────────

  /// Run one direct extraction against the current source.
  fn direct<T>(
    &mut self,
    op: impl FnOnce(&mut ByteView<'s>, Limits) -> Result<T, UnpackError>,
  ) -> Result<T, UnpackError> {
    self.ensure_live()?;
    self.last_value = None;
    let limits = self.config.limits();
    let view = self.chain.current_view_mut().ok_or(UnpackError::Disposed)?;
    op(view, limits)
  }

  /// Element count of the array at the cursor. The elements follow.
  ///
  /// # Errors
  ///
  /// `Disposed`, `TypeMismatch`, `Truncated`, or a wire error.
  pub fn unpack_array_length(&mut self) -> Result<u32, UnpackError> {
    self.direct(engine::read_array_len)
  }

  /// Entry count of the map at the cursor. Keys and values follow,
  /// interleaved.
  ///
  /// # Errors
  ///
  /// `Disposed`, `TypeMismatch`, `Truncated`, or a wire error.
  pub fn unpack_map_length(&mut self) -> Result<u32, UnpackError> {
    self.direct(engine::read_map_len)
  }

  /// Payload length of the str or bin at the cursor. The payload bytes
  /// are left unread.
  ///
  /// # Errors
  ///
  /// `Disposed`, `TypeMismatch`, `Truncated`, or a wire error.
  pub fn unpack_raw_length(&mut self) -> Result<u32, UnpackError> {
    self.direct(engine::read_raw_len)
  }

  /// # Errors
  ///
  /// `Disposed`, `TypeMismatch`, or `Truncated`.
  pub fn unpack_null(&mut self) -> Result<(), UnpackError> {
    self.direct(engine::read_nil)
  }

  /// Consume a nil if one is next. Anything else stays in place.
  ///
  /// # Errors
  ///
  /// `Disposed`, or a stream read failure.
  pub fn try_unpack_null(&mut self) -> Result<bool, UnpackError> {
    self.direct(|view, _| engine::skip_nil(view))
  }

  /// # Errors
  ///
  /// `Disposed`, `TypeMismatch`, or `Truncated`.
  pub fn unpack_bool(&mut self) -> Result<bool, UnpackError> {
    self.direct(engine::read_bool)
  }

  /// Payload of the str or bin at the cursor.
  ///
  /// # Errors
  ///
  /// `Disposed`, `TypeMismatch`, `Truncated`, or a wire error.
  pub fn unpack_raw(&mut self) -> Result<Vec<u8>, UnpackError> {
    self.direct(engine::read_raw)
  }

  /// A UTF-8 string.
  ///
  /// # Errors
  ///
  /// `Disposed`, `TypeMismatch`, `Truncated`, `Text`, or a wire error.
  pub fn unpack_string(&mut self) -> Result<String, UnpackError> {
    self.unpack_string_with(TextEncoding::Utf8)
  }

  /// A string in `encoding`. Bytes that are invalid in `encoding` leave
  /// the value unconsumed.
  ///
  /// # Errors
  ///
  /// `Disposed`, `TypeMismatch`, `Truncated`, `Text`, or a wire error.
  pub fn unpack_string_with(&mut self, encoding: TextEncoding) -> Result<String, UnpackError> {
    self.direct(|view, limits| engine::read_str(view, limits, encoding))
  }

  /// Any single value, decoded generically. Unlike the lazy sequence,
  /// this never moves to a pending source.
  ///
  /// # Errors
  ///
  /// `Disposed`, `Truncated`, or a wire error.
  pub fn unpack_value(&mut self) -> Result<Value, UnpackError> {
    self.direct(engine::read_value)
  }

  /// # Errors
  ///
  /// `Disposed`, `TypeMismatch`, `Truncated`, or `IntegerOverflow`.
  pub fn unpack_u64(&mut self) -> Result<u64, UnpackError> {
    self.direct(engine::read_u64)
  }

  /// # Errors
  ///
  /// `Disposed`, `TypeMismatch`, `Truncated`, or `IntegerOverflow`.
  pub fn unpack_i64(&mut self) -> Result<i64, UnpackError> {
    self.direct(engine::read_i64)
  }

  /// # Errors
  ///
  /// `Disposed`, `TypeMismatch`, or `Truncated`.
  pub fn unpack_f64(&mut self) -> Result<f64, UnpackError> {
    self.direct(engine::read_f64)
  }

  /// Type id and payload of an extension value.
  ///
  /// # Errors
  ///
  /// `Disposed`, `TypeMismatch`, `Truncated`, or a wire error.
  pub fn unpack_ext(&mut self) -> Result<(i8, Vec<u8>), UnpackError> {
    self.direct(engine::read_ext)
  }

  // ── Teardown ─────────────────────────────────────────────────────────

  /// Release every owned stream and drop every source.
  ///
  /// Sources are released in feed order. A failure does not stop the
  /// rest; all of them are reported together. Calling this again is a
  /// no-op returning `Ok(())`.
  ///
  /// # Errors
  ///
  /// [`UnpackError::Release`] listing each stream that failed to release,
  /// including any that failed when the lazy sequence moved past them.
  pub fn dispose(&mut self) -> Result<(), UnpackError> {
    if !self.chain.is_usable() {
      return Ok(());
    }
    self.last_value = None;
    let failures = self.chain.teardown();
    debug!(failures = failures.len(), "unpacker disposed");
    if failures.is_empty() {
      Ok(())
    } else {
      Err(UnpackError::Release { failures })
    }
  }
}

impl Drop for Unpacker<'_> {
  fn drop(&mut self) {
    if let Err(UnpackError::Release { failures }) = self.dispose() {
      for failure in &failures {
        warn!(source_id = failure.source_id, error = %failure.error, "failed to release stream");
      }
    }
  }
}
