use mpk_types::Value;

use crate::error::UnpackError;
use crate::source::Source;
use crate::unpacker::Unpacker;

/// The lazy decode sequence of an [`Unpacker`], as an iterator.
///
/// Each `next` is one [`Unpacker::unpack_next`]. The iterator stops at
/// the first `None` or error. [`feed`](Self::feed) queues another source
/// and lets iteration resume:
///
/// ```rust
/// use mpk_decoder::Unpacker;
///
/// let mut unpacker = Unpacker::from_bytes(vec![0x01u8]);
/// let mut values = unpacker.values();
/// assert!(values.next().is_some());
/// assert!(values.next().is_none());
///
/// values.feed_bytes(vec![0x02u8]).unwrap();
/// assert!(values.next().is_some());
/// ```
pub struct Values<'a, 's> {
  unpacker: &'a mut Unpacker<'s>,
  done: bool,
}

impl<'a, 's> Values<'a, 's> {
  pub(crate) fn new(unpacker: &'a mut Unpacker<'s>) -> Self {
    Self {
      unpacker,
      done: false,
    }
  }

  /// Queue another source and resume iteration.
  ///
  /// # Errors
  ///
  /// [`UnpackError::Disposed`] after teardown.
  pub fn feed(&mut self, source: Source<'s>) -> Result<(), UnpackError> {
    self.unpacker.feed(source)?;
    self.done = false;
    Ok(())
  }

  /// # Errors
  ///
  /// [`UnpackError::Disposed`] after teardown.
  pub fn feed_bytes(&mut self, bytes: impl Into<bytes::Bytes>) -> Result<(), UnpackError> {
    self.feed(Source::from_bytes(bytes))
  }

  #[must_use]
  pub fn last_value(&self) -> Option<&Value> {
    self.unpacker.last_value()
  }
}

impl Iterator for Values<'_, '_> {
  type Item = Result<Value, UnpackError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }
    match self.unpacker.unpack_next() {
      Ok(Some(value)) => Some(Ok(value)),
      Ok(None) => {
        self.done = true;
        None
      }
      Err(e) => {
        self.done = true;
        Some(Err(e))
      }
    }
  }
}
