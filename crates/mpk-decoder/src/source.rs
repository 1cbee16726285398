use std::io;

use bytes::Bytes;

use crate::error::UnpackError;
use crate::stream::ByteStream;
use crate::view::ByteView;

/// One contiguous origin of encoded bytes plus ownership metadata.
///
/// A `Source` is the unit the [`SourceChain`](crate::SourceChain) queues.
/// It exposes every origin the same way, as a [`ByteView`]:
///
/// ```text
/// ┌──────────────────────┬──────────────────────┬─────────────┐
/// │ Constructor          │ Origin               │ owns_stream │
/// ├──────────────────────┼──────────────────────┼─────────────┤
/// │ from_bytes           │ in-memory buffer     │ false       │
/// │ from_slice_range     │ copied buffer window │ false       │
/// │ from_byte_iter       │ byte iterator        │ false       │
/// │ from_stream          │ ByteStream           │ caller's    │
/// └──────────────────────┴──────────────────────┴─────────────┘
/// ```
///
/// A source has no teardown of its own; whoever holds the chain
/// releases it.
pub struct Source<'s> {
  view: ByteView<'s>,
  owns_stream: bool,
}

impl<'s> Source<'s> {
  #[must_use]
  pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
    Self {
      view: ByteView::from_bytes(bytes),
      owns_stream: false,
    }
  }

  /// Copy `count` bytes of `buf` starting at `offset`.
  ///
  /// # Errors
  ///
  /// [`UnpackError::InvalidArgument`] if the window does not fit in `buf`.
  pub fn from_slice_range(buf: &[u8], offset: usize, count: usize) -> Result<Self, UnpackError> {
    let end = offset.checked_add(count).ok_or_else(|| {
      UnpackError::invalid_argument(format!("offset {offset} + count {count} overflows"))
    })?;
    let window = buf.get(offset..end).ok_or_else(|| {
      UnpackError::invalid_argument(format!(
        "window {offset}..{end} is outside a buffer of {} bytes",
        buf.len()
      ))
    })?;
    Ok(Self::from_bytes(Bytes::copy_from_slice(window)))
  }

  /// Wrap a byte iterator. The iterator may be infinite; bytes are
  /// pulled only as decoding needs them.
  pub fn from_byte_iter<I>(iter: I) -> Self
  where
    I: IntoIterator<Item = u8>,
    I::IntoIter: 's,
  {
    Self {
      view: ByteView::from_byte_iter(iter),
      owns_stream: false,
    }
  }

  /// Wrap a stream. When `owns_stream` is true the unpacker releases the
  /// stream at disposal (or when it advances past this source).
  pub fn from_stream(stream: impl ByteStream + 's, owns_stream: bool) -> Self {
    Self {
      view: ByteView::from_stream(stream),
      owns_stream,
    }
  }

  pub(crate) fn empty(capacity: usize) -> Self {
    Self {
      view: ByteView::with_capacity(capacity),
      owns_stream: false,
    }
  }

  #[must_use]
  pub fn owns_stream(&self) -> bool {
    self.owns_stream
  }

  #[must_use]
  pub fn is_stream(&self) -> bool {
    self.view.is_stream()
  }

  pub(crate) fn view(&self) -> &ByteView<'s> {
    &self.view
  }

  pub(crate) fn view_mut(&mut self) -> &mut ByteView<'s> {
    &mut self.view
  }

  /// Release the stream if this source owns one, then drop everything.
  pub(crate) fn release(self) -> io::Result<()> {
    let owns_stream = self.owns_stream;
    match self.view.into_stream() {
      Some(mut stream) if owns_stream => stream.release(),
      _ => Ok(()),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;

  #[test]
  fn slice_range_copies_the_window() {
    let buf = [0xffu8, 0x01, 0x02, 0xff];
    let mut source = Source::from_slice_range(&buf, 1, 2).unwrap();
    assert_eq!(source.view_mut().available(), &[0x01, 0x02]);
    assert!(!source.owns_stream());
  }

  #[test]
  fn slice_range_rejects_out_of_bounds() {
    let buf = [0u8; 4];
    assert!(matches!(
      Source::from_slice_range(&buf, 3, 2),
      Err(UnpackError::InvalidArgument { .. })
    ));
    assert!(matches!(
      Source::from_slice_range(&buf, usize::MAX, 2),
      Err(UnpackError::InvalidArgument { .. })
    ));
  }

  #[test]
  fn empty_window_is_allowed() {
    let buf = [0u8; 4];
    let mut source = Source::from_slice_range(&buf, 4, 0).unwrap();
    assert!(source.view_mut().is_empty());
  }

  #[test]
  fn stream_ownership_is_recorded() {
    let owned = Source::from_stream(Cursor::new(vec![1u8]), true);
    assert!(owned.owns_stream());
    assert!(owned.is_stream());

    let borrowed = Source::from_stream(Cursor::new(vec![1u8]), false);
    assert!(!borrowed.owns_stream());
  }
}
