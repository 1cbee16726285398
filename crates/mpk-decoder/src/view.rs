use std::io::{self, ErrorKind};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::stream::ByteStream;

/// Largest single read issued against a stream origin. Buffer growth
/// tracks what the stream delivered, not what a length prefix claimed.
const READ_CHUNK: usize = 16 * 1024;

/// Where a view's bytes come from once its buffer runs dry.
enum Origin<'s> {
  /// Everything is already in the buffer.
  Memory,
  /// A possibly infinite byte iterator, pulled one byte at a time.
  Iter(Box<dyn Iterator<Item = u8> + 's>),
  /// A readable stream, pulled in exact-size reads.
  Stream(Box<dyn ByteStream + 's>),
}

/// Uniform lookahead buffer over any byte origin.
///
/// The decoding engine parses directly from [`available`](Self::available)
/// and asks for more with [`fill_to`](Self::fill_to) when a parse comes
/// up short. Only the bytes a parse has proven it needs are ever pulled
/// from an iterator or stream, so an infinite iterator or a slow socket
/// is never over-read.
///
/// ```text
///   origin ──fill_to(n)──▶ [ buffered, unconsumed bytes ] ──consume(k)──▶ gone
/// ```
///
/// In-memory content is held as the caller's `Bytes` and read in place.
/// It is copied only if a partial value from an earlier source has to
/// be carried in front of it.
pub struct ByteView<'s> {
  /// Shared in-memory content, read before `buf`. Only ever non-empty
  /// for a memory origin, and then `buf` is empty.
  front: Bytes,
  buf: BytesMut,
  origin: Origin<'s>,
}

impl<'s> ByteView<'s> {
  /// A view whose whole content is already in memory.
  #[must_use]
  pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
    Self {
      front: bytes.into(),
      buf: BytesMut::new(),
      origin: Origin::Memory,
    }
  }

  /// An empty in-memory view with `capacity` bytes reserved.
  #[must_use]
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      front: Bytes::new(),
      buf: BytesMut::with_capacity(capacity),
      origin: Origin::Memory,
    }
  }

  pub fn from_byte_iter<I>(iter: I) -> Self
  where
    I: IntoIterator<Item = u8>,
    I::IntoIter: 's,
  {
    Self {
      front: Bytes::new(),
      buf: BytesMut::new(),
      origin: Origin::Iter(Box::new(iter.into_iter())),
    }
  }

  pub fn from_stream(stream: impl ByteStream + 's) -> Self {
    Self {
      front: Bytes::new(),
      buf: BytesMut::new(),
      origin: Origin::Stream(Box::new(stream)),
    }
  }

  /// Buffered bytes not yet consumed.
  #[must_use]
  pub fn available(&self) -> &[u8] {
    if self.front.is_empty() {
      &self.buf
    } else {
      &self.front
    }
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.front.len() + self.buf.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  #[must_use]
  pub fn is_stream(&self) -> bool {
    matches!(self.origin, Origin::Stream(_))
  }

  /// Drop `n` bytes from the front of the buffer.
  pub fn consume(&mut self, n: usize) {
    if self.front.is_empty() {
      self.buf.advance(n);
    } else {
      self.front.advance(n);
    }
  }

  /// Reserve room for `additional` more buffered bytes. A view over
  /// shared in-memory content never grows, so nothing is reserved.
  pub fn reserve(&mut self, additional: usize) {
    if self.front.is_empty() {
      self.buf.reserve(additional);
    }
  }

  /// Pull from the origin until at least `want` bytes are buffered.
  ///
  /// Returns `Ok(true)` once `want` bytes are available, `Ok(false)` if
  /// the origin ran out first. Whatever was pulled stays buffered either
  /// way. A stream that hits end-of-file is not latched as finished: a
  /// later call reads again, so a producer may keep appending.
  ///
  /// # Errors
  ///
  /// Any read error from a stream origin other than `Interrupted`.
  pub fn fill_to(&mut self, want: usize) -> io::Result<bool> {
    while self.len() < want {
      let missing = want - self.len();
      match &mut self.origin {
        Origin::Memory => return Ok(false),
        Origin::Iter(iter) => {
          for _ in 0..missing {
            match iter.next() {
              Some(b) => self.buf.put_u8(b),
              None => return Ok(false),
            }
          }
        }
        Origin::Stream(stream) => {
          let start = self.buf.len();
          self.buf.resize(start + missing.min(READ_CHUNK), 0);
          match stream.read(&mut self.buf[start..]) {
            Ok(0) => {
              self.buf.truncate(start);
              return Ok(false);
            }
            Ok(n) => self.buf.truncate(start + n),
            Err(e) if e.kind() == ErrorKind::Interrupted => self.buf.truncate(start),
            Err(e) => {
              self.buf.truncate(start);
              return Err(e);
            }
          }
        }
      }
    }
    Ok(true)
  }

  /// Take every buffered, unconsumed byte out of the view.
  pub(crate) fn take_buffered(&mut self) -> Bytes {
    if self.front.is_empty() {
      self.buf.split().freeze()
    } else {
      std::mem::take(&mut self.front)
    }
  }

  /// Put `head` in front of the buffered bytes. Used to carry a partial
  /// value from an exhausted source into its successor.
  pub(crate) fn prepend(&mut self, head: &[u8]) {
    if head.is_empty() {
      return;
    }
    let mut merged = BytesMut::with_capacity(head.len() + self.len());
    merged.extend_from_slice(head);
    merged.extend_from_slice(&self.front);
    merged.extend_from_slice(&self.buf);
    self.front = Bytes::new();
    self.buf = merged;
  }

  /// Hand back the stream origin, if any, so it can be released.
  pub(crate) fn into_stream(self) -> Option<Box<dyn ByteStream + 's>> {
    match self.origin {
      Origin::Stream(stream) => Some(stream),
      Origin::Memory | Origin::Iter(_) => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::io::{Cursor, Read};

  use super::*;

  /// Stream that hands out at most one byte per read.
  struct Trickle(Cursor<Vec<u8>>);

  impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
      let n = buf.len().min(1);
      self.0.read(&mut buf[..n])
    }
  }

  impl ByteStream for Trickle {}

  #[test]
  fn memory_view_never_grows() {
    let mut view = ByteView::from_bytes(vec![1u8, 2, 3]);
    assert!(view.fill_to(3).unwrap());
    assert!(!view.fill_to(4).unwrap());
    assert_eq!(view.available(), &[1, 2, 3]);
  }

  #[test]
  fn iter_pulls_only_what_is_requested() {
    let mut view = ByteView::from_byte_iter(std::iter::repeat(7u8));
    assert!(view.fill_to(5).unwrap());
    assert_eq!(view.len(), 5);
    view.consume(2);
    assert!(view.fill_to(4).unwrap());
    assert_eq!(view.len(), 4);
  }

  #[test]
  fn stream_fill_loops_over_short_reads() {
    let mut view = ByteView::from_stream(Trickle(Cursor::new(vec![9, 8, 7, 6])));
    assert!(view.fill_to(3).unwrap());
    assert_eq!(view.available(), &[9, 8, 7]);
    assert!(view.fill_to(4).unwrap());
    assert!(!view.fill_to(5).unwrap());
    assert_eq!(view.len(), 4);
  }

  #[test]
  fn large_request_is_read_in_chunks() {
    let data = vec![0x5au8; READ_CHUNK * 2 + 3];
    let mut view = ByteView::from_stream(Cursor::new(data));
    assert!(view.fill_to(READ_CHUNK * 2 + 3).unwrap());
    assert_eq!(view.len(), READ_CHUNK * 2 + 3);
    assert!(!view.fill_to(READ_CHUNK * 3).unwrap());
  }

  #[test]
  fn take_and_prepend_carry_bytes() {
    let mut old = ByteView::from_bytes(vec![0xa3, b'a']);
    let carry = old.take_buffered();
    assert!(old.is_empty());

    let mut new = ByteView::from_bytes(vec![b'b', b'c']);
    new.prepend(&carry);
    assert_eq!(new.available(), &[0xa3, b'a', b'b', b'c']);
  }

  #[test]
  fn memory_view_reads_shared_bytes_in_place() {
    let bytes = Bytes::from(vec![1u8, 2, 3, 4]);
    let base = bytes.as_ptr();
    let mut view = ByteView::from_bytes(bytes.clone());
    view.reserve(1024);
    assert_eq!(view.available().as_ptr(), base);

    view.consume(1);
    assert_eq!(view.available().as_ptr(), base.wrapping_add(1));

    let carry = view.take_buffered();
    assert_eq!(carry.as_ptr(), base.wrapping_add(1));
    assert!(view.is_empty());
  }

  #[test]
  fn carry_in_front_of_shared_bytes() {
    let mut view = ByteView::from_bytes(vec![3u8, 4]);
    view.prepend(&[1, 2]);
    assert_eq!(view.available(), &[1, 2, 3, 4]);
    view.consume(3);
    assert_eq!(view.available(), &[4]);
  }

  #[test]
  fn only_stream_views_yield_a_stream() {
    assert!(ByteView::from_bytes(vec![1u8]).into_stream().is_none());
    assert!(ByteView::from_stream(Cursor::new(vec![1u8])).into_stream().is_some());
  }
}
