use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::net::{Shutdown, TcpStream};

/// A readable byte stream that a [`Source`](crate::Source) can wrap.
///
/// The unpacker reads from the stream on demand and, at disposal,
/// calls [`release`](Self::release) on every stream it was told it
/// owns. Streams it does not own are dropped without being released.
///
/// Ownership follows the handle you pass in:
///
/// ```text
/// ┌──────────────────────────┬─────────────────────────────────────────┐
/// │ Handle passed            │ After disposal                          │
/// ├──────────────────────────┼─────────────────────────────────────────┤
/// │ S, owns_stream = true    │ released, then dropped                  │
/// │ S, owns_stream = false   │ dropped without release                 │
/// │ &mut S / &File           │ caller still holds S, open and usable   │
/// └──────────────────────────┴─────────────────────────────────────────┘
/// ```
///
/// To keep using a stream after the unpacker is gone, pass a borrow
/// (or a cloned handle) with `owns_stream = false`.
pub trait ByteStream: Read {
  /// Release the underlying resource (shut a socket down, flush and
  /// close a handle). Called at most once, and only for owned streams.
  ///
  /// The default does nothing; dropping the stream afterwards closes
  /// it for most std types.
  ///
  /// # Errors
  ///
  /// Any I/O error from the release itself.
  fn release(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl ByteStream for &[u8] {}

impl<T: AsRef<[u8]>> ByteStream for Cursor<T> {}

impl ByteStream for io::Empty {}

impl ByteStream for io::Stdin {}

impl ByteStream for io::StdinLock<'_> {}

impl ByteStream for File {}

impl ByteStream for &File {}

impl ByteStream for std::process::ChildStdout {}

impl ByteStream for TcpStream {
  fn release(&mut self) -> io::Result<()> {
    self.shutdown(Shutdown::Both)
  }
}

impl<R: ByteStream> ByteStream for BufReader<R> {
  fn release(&mut self) -> io::Result<()> {
    self.get_mut().release()
  }
}

impl<S: ByteStream + ?Sized> ByteStream for &mut S {
  fn release(&mut self) -> io::Result<()> {
    (**self).release()
  }
}

impl<S: ByteStream + ?Sized> ByteStream for Box<S> {
  fn release(&mut self) -> io::Result<()> {
    (**self).release()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Flagged {
    released: bool,
  }

  impl Read for Flagged {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
      Ok(0)
    }
  }

  impl ByteStream for Flagged {
    fn release(&mut self) -> io::Result<()> {
      self.released = true;
      Ok(())
    }
  }

  #[test]
  fn borrowed_stream_delegates_release() {
    let mut inner = Flagged { released: false };
    {
      let mut borrowed = &mut inner;
      ByteStream::release(&mut borrowed).unwrap();
    }
    assert!(inner.released);
  }

  #[test]
  fn boxed_stream_delegates_release() {
    let mut boxed: Box<dyn ByteStream> = Box::new(Cursor::new(vec![1u8]));
    assert!(boxed.release().is_ok());
  }
}
