//! Shared stream fixtures for the integration tests and benches.
//!
//! ```text
//! ┌────────────────┬──────────────────────────────────────────────────┐
//! │ Fixture        │ Behaviour                                        │
//! ├────────────────┼──────────────────────────────────────────────────┤
//! │ TrackedStream  │ serves bytes, records release through a handle   │
//! │ FailingRelease │ serves bytes, release always errors              │
//! │ BrokenRead     │ every read errors                                │
//! └────────────────┴──────────────────────────────────────────────────┘
//! ```
//!
//! `TrackedStream` also caps each read, so tests see the short reads a
//! pipe or socket would produce.

use std::cell::Cell;
use std::io::{self, Cursor, Read};
use std::rc::Rc;

use mpk_decoder::ByteStream;

/// Observer half of a [`TrackedStream`]. Stays valid after the stream
/// itself has been moved into an unpacker and dropped.
#[derive(Clone, Debug, Default)]
pub struct ReleaseProbe {
    released: Rc<Cell<u32>>,
    reads: Rc<Cell<u32>>,
}

impl ReleaseProbe {
    /// Whether the stream was released at least once.
    #[must_use]
    pub fn released(&self) -> bool {
        self.released.get() > 0
    }

    #[must_use]
    pub fn release_count(&self) -> u32 {
        self.released.get()
    }

    /// Number of `read` calls that returned data or EOF.
    #[must_use]
    pub fn reads(&self) -> u32 {
        self.reads.get()
    }
}

pub struct TrackedStream {
    data: Cursor<Vec<u8>>,
    max_read: usize,
    probe: ReleaseProbe,
}

impl TrackedStream {
    /// A stream over `data` plus the probe that observes it.
    #[must_use]
    pub fn new(data: impl Into<Vec<u8>>) -> (Self, ReleaseProbe) {
        Self::chunked(data, usize::MAX)
    }

    /// Like [`new`](Self::new), but every read returns at most
    /// `max_read` bytes.
    #[must_use]
    pub fn chunked(data: impl Into<Vec<u8>>, max_read: usize) -> (Self, ReleaseProbe) {
        let probe = ReleaseProbe::default();
        let stream = Self {
            data: Cursor::new(data.into()),
            max_read: max_read.max(1),
            probe: probe.clone(),
        };
        (stream, probe)
    }

    /// Bytes not yet read from the stream.
    #[must_use]
    pub fn remaining(&self) -> usize {
        let len = self.data.get_ref().len();
        len.saturating_sub(usize::try_from(self.data.position()).unwrap_or(len))
    }
}

impl Read for TrackedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.max_read);
        let read = self.data.read(&mut buf[..n])?;
        self.probe.reads.set(self.probe.reads.get() + 1);
        Ok(read)
    }
}

impl ByteStream for TrackedStream {
    fn release(&mut self) -> io::Result<()> {
        self.probe.released.set(self.probe.released.get() + 1);
        Ok(())
    }
}

/// A stream whose release always fails.
pub struct FailingRelease {
    data: Cursor<Vec<u8>>,
    message: &'static str,
}

impl FailingRelease {
    #[must_use]
    pub fn new(data: impl Into<Vec<u8>>, message: &'static str) -> Self {
        Self {
            data: Cursor::new(data.into()),
            message,
        }
    }
}

impl Read for FailingRelease {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.data.read(buf)
    }
}

impl ByteStream for FailingRelease {
    fn release(&mut self) -> io::Result<()> {
        Err(io::Error::other(self.message))
    }
}

/// A stream whose every read fails.
pub struct BrokenRead;

impl Read for BrokenRead {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away"))
    }
}

impl ByteStream for BrokenRead {}
