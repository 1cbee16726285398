//! Ownership-aware disposal integration tests.
//!
//! The unpacker releases exactly the streams it was told it owns: when
//! the lazy sequence moves past them, or at disposal. Borrowed streams
//! are left alone and stay usable. Release failures never stop the
//! remaining releases; they are reported together, tagged with the
//! feed-order position of the source that failed.

use std::io::{Cursor, Read};

use mpk_decoder::{Unpacker, UnpackError};
use mpk_tests::{BrokenRead, FailingRelease, TrackedStream};
use mpk_types::Value;

// ── Helpers ─────────────────────────────────────────────────────────────

fn failed_ids(err: UnpackError) -> Vec<usize> {
    match err {
        UnpackError::Release { failures } => failures.iter().map(|f| f.source_id).collect(),
        other => panic!("expected a release error, got {other:?}"),
    }
}

// ── Test 1: Only owned streams are released ─────────────────────────────

#[test]
fn dispose_releases_owned_streams_only() {
    let (owned, owned_probe) = TrackedStream::new(vec![0x01u8]);
    let (borrowed, borrowed_probe) = TrackedStream::new(vec![0x02u8]);

    let mut unpacker = Unpacker::from_stream(owned, true);
    unpacker.feed_stream(borrowed, false).unwrap();
    unpacker.dispose().unwrap();

    assert_eq!(owned_probe.release_count(), 1);
    assert!(!borrowed_probe.released());
}

#[test]
fn pending_owned_streams_are_released_unread() {
    let (stream, probe) = TrackedStream::new(vec![0x01u8]);
    let mut unpacker = Unpacker::from_bytes(vec![0x00u8]);
    unpacker.feed_stream(stream, true).unwrap();

    unpacker.dispose().unwrap();
    assert!(probe.released());
    assert_eq!(probe.reads(), 0);
}

#[test]
fn advancing_releases_the_exhausted_source() {
    let (first, first_probe) = TrackedStream::new(vec![0x01u8]);
    let (second, second_probe) = TrackedStream::new(vec![0x02u8]);

    let mut unpacker = Unpacker::from_stream(first, true);
    unpacker.feed_stream(second, true).unwrap();

    assert_eq!(unpacker.unpack_next().unwrap(), Some(Value::UInt(1)));
    assert!(!first_probe.released());

    assert_eq!(unpacker.unpack_next().unwrap(), Some(Value::UInt(2)));
    assert!(first_probe.released());
    assert!(!second_probe.released());

    unpacker.dispose().unwrap();
    assert_eq!(first_probe.release_count(), 1);
    assert_eq!(second_probe.release_count(), 1);
}

#[test]
fn dropping_the_unpacker_disposes_it() {
    let (stream, probe) = TrackedStream::new(vec![0x01u8]);
    {
        let _unpacker = Unpacker::from_stream(stream, true);
    }
    assert!(probe.released());
}

// ── Test 2: Borrowed streams remain usable ──────────────────────────────

#[test]
fn borrowed_stream_is_usable_after_dispose() {
    let mut cursor = Cursor::new(vec![0x01u8, 0x02, 0x03]);
    {
        let mut unpacker = Unpacker::from_stream(&mut cursor, false);
        assert_eq!(unpacker.unpack_u64().unwrap(), 1);
        unpacker.dispose().unwrap();
    }

    let mut rest = Vec::new();
    cursor.read_to_end(&mut rest).unwrap();
    assert_eq!(rest, vec![0x02, 0x03]);
}

// ── Test 3: Failures are aggregated, in feed order ──────────────────────

#[test]
fn every_owned_stream_is_attempted() {
    let (tail, tail_probe) = TrackedStream::new(Vec::<u8>::new());

    let mut unpacker = Unpacker::from_bytes(vec![0x01u8]);
    unpacker.feed_stream(FailingRelease::new(Vec::<u8>::new(), "first"), true).unwrap();
    unpacker.feed_stream(FailingRelease::new(Vec::<u8>::new(), "not ours"), false).unwrap();
    unpacker.feed_stream(FailingRelease::new(Vec::<u8>::new(), "third"), true).unwrap();
    unpacker.feed_stream(tail, true).unwrap();

    let err = unpacker.dispose().unwrap_err();
    assert_eq!(failed_ids(err), vec![1, 3]);
    assert!(tail_probe.released());
}

#[test]
fn failures_while_advancing_are_reported_at_dispose() {
    let mut unpacker = Unpacker::from_stream(FailingRelease::new(vec![0x01u8], "closed twice"), true);
    unpacker.feed_bytes(vec![0x02u8]).unwrap();

    let values: Vec<Value> = unpacker.values().map(Result::unwrap).collect();
    assert_eq!(values, vec![Value::UInt(1), Value::UInt(2)]);

    let err = unpacker.dispose().unwrap_err();
    let UnpackError::Release { failures } = err else {
        panic!("expected a release error");
    };
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].source_id, 0);
    assert_eq!(failures[0].error.to_string(), "closed twice");
}

#[test]
fn release_error_message_lists_the_count() {
    let mut unpacker = Unpacker::from_stream(FailingRelease::new(Vec::<u8>::new(), "a"), true);
    unpacker.feed_stream(FailingRelease::new(Vec::<u8>::new(), "b"), true).unwrap();

    let err = unpacker.dispose().unwrap_err();
    assert_eq!(err.to_string(), "failed to release 2 owned stream(s)");
}

// ── Test 4: Disposal is final and idempotent ────────────────────────────

#[test]
fn second_dispose_is_a_no_op() {
    let (stream, probe) = TrackedStream::new(vec![0x01u8]);
    let mut unpacker = Unpacker::from_stream(stream, true);

    unpacker.dispose().unwrap();
    unpacker.dispose().unwrap();
    assert_eq!(probe.release_count(), 1);
    assert!(unpacker.is_disposed());
}

#[test]
fn second_dispose_does_not_repeat_failures() {
    let mut unpacker = Unpacker::from_stream(FailingRelease::new(Vec::<u8>::new(), "x"), true);
    assert!(unpacker.dispose().is_err());
    assert!(unpacker.dispose().is_ok());
}

#[test]
fn queries_report_an_empty_unpacker_after_dispose() {
    let mut unpacker = Unpacker::from_bytes(vec![0x01u8, 0xCD]);
    unpacker.feed_bytes(vec![0x02u8]).unwrap();
    unpacker.unpack_next().unwrap();
    assert_eq!(unpacker.pending_sources(), 1);
    assert_eq!(unpacker.buffered_len(), 1);

    unpacker.dispose().unwrap();
    assert!(unpacker.is_disposed());
    assert!(unpacker.last_value().is_none());
    assert_eq!(unpacker.pending_sources(), 0);
    assert_eq!(unpacker.buffered_len(), 0);
}

#[test]
fn dispose_clears_last_value() {
    let mut unpacker = Unpacker::from_bytes(vec![0x01u8]);
    unpacker.unpack_next().unwrap();
    unpacker.dispose().unwrap();
    assert!(unpacker.last_value().is_none());
}

// ── Test 5: Read failures surface as I/O errors ─────────────────────────

#[test]
fn broken_stream_is_an_io_error() {
    let mut unpacker = Unpacker::from_bytes(vec![0x01u8]);
    unpacker.feed_stream(BrokenRead, true).unwrap();

    assert_eq!(unpacker.unpack_next().unwrap(), Some(Value::UInt(1)));
    assert!(matches!(unpacker.unpack_next(), Err(UnpackError::Io(_))));
    unpacker.dispose().unwrap();
}
