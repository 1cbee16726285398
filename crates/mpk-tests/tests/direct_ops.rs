//! Direct typed operation integration tests.
//!
//! Direct operations read exactly one item from the current source. They
//! never move on to a pending source, never consume anything when they
//! fail, and always clear the cached lazy value. These tests pin down
//! each of those rules against packed input.

use mpk_decoder::{Unpacker, UnpackerConfig, UnpackError};
use mpk_encoder::Packer;
use mpk_types::{Shape, TextEncoding, TypeError, Value};
use mpk_wire::WireError;

// ── Helpers ─────────────────────────────────────────────────────────────

fn packed(build: impl FnOnce(&mut Packer)) -> Vec<u8> {
    let mut packer = Packer::new();
    build(&mut packer);
    packer.finish().unwrap()
}

// ── Test 1: Each typed read returns its value ───────────────────────────

#[test]
fn typed_reads_in_sequence() {
    let bytes = packed(|p| {
        p.nil()
            .bool(true)
            .uint(300)
            .int(-70_000)
            .f32(1.5)
            .f64(-0.25)
            .str("héllo")
            .bin(&[1, 2, 3])
            .ext(7, &[9; 4])
            .array_header(3)
            .map_header(1);
    });
    let mut unpacker = Unpacker::from_bytes(bytes);

    unpacker.unpack_null().unwrap();
    assert!(unpacker.unpack_bool().unwrap());
    assert_eq!(unpacker.unpack_u64().unwrap(), 300);
    assert_eq!(unpacker.unpack_i64().unwrap(), -70_000);
    assert!((unpacker.unpack_f64().unwrap() - 1.5).abs() < f64::EPSILON);
    assert!((unpacker.unpack_f64().unwrap() + 0.25).abs() < f64::EPSILON);
    assert_eq!(unpacker.unpack_string().unwrap(), "héllo");
    assert_eq!(unpacker.unpack_raw().unwrap(), vec![1, 2, 3]);
    assert_eq!(unpacker.unpack_ext().unwrap(), (7, vec![9; 4]));
    assert_eq!(unpacker.unpack_array_length().unwrap(), 3);
    assert_eq!(unpacker.unpack_map_length().unwrap(), 1);
    assert_eq!(unpacker.buffered_len(), 0);
}

#[test]
fn raw_length_leaves_payload_for_the_caller() {
    let bytes = packed(|p| {
        p.str("abcd").uint(1);
    });
    let mut unpacker = Unpacker::from_bytes(bytes);

    assert_eq!(unpacker.unpack_raw_length().unwrap(), 4);
    assert_eq!(unpacker.buffered_len(), 5);
}

#[test]
fn integers_cross_sign_when_they_fit() {
    let bytes = packed(|p| {
        p.int(5).uint(9).int(-1).uint(u64::MAX);
    });
    let mut unpacker = Unpacker::from_bytes(bytes);

    assert_eq!(unpacker.unpack_u64().unwrap(), 5);
    assert_eq!(unpacker.unpack_i64().unwrap(), 9);

    let err = unpacker.unpack_u64().unwrap_err();
    assert!(matches!(
        err,
        UnpackError::Wire(WireError::IntegerOverflow { target: "u64" })
    ));
    assert_eq!(unpacker.unpack_i64().unwrap(), -1);

    assert!(unpacker.unpack_i64().is_err());
    assert_eq!(unpacker.unpack_u64().unwrap(), u64::MAX);
}

// ── Test 2: A mismatch reports both shapes and consumes nothing ────────

#[test]
fn mismatch_leaves_cursor_in_place() {
    let mut unpacker = Unpacker::from_bytes(vec![0x01u8]);

    let err = unpacker.unpack_bool().unwrap_err();
    assert!(
        matches!(
            err,
            UnpackError::TypeMismatch {
                expected: Shape::Boolean,
                found: "integer"
            }
        ),
        "got {err:?}"
    );
    assert_eq!(unpacker.unpack_u64().unwrap(), 1);
}

#[test]
fn try_unpack_null_only_takes_nil() {
    let mut unpacker = Unpacker::from_bytes(vec![0xC0u8, 0xC3]);

    assert!(unpacker.try_unpack_null().unwrap());
    assert!(!unpacker.try_unpack_null().unwrap());
    assert!(unpacker.unpack_bool().unwrap());
    assert!(!unpacker.try_unpack_null().unwrap());
}

#[test]
fn invalid_text_can_be_reread_in_another_encoding() {
    let mut unpacker = Unpacker::from_bytes(vec![0xA1u8, 0xE9]);

    let err = unpacker.unpack_string().unwrap_err();
    assert!(matches!(err, UnpackError::Text(TypeError::InvalidText { .. })));
    assert_eq!(unpacker.unpack_string_with(TextEncoding::Latin1).unwrap(), "é");
}

// ── Test 3: Direct reads stop at the current source ────────────────────

#[test]
fn pending_sources_are_never_consulted() {
    let mut unpacker = Unpacker::from_bytes(vec![0x01u8]);
    unpacker.feed_bytes(vec![0x02u8]).unwrap();

    assert_eq!(unpacker.unpack_u64().unwrap(), 1);
    let err = unpacker.unpack_u64().unwrap_err();
    assert!(
        matches!(err, UnpackError::Truncated { needed: 1, available: 0 }),
        "got {err:?}"
    );
    assert_eq!(unpacker.pending_sources(), 1);

    // The lazy sequence does move on.
    assert_eq!(unpacker.unpack_next().unwrap(), Some(Value::UInt(2)));
}

#[test]
fn truncated_value_is_completed_by_the_lazy_sequence() {
    // uint16 0x0102 split after its first payload byte.
    let mut unpacker = Unpacker::from_bytes(vec![0xCDu8, 0x01]);
    unpacker.feed_bytes(vec![0x02u8]).unwrap();

    let err = unpacker.unpack_u64().unwrap_err();
    assert!(
        matches!(err, UnpackError::Truncated { needed: 3, available: 2 }),
        "got {err:?}"
    );
    assert_eq!(unpacker.buffered_len(), 2);
    assert_eq!(unpacker.unpack_next().unwrap(), Some(Value::UInt(0x0102)));
}

#[test]
fn empty_unpacker_reports_truncation() {
    let mut unpacker = Unpacker::new();
    assert!(matches!(
        unpacker.unpack_value(),
        Err(UnpackError::Truncated { .. })
    ));
}

// ── Test 4: Direct reads invalidate the cached lazy value ──────────────

#[test]
fn every_direct_read_clears_last_value() {
    let mut unpacker = Unpacker::from_bytes(vec![0x01u8, 0x02, 0xC3]);

    unpacker.unpack_next().unwrap();
    assert_eq!(unpacker.last_value(), Some(&Value::UInt(1)));

    // A failed read clears it too.
    assert!(unpacker.unpack_bool().is_err());
    assert!(unpacker.last_value().is_none());

    unpacker.unpack_next().unwrap();
    assert!(unpacker.last_value().is_some());
    assert!(!unpacker.try_unpack_null().unwrap());
    assert!(unpacker.last_value().is_none());
}

#[test]
fn lazy_and_direct_share_one_cursor() {
    let bytes = packed(|p| {
        p.array_header(2).uint(1).str("x");
    });
    let mut unpacker = Unpacker::from_bytes(bytes);

    assert_eq!(unpacker.unpack_array_length().unwrap(), 2);
    assert_eq!(unpacker.unpack_next().unwrap(), Some(Value::UInt(1)));
    assert_eq!(unpacker.unpack_string().unwrap(), "x");
    assert!(unpacker.unpack_next().unwrap().is_none());
}

// ── Test 5: Limits apply to direct and generic reads alike ─────────────

#[test]
fn declared_length_over_limit_is_rejected() {
    let bytes = packed(|p| {
        p.bin(&[0; 16]);
    });
    let config = UnpackerConfig {
        max_length: 8,
        ..UnpackerConfig::default()
    };
    let mut unpacker = Unpacker::from_bytes(bytes).with_config(config).unwrap();

    let err = unpacker.unpack_raw().unwrap_err();
    assert!(matches!(
        err,
        UnpackError::Wire(WireError::LengthLimit { len: 16, limit: 8 })
    ));
}

#[test]
fn nesting_over_limit_is_rejected() {
    let bytes = packed(|p| {
        for _ in 0..10 {
            p.array_header(1);
        }
        p.nil();
    });
    let config = UnpackerConfig {
        max_depth: 3,
        ..UnpackerConfig::default()
    };
    let mut unpacker = Unpacker::from_bytes(bytes.clone()).with_config(config).unwrap();
    assert!(matches!(
        unpacker.unpack_value(),
        Err(UnpackError::Wire(WireError::DepthLimit { limit: 3 }))
    ));

    let mut unlimited = Unpacker::from_bytes(bytes);
    assert!(unlimited.unpack_value().is_ok());
}

#[test]
fn direct_reads_after_dispose_fail() {
    let mut unpacker = Unpacker::from_bytes(vec![0xC3u8]);
    unpacker.dispose().unwrap();
    assert!(matches!(unpacker.unpack_bool(), Err(UnpackError::Disposed)));
    assert!(matches!(unpacker.try_unpack_null(), Err(UnpackError::Disposed)));
}
