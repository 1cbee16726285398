#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use mpk_decoder::{Unpacker, UnpackerConfig};
use mpk_types::TextEncoding;

#[derive(Debug, Arbitrary)]
enum Op {
    ArrayLength,
    MapLength,
    RawLength,
    Null,
    TryNull,
    Bool,
    Raw,
    Str,
    Latin1,
    Value,
    U64,
    I64,
    F64,
    Ext,
    Next,
    Feed(Vec<u8>),
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    first: Vec<u8>,
    ops: Vec<Op>,
}

// Fuzz target: arbitrary interleavings of direct and lazy reads.
//
// Direct reads must never consume input when they fail, and must always
// leave the cached lazy value cleared.
fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(input) = FuzzInput::arbitrary(&mut u) else {
        return;
    };
    let config = UnpackerConfig {
        max_length: 1 << 16,
        max_depth: 64,
        ..UnpackerConfig::default()
    };
    let mut unpacker = Unpacker::from_bytes(input.first).with_config(config).unwrap();

    for op in input.ops.into_iter().take(64) {
        let before = unpacker.buffered_len();
        let failed = match op {
            Op::ArrayLength => unpacker.unpack_array_length().is_err(),
            Op::MapLength => unpacker.unpack_map_length().is_err(),
            Op::RawLength => unpacker.unpack_raw_length().is_err(),
            Op::Null => unpacker.unpack_null().is_err(),
            Op::TryNull => unpacker.try_unpack_null().is_err(),
            Op::Bool => unpacker.unpack_bool().is_err(),
            Op::Raw => unpacker.unpack_raw().is_err(),
            Op::Str => unpacker.unpack_string().is_err(),
            Op::Latin1 => unpacker.unpack_string_with(TextEncoding::Latin1).is_err(),
            Op::Value => unpacker.unpack_value().is_err(),
            Op::U64 => unpacker.unpack_u64().is_err(),
            Op::I64 => unpacker.unpack_i64().is_err(),
            Op::F64 => unpacker.unpack_f64().is_err(),
            Op::Ext => unpacker.unpack_ext().is_err(),
            Op::Next => {
                let _ = unpacker.unpack_next();
                continue;
            }
            Op::Feed(bytes) => {
                unpacker.feed_bytes(bytes).unwrap();
                continue;
            }
        };
        if failed {
            assert_eq!(unpacker.buffered_len(), before, "failed read consumed input");
        }
        assert!(unpacker.last_value().is_none());
    }

    unpacker.dispose().unwrap();
});
