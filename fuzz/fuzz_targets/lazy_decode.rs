#![no_main]

use libfuzzer_sys::fuzz_target;
use mpk_decoder::{Unpacker, UnpackerConfig};

// Fuzz target: lazy sequence over arbitrary bytes, whole and split.
//
// The first byte picks a cut point. The remaining bytes are decoded once
// from a single source and once cut into two chained sources.
// Catches bugs in:
// - Marker dispatch and length prefix parsing
// - Length and depth limits on hostile input
// - Carry-over of a partial value across a source boundary
// - Tail detection when the data ends mid-value
//
// Whenever the single-source decode succeeds, the chained decode must
// yield exactly the same values (floats compared bit for bit).
fuzz_target!(|data: &[u8]| {
    let Some((&cut, body)) = data.split_first() else {
        return;
    };
    let config = UnpackerConfig {
        max_length: 1 << 16,
        max_depth: 64,
        ..UnpackerConfig::default()
    };

    let whole = {
        let mut unpacker = Unpacker::from_bytes(body.to_vec()).with_config(config).unwrap();
        unpacker.values().collect::<Result<Vec<_>, _>>()
    };

    let cut = usize::from(cut).min(body.len());
    let mut unpacker = Unpacker::from_bytes(body[..cut].to_vec()).with_config(config).unwrap();
    unpacker.feed_bytes(body[cut..].to_vec()).unwrap();
    let split = unpacker.values().collect::<Result<Vec<_>, _>>();

    if let Ok(expected) = whole {
        let split = split.unwrap_or_else(|e| panic!("split at {cut} failed: {e}"));
        assert!(
            split.len() == expected.len() && split.iter().zip(&expected).all(|(a, b)| a.identical(b)),
            "split at {cut} changed the sequence"
        );
    }
});
