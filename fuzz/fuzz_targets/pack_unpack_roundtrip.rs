#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use mpk_decoder::Unpacker;
use mpk_encoder::pack;
use mpk_types::Value;

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    Nil,
    Bool(bool),
    UInt(u64),
    Int(i64),
    F64(u64),
    Str(String),
    Bin(Vec<u8>),
    Ext(i8, Vec<u8>),
    Array(Vec<FuzzValue>),
    Map(Vec<(FuzzValue, FuzzValue)>),
}

/// Build a `Value` in the form the decoder produces: integers normalised
/// by sign, floats from raw bits (NaN payloads compared bitwise).
fn to_value(fuzz: &FuzzValue, depth: usize) -> Value {
    if depth > 32 {
        return Value::Nil;
    }
    match fuzz {
        FuzzValue::Nil => Value::Nil,
        FuzzValue::Bool(b) => Value::Bool(*b),
        FuzzValue::UInt(n) => Value::UInt(*n),
        FuzzValue::Int(n) => Value::integer(*n),
        FuzzValue::F64(bits) => Value::F64(f64::from_bits(*bits)),
        FuzzValue::Str(s) => Value::from(s.as_str()),
        FuzzValue::Bin(b) => Value::Bin(b.clone()),
        FuzzValue::Ext(type_id, data) => Value::Ext {
            type_id: *type_id,
            data: data.clone(),
        },
        FuzzValue::Array(items) => {
            Value::Array(items.iter().map(|item| to_value(item, depth + 1)).collect())
        }
        FuzzValue::Map(entries) => Value::Map(
            entries
                .iter()
                .map(|(k, v)| (to_value(k, depth + 1), to_value(v, depth + 1)))
                .collect(),
        ),
    }
}

// Fuzz target: Packer -> Unpacker roundtrip.
//
// Packs an arbitrary value tree, cuts the bytes into two sources at an
// arbitrary point, and checks that the lazy sequence and the generic
// direct read both give back the same tree.
fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(fuzz) = FuzzValue::arbitrary(&mut u) else {
        return;
    };
    let Ok(cut) = u.arbitrary::<usize>() else {
        return;
    };
    let value = to_value(&fuzz, 0);
    let bytes = pack(&value).expect("packer rejected a valid value");

    let mut direct = Unpacker::from_bytes(bytes.clone());
    let decoded = direct.unpack_value().expect("direct read failed on packer output");
    assert!(decoded.identical(&value));

    let cut = cut % (bytes.len() + 1);
    let mut lazy = Unpacker::from_bytes(bytes[..cut].to_vec());
    lazy.feed_bytes(bytes[cut..].to_vec()).unwrap();
    let decoded = lazy
        .unpack_next()
        .expect("lazy read failed on packer output")
        .expect("lazy read found no value");
    assert!(decoded.identical(&value));
    assert!(lazy.unpack_next().unwrap().is_none());
});
