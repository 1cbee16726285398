use std::io::Cursor;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mpk_decoder::Unpacker;
use mpk_encoder::Packer;
use mpk_types::Value;

/// `count` small records, each a map of three fields.
fn records(count: u64) -> Vec<u8> {
    let mut packer = Packer::new();
    for i in 0..count {
        packer
            .map_header(3)
            .str("id")
            .uint(i)
            .str("name")
            .str("record")
            .str("tags")
            .array_header(2)
            .bool(i % 2 == 0)
            .nil();
    }
    packer.finish().unwrap()
}

fn bench_lazy(c: &mut Criterion) {
    let payload = records(1_000);
    let mut group = c.benchmark_group("lazy");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    group.bench_function("memory", |b| {
        b.iter(|| {
            let mut unpacker = Unpacker::from_bytes(payload.clone());
            unpacker.values().map(Result::unwrap).count()
        });
    });

    group.bench_function("stream", |b| {
        b.iter(|| {
            let mut unpacker = Unpacker::from_stream(Cursor::new(payload.as_slice()), false);
            unpacker.values().map(Result::unwrap).count()
        });
    });

    group.bench_function("byte_iter", |b| {
        b.iter(|| {
            let mut unpacker = Unpacker::from_byte_iter(payload.clone());
            unpacker.values().map(Result::unwrap).count()
        });
    });

    group.finish();
}

fn bench_chained(c: &mut Criterion) {
    let payload = records(1_000);
    let mut group = c.benchmark_group("chained");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for pieces in [1usize, 16, 256] {
        let chunk = payload.len().div_ceil(pieces);
        let parts: Vec<Vec<u8>> = payload.chunks(chunk).map(<[u8]>::to_vec).collect();
        group.bench_with_input(BenchmarkId::from_parameter(pieces), &parts, |b, parts| {
            b.iter(|| {
                let mut unpacker = Unpacker::new();
                for part in parts {
                    unpacker.feed_bytes(part.clone()).unwrap();
                }
                unpacker.values().map(Result::unwrap).count()
            });
        });
    }

    group.finish();
}

fn bench_direct(c: &mut Criterion) {
    let payload = records(1_000);

    c.bench_function("direct_typed", |b| {
        b.iter(|| {
            let mut unpacker = Unpacker::from_bytes(payload.clone());
            let mut ids = 0u64;
            for _ in 0..1_000 {
                unpacker.unpack_map_length().unwrap();
                unpacker.unpack_raw().unwrap();
                ids += unpacker.unpack_u64().unwrap();
                unpacker.unpack_raw().unwrap();
                unpacker.unpack_string().unwrap();
                unpacker.unpack_raw().unwrap();
                unpacker.unpack_array_length().unwrap();
                unpacker.unpack_bool().unwrap();
                unpacker.unpack_null().unwrap();
            }
            ids
        });
    });

    c.bench_function("direct_generic", |b| {
        b.iter(|| {
            let mut unpacker = Unpacker::from_bytes(payload.clone());
            (0..1_000)
                .map(|_| unpacker.unpack_value().unwrap())
                .filter(Value::is_nil)
                .count()
        });
    });
}

criterion_group!(benches, bench_lazy, bench_chained, bench_direct);
criterion_main!(benches);
