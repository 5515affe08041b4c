use std::io::{self, Cursor};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mftp::transfer;
use rand::prelude::*;

fn transfer_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("transfer");

    for size in [1024usize, 64 * 1024, 4 * 1024 * 1024] {
        let mut payload = vec![0u8; size];
        rand::thread_rng().fill_bytes(&mut payload);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("to_sink", size), &payload, |b, payload| {
            b.iter(|| {
                let mut source = Cursor::new(payload.as_slice());
                transfer(&mut source, &mut io::sink(), payload.len() as u64).unwrap();
            });
        });
        group.bench_with_input(BenchmarkId::new("to_vec", size), &payload, |b, payload| {
            b.iter_batched(
                || Vec::with_capacity(payload.len()),
                |mut sink| {
                    let mut source = Cursor::new(payload.as_slice());
                    transfer(&mut source, &mut sink, payload.len() as u64).unwrap();
                    sink
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, transfer_bench);
criterion_main!(benches);
