//! Benchmarks for the MCAL alpha map codecs.
//!
//! Masks are decoded for every layer of every cell on load and re-encoded
//! whenever the resolution or compression changes, so each encoding is
//! measured on a mostly uniform mask (what painted terrain looks like) and on
//! noise (the worst case for run-length encoding).

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use wow_adt_edit::alpha::{self, AlphaEncoding, AlphaGrid};

const ENCODINGS: [(&str, AlphaEncoding); 4] = [
    ("high_res", AlphaEncoding::HighRes),
    ("compressed", AlphaEncoding::HighResCompressed),
    ("low_res", AlphaEncoding::LowRes),
    ("low_res_broken", AlphaEncoding::LowResBroken),
];

/// A brush stroke: opaque disc on a transparent background.
fn painted() -> AlphaGrid {
    let mut grid = AlphaGrid::default();
    for y in 0..64 {
        for x in 0..64 {
            let (dx, dy) = (x as i32 - 32, y as i32 - 32);
            if dx * dx + dy * dy < 400 {
                grid.set(x, y, 255);
            }
        }
    }
    grid
}

/// Pseudo-random samples from a fixed linear congruential sequence.
fn noise() -> AlphaGrid {
    let mut state: u32 = 0x1234_5678;
    let mut grid = AlphaGrid::default();
    for y in 0..64 {
        for x in 0..64 {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            grid.set(x, y, (state >> 24) as u8);
        }
    }
    grid
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("alpha_encode");
    group.throughput(Throughput::Elements(4096));

    for (grid_name, grid) in [("painted", painted()), ("noise", noise())] {
        for (name, encoding) in ENCODINGS {
            group.bench_with_input(
                BenchmarkId::new(name, grid_name),
                &grid,
                |b, grid| b.iter(|| alpha::encode(black_box(grid), encoding)),
            );
        }
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("alpha_decode");
    group.throughput(Throughput::Elements(4096));

    for (grid_name, grid) in [("painted", painted()), ("noise", noise())] {
        for (name, encoding) in ENCODINGS {
            let data = alpha::encode(&grid, encoding);
            group.bench_with_input(BenchmarkId::new(name, grid_name), &data, |b, data| {
                b.iter(|| alpha::decode(black_box(data), encoding).expect("decode failed"));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
