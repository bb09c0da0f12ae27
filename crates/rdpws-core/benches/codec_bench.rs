//! Criterion benchmarks for the binary wire codec.
//!
//! Decode sits on the per-event input path (every mouse move from the
//! browser passes through it), so both directions are measured on single
//! frames and on a burst simulating a fast drag.
//!
//! Run with:
//! ```bash
//! cargo bench --package rdpws-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rdpws_core::protocol::messages::{OP_KEY_PRESS, OP_KEY_UPDOWN, OP_MOUSE};
use rdpws_core::protocol::{decode_input, encode_event, ServerEvent};

fn frame(words: &[u32]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(words.len() * 4);
    for w in words {
        buf.extend_from_slice(&w.to_le_bytes());
    }
    buf
}

// ── Benchmarks: inbound decode ───────────────────────────────────────────────

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_decode");

    let mouse = frame(&[OP_MOUSE, 0x0800, 640, 480]);
    let key_updown = frame(&[OP_KEY_UPDOWN, 1, 16]);
    let key_press = frame(&[OP_KEY_PRESS, 1, 0x41]);

    group.bench_function("mouse_single", |b| {
        b.iter(|| decode_input(black_box(&mouse)))
    });

    group.bench_function("key_updown_single", |b| {
        b.iter(|| decode_input(black_box(&key_updown)))
    });

    group.bench_function("key_press_single", |b| {
        b.iter(|| decode_input(black_box(&key_press)))
    });

    // A burst of 64 mouse frames approximates one second of pointer drag at
    // typical browser event rates.
    let burst: Vec<Vec<u8>> = (0..64u32)
        .map(|i| frame(&[OP_MOUSE, 0x0800, i * 3, i * 2]))
        .collect();
    group.bench_function("mouse_burst_64", |b| {
        b.iter(|| {
            burst
                .iter()
                .map(|f| decode_input(black_box(f)))
                .collect::<Vec<_>>()
        })
    });

    group.finish();
}

// ── Benchmarks: outbound encode ──────────────────────────────────────────────

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_encode");

    group.bench_function("pointer_new", |b| {
        b.iter(|| {
            encode_event(black_box(&ServerEvent::PointerNew {
                id: 7,
                hot_x: 3,
                hot_y: 5,
            }))
        })
    });

    group.bench_function("pointer_set", |b| {
        b.iter(|| encode_event(black_box(&ServerEvent::PointerSet { id: 7 })))
    });

    group.bench_function("pointer_set_default", |b| {
        b.iter(|| encode_event(black_box(&ServerEvent::PointerSetDefault)))
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_encode);
criterion_main!(benches);
