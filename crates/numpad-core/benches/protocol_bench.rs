//! Criterion benchmarks for the per-keypress hot path.
//!
//! Every key press on the host decodes one JSON frame and parses one key
//! symbol; every admission and failure encodes one control payload.
//!
//! Run with:
//! ```bash
//! cargo bench --package numpad-core --bench protocol_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use numpad_core::{decode_key_message, encode_server_message, NumpadKey, ServerMessage};

// ── Frame fixtures ────────────────────────────────────────────────────────────

const DIGIT_FRAME: &str = r#"{"key":"5","type":"key","timestamp":1718000000000}"#;
const ENTER_FRAME: &str = r#"{"key":"enter","type":"key","timestamp":1718000000000}"#;
const NO_TIMESTAMP_FRAME: &str = r#"{"key":"+","type":"key"}"#;
const MALFORMED_FRAME: &str = r#"{"key":"5","type":"#;

fn bench_decode(c: &mut Criterion) {
    let frames: &[(&str, &str)] = &[
        ("digit", DIGIT_FRAME),
        ("enter", ENTER_FRAME),
        ("no_timestamp", NO_TIMESTAMP_FRAME),
        ("malformed", MALFORMED_FRAME),
    ];

    let mut group = c.benchmark_group("decode_key_message");
    for (name, frame) in frames {
        group.bench_with_input(BenchmarkId::new("frame", name), frame, |b, frame| {
            b.iter(|| decode_key_message(black_box(frame)))
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let payloads: &[(&str, ServerMessage)] = &[
        ("connected", ServerMessage::connected()),
        ("evicted", ServerMessage::evicted()),
        ("key_failed", ServerMessage::key_failed("x")),
    ];

    let mut group = c.benchmark_group("encode_server_message");
    for (name, msg) in payloads {
        group.bench_with_input(BenchmarkId::new("payload", name), msg, |b, msg| {
            b.iter(|| encode_server_message(black_box(msg)).unwrap())
        });
    }
    group.finish();
}

/// Decode plus symbol lookup: everything the host does before injection.
fn bench_decode_and_parse(c: &mut Criterion) {
    c.bench_function("decode_and_parse_key", |b| {
        b.iter(|| {
            let msg = decode_key_message(black_box(DIGIT_FRAME)).unwrap();
            NumpadKey::parse(&msg.key).unwrap()
        })
    });
}

criterion_group!(benches, bench_decode, bench_encode, bench_decode_and_parse);
criterion_main!(benches);
