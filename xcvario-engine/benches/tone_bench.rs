//! Tone synthesis and circular read throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use xcvario_core::{AudioFormatSpec, VarioConfig};
use xcvario_engine::audio::ToneBuffer;
use xcvario_engine::TonePlanner;

fn bench_generate(c: &mut Criterion) {
    let format = AudioFormatSpec::default();
    let mut group = c.benchmark_group("tone_generate");

    for duration_ms in [50u64, 150, 480] {
        group.bench_with_input(BenchmarkId::from_parameter(duration_ms), &duration_ms, |b, &ms| {
            b.iter(|| ToneBuffer::generate(black_box(format), ms * 1_000, black_box(1_200)))
        });
    }
    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let tone = ToneBuffer::generate(AudioFormatSpec::default(), 100_000, 1_000).unwrap();
    let mut stream = tone.into_stream();
    let mut period = [0u8; 4_096];

    c.bench_function("tone_read_circular_4k", |b| {
        b.iter(|| stream.read_circular(black_box(&mut period)))
    });
}

fn bench_plan(c: &mut Criterion) {
    let planner = TonePlanner::new(AudioFormatSpec::default(), &VarioConfig::default())
        .unwrap();

    c.bench_function("beep_plan", |b| b.iter(|| planner.plan(black_box(2.7))));
}

criterion_group!(benches, bench_generate, bench_read, bench_plan);
criterion_main!(benches);
