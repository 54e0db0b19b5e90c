//! VLQ Benchmark
//!
//! Measures the mappings codec on synthetic segment tables.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use unparse::source_map::to_relative;
use unparse::{Segment, decode_mappings, encode_mappings, vlq};

fn generate_groups(lines: usize, per_line: usize) -> Vec<Vec<Segment>> {
    (0..lines)
        .map(|line| {
            (0..per_line)
                .map(|i| {
                    let column = (i * 4) as i64;
                    let segment = Segment::new(column, 0, line as i64, column + 2);
                    if i % 3 == 0 {
                        segment.with_name((i % 7) as i64)
                    } else {
                        segment
                    }
                })
                .collect()
        })
        .collect()
}

fn bench_vlq_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("vlq_values");
    let values: Vec<i64> = (-512..512).collect();
    let encoded = vlq::encode_vlqs(&values);

    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("encode", |b| b.iter(|| black_box(vlq::encode_vlqs(black_box(&values)))));
    group.bench_function("decode", |b| b.iter(|| black_box(vlq::decode_vlqs(black_box(&encoded)))));

    group.finish();
}

fn bench_mappings(c: &mut Criterion) {
    let mut group = c.benchmark_group("vlq_mappings");

    for (lines, per_line) in [(100, 10), (1000, 10), (1000, 50)] {
        let groups = to_relative(&generate_groups(lines, per_line));
        let text = encode_mappings(&groups);
        let label = format!("{lines}x{per_line}");

        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", &label), &groups, |b, groups| {
            b.iter(|| black_box(encode_mappings(groups)))
        });
        group.bench_with_input(BenchmarkId::new("decode", &label), &text, |b, text| {
            b.iter(|| black_box(decode_mappings(text)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_vlq_values, bench_mappings);
criterion_main!(benches);
