//! Report stream decoding benchmarks
//!
//! Run with: `cargo bench --bench stream_parse -p ultipro-core`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ultipro_core::{parse_report, parse_report_stream, unescape};

/// Escaped report text as returned in `ReportStream`.
fn escaped_report(rows: usize) -> String {
    let mut text = String::from(r"EmployeeNumber,FirstName,LastName,City,HireDate\r\n");
    for idx in 0..rows {
        text.push_str(&format!(
            r"{idx:06},Jos\xe9,O\'Neil,S\xe3o Paulo,2020-01-{:02}\r\n",
            idx % 28 + 1
        ));
    }
    text
}

fn bench_unescape(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_unescape");

    for rows in [100usize, 10_000] {
        let text = escaped_report(rows);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &text, |b, text| {
            b.iter(|| black_box(unescape(text)));
        });
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_parse");

    for rows in [100usize, 10_000] {
        let escaped = escaped_report(rows);
        let decoded = unescape(&escaped);
        group.throughput(Throughput::Elements(rows as u64));

        group.bench_with_input(BenchmarkId::new("decoded_text", rows), &decoded, |b, text| {
            b.iter(|| black_box(parse_report(text, ',').expect("parsable report")));
        });
        group.bench_with_input(BenchmarkId::new("raw_stream", rows), &escaped, |b, raw| {
            b.iter(|| black_box(parse_report_stream(raw.as_bytes(), ',').expect("parsable report")));
        });
    }

    group.finish();
}

criterion_group!(stream, bench_unescape, bench_parse);
criterion_main!(stream);
