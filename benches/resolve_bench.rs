//! Benchmarks for macro resolution and row decoding
//!
//! Run with: cargo bench

use chrono::{DateTime, Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use questframe::convert::{
    decode_rows, ColumnInfo, ConverterRegistry, MemoryCursor, UnknownColumnPolicy, WireValue,
};
use questframe::macros::{MacroRegistry, QueryContext};
use questframe::time::TimeRange;

fn create_context() -> QueryContext {
    let range =
        TimeRange::parse_rfc3339("2024-01-20T12:34:56.789Z", "2024-02-10T10:01:02.123Z").unwrap();
    QueryContext::new(range).with_interval(Duration::seconds(30))
}

fn create_cursor(rows: usize) -> MemoryCursor {
    let mut cursor = MemoryCursor::new(vec![
        ColumnInfo::new("ts", "TIMESTAMP"),
        ColumnInfo::new("value", "FLOAT8"),
        ColumnInfo::new("count", "INT2"),
        ColumnInfo::new("ok", "BOOL"),
    ]);

    let start: DateTime<Utc> = DateTime::from_timestamp_micros(1_705_754_096_789_000).unwrap();
    for i in 0..rows {
        let ts = start + Duration::seconds(i as i64);
        let value = (i % 7 != 0).then(|| WireValue::Float64(i as f64 * 0.5));
        cursor.push_row(vec![
            Some(WireValue::Timestamp(ts.into())),
            value,
            Some(WireValue::Int16((i % 100) as i16)),
            Some(WireValue::Bool(i % 2 == 0)),
        ]);
    }
    cursor
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let registry = MacroRegistry::standard();
    let ctx = create_context();

    let queries = [
        ("plain", "select * from trades where price > 10"),
        (
            "time_filter",
            "select * from trades where $__timeFilter(ts) and symbol = 'BTC-USD'",
        ),
        (
            "all_macros",
            "select ts, avg(price) from trades where ts between $__fromTime and $__toTime \
             and $__timeFilter(ts) sample by $__sampleByInterval",
        ),
    ];

    for (name, sql) in queries {
        group.bench_function(name, |b| {
            b.iter(|| registry.resolve(black_box(sql), &ctx).unwrap())
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let registry = ConverterRegistry::standard();

    for size in [100, 1000, 10000] {
        let cursor = create_cursor(size);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("rows_{}", size), |b| {
            b.iter(|| {
                let mut cursor = cursor.clone();
                decode_rows(black_box(&mut cursor), &registry, UnknownColumnPolicy::Fail).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolve, bench_decode);
criterion_main!(benches);
