//! Entry rendering benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use seglog_bench::{request_fields, request_logger};
use seglog_core::{render_text, Caller, Entry, Flags, JsonPrinter, Level, Printer, TextPrinter};
use seglog_sink::MemorySink;

const CALLER: Caller = Caller::new("crates/seglog_core/src/logger.rs", 120);

/// Benchmark text rendering under different flag sets.
fn bench_render_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_text");
    let fields = request_fields();

    for (label, flags) in [
        ("empty", Flags::empty()),
        ("std", Flags::STD),
        ("micro_long", Flags::DATE | Flags::MICROSECONDS | Flags::LONG_FILE),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(label), &flags, |b, &flags| {
            let caller = CALLER.with_function("seglog_core::logger");
            let mut buf = Vec::with_capacity(2048);
            b.iter(|| {
                let entry = Entry::capture(flags, Level::Info, "api", &fields, "request served", Some(caller));
                buf.clear();
                render_text(&mut buf, black_box(&entry));
                black_box(buf.len());
            });
        });
    }

    group.finish();
}

/// Benchmark the text and JSON printers end to end.
fn bench_printers(c: &mut Criterion) {
    let mut group = c.benchmark_group("printer");
    let fields = request_fields();
    let entry = Entry::capture(Flags::STD, Level::Warn, "api", &fields, "slow request", Some(CALLER));

    group.bench_function("text", |b| {
        let printer = TextPrinter::new();
        let sink = MemorySink::with_capacity(64 << 20);
        b.iter(|| {
            printer.print(black_box(&entry), &sink).unwrap();
            if sink.len() > 32 << 20 {
                sink.clear();
            }
        });
    });

    group.bench_function("json", |b| {
        let printer = JsonPrinter::new();
        let sink = MemorySink::with_capacity(64 << 20);
        b.iter(|| {
            printer.print(black_box(&entry), &sink).unwrap();
            if sink.len() > 32 << 20 {
                sink.clear();
            }
        });
    });

    group.finish();
}

/// Benchmark the logger level gate.
fn bench_level_gate(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_gate");
    let logger = request_logger(MemorySink::new(), Flags::STD).with_level(Level::Error);

    group.bench_function("suppressed", |b| {
        b.iter(|| {
            logger.debug(black_box("not rendered"));
        });
    });

    group.bench_function("enabled_check", |b| {
        b.iter(|| black_box(logger.enabled(black_box(Level::Info))));
    });

    group.finish();
}

criterion_group!(benches, bench_render_text, bench_printers, bench_level_gate);

criterion_main!(benches);
