//! Rotating writer benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use seglog_bench::{payload, request_logger};
use seglog_core::Flags;
use seglog_sink::{RotatingFileWriter, Sink, WriterConfig, MIN_ROTATE_SIZE};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

/// Benchmark raw writes, including size rotation.
fn bench_rotating_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("rotating_write");

    for size in [64, 256, 1024, 4096] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let dir = TempDir::new().unwrap();
            let config = WriterConfig::new()
                .max_size(MIN_ROTATE_SIZE * 8)
                .latest_link(false);
            let writer = RotatingFileWriter::open(dir.path(), config).unwrap();
            let data = payload(size);

            b.iter(|| {
                writer.write_all(black_box(&data)).unwrap();
            });
            writer.drain();
        });
    }

    group.finish();
}

/// Benchmark full records through a logger into the rotating writer.
fn bench_logger_to_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("logger_to_file");
    group.sample_size(50);

    for (label, flags) in [("plain", Flags::empty()), ("std", Flags::STD)] {
        group.bench_function(label, |b| {
            let dir = TempDir::new().unwrap();
            let writer = Arc::new(RotatingFileWriter::open(dir.path(), WriterConfig::new()).unwrap());
            let logger = request_logger(writer.clone(), flags);

            b.iter(|| {
                logger.info(black_box("request served"));
            });
            writer.drain();
        });
    }

    group.finish();
}

/// Benchmark contended writes from several threads.
fn bench_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended");
    group.sample_size(20);

    for threads in [2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            let dir = TempDir::new().unwrap();
            let writer = Arc::new(RotatingFileWriter::open(dir.path(), WriterConfig::new()).unwrap());
            let logger = request_logger(writer.clone(), Flags::empty());

            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let logger = logger.clone();
                        thread::spawn(move || {
                            for _ in 0..1000 {
                                logger.info("contended record");
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            });
            writer.drain();
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rotating_write, bench_logger_to_file, bench_contended);

criterion_main!(benches);
