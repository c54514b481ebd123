//! Performance benchmarks for cstyle
//!
//! These benchmarks measure the key per-run costs:
//! - File discovery with the gitignore-aware walker
//! - Single-file evaluation at different file sizes
//! - Evaluation with most of the catalogue disabled (dispatch-table cost)
//! - A full multi-file run, sequential vs rayon
//!
//! Run all of them with `cargo bench`, or a single group with e.g.
//! `cargo bench file_discovery`.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use cstyle::config::{self, Patch, Settings};
use cstyle::engine::{Evaluator, discover_files};
use cstyle::format::{FormatChecker, FormatOutcome};
use cstyle::rules::Registry;
use cstyle::types::Language;
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

struct NoFormatter;

impl FormatChecker for NoFormatter {
    fn check(&self, _path: &Path, _language: Language) -> FormatOutcome {
        FormatOutcome::Compliant
    }
}

/// C source with `functions` short function definitions
fn c_source(functions: usize) -> String {
    let mut source = String::new();
    for i in 0..functions {
        source.push_str(&format!(
            "static int calc{i}(int a, int b)\n{{\n    int sum = a + b;\n    if (sum > 100)\n    {{\n        sum = 100;\n    }}\n    return sum;\n}}\n\n"
        ));
    }
    source.push_str("int main(void)\n{\n    return calc0(1, 2);\n}\n");
    source
}

fn create_project(files: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..files {
        fs::write(temp_dir.path().join(format!("mod{i}.c")), c_source(5)).unwrap();
    }
    temp_dir
}

fn default_evaluator() -> Evaluator<'static> {
    let registry = Registry::builtin();
    let settings = Settings::defaults(registry);
    Evaluator::new(registry, &settings, Box::new(NoFormatter))
}

fn bench_file_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_discovery");

    for file_count in [10, 100, 500] {
        let project = create_project(file_count);
        group.throughput(Throughput::Elements(file_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(file_count),
            &file_count,
            |b, _| {
                b.iter(|| {
                    let files = discover_files(&[project.path().to_path_buf()]).unwrap();
                    black_box(files)
                });
            },
        );
    }

    group.finish();
}

fn bench_single_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_file");
    let evaluator = default_evaluator();

    for functions in [5, 50, 250] {
        let source = c_source(functions);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(functions),
            &source,
            |b, source| {
                b.iter(|| {
                    let report = evaluator.evaluate(Path::new("bench.c"), source, Language::C);
                    black_box(report)
                });
            },
        );
    }

    group.finish();
}

/// Disabling rules should shrink per-file cost, not just suppress output
fn bench_mostly_disabled(c: &mut Criterion) {
    let registry = Registry::builtin();
    let mut patch = Patch::default();
    for (id, _) in registry.entries() {
        if id.as_str() != "keyword.goto" {
            patch.rules.insert(id.as_str().to_string(), false);
        }
    }
    let settings = config::resolve(registry, None, None, Some(&patch)).unwrap();
    let evaluator = Evaluator::new(registry, &settings, Box::new(NoFormatter));
    let source = c_source(50);

    c.bench_function("mostly_disabled", |b| {
        b.iter(|| {
            let report = evaluator.evaluate(Path::new("bench.c"), &source, Language::C);
            black_box(report)
        });
    });
}

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");
    group.sample_size(20);

    let project = create_project(50);
    let files = discover_files(&[project.path().to_path_buf()]).unwrap();
    let evaluator = default_evaluator();

    group.bench_function("sequential", |b| {
        b.iter(|| {
            let reports: Vec<_> = files
                .iter()
                .map(|file| {
                    let source = fs::read_to_string(&file.path).unwrap();
                    evaluator.evaluate(&file.path, &source, file.language)
                })
                .collect();
            black_box(reports)
        });
    });

    group.bench_function("parallel", |b| {
        b.iter(|| {
            let reports: Vec<_> = files
                .par_iter()
                .map(|file| {
                    let source = fs::read_to_string(&file.path).unwrap();
                    evaluator.evaluate(&file.path, &source, file.language)
                })
                .collect();
            black_box(reports)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_file_discovery,
    bench_single_file,
    bench_mostly_disabled,
    bench_full_run
);
criterion_main!(benches);
