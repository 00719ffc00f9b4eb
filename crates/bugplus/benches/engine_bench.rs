//! Instantiation and execution benchmarks.

use bugplus::stdlib::arithmetic_library;
use bugplus::translate::{bit_matrix_program, run_bit_positions};
use bugplus::EngineConfig;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

/// Instantiate composites of increasing nesting depth
fn bench_instantiate(c: &mut Criterion) {
    let library = arithmetic_library();
    let mut group = c.benchmark_group("instantiate");

    for id in ["++", "?+", "-", "*"] {
        group.bench_with_input(BenchmarkId::from_parameter(id), &id, |b, id| {
            b.iter(|| library.instantiate(black_box(id)).map(|p| p.graph().instance_count()));
        });
    }

    group.finish();
}

/// Run one case on an already built program
fn bench_step(c: &mut Criterion) {
    let library = arithmetic_library();
    let mut group = c.benchmark_group("step");

    for (id, inputs) in [("++", vec![41]), ("-", vec![20, 7]), ("max", vec![3, 9])] {
        group.bench_with_input(BenchmarkId::new(id, inputs.len()), &inputs, |b, inputs| {
            let Ok(mut program) = library.instantiate(id) else {
                return;
            };
            b.iter(|| {
                for (index, value) in inputs.iter().enumerate() {
                    let _ = program.set_input_value(index, *value);
                }
                program.step().map(|step| step.output)
            });
        });
    }

    group.finish();
}

/// Bit matrices with every node handing off to the next one
fn bench_bit_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("bit_chain");
    let config = EngineConfig::default();

    for n in [4, 16, 64] {
        let matrix: Vec<Vec<u8>> = (0..n)
            .map(|i| {
                let mut row = vec![0; 2 * n];
                if i > 0 {
                    row[2 * (i - 1) + 1] = 1;
                }
                row
            })
            .collect();
        let positions = vec![0; n];

        group.bench_with_input(BenchmarkId::new("build", n), &matrix, |b, matrix| {
            b.iter(|| bit_matrix_program(black_box(matrix), &config).is_ok());
        });
        group.bench_with_input(BenchmarkId::new("run", n), &matrix, |b, matrix| {
            b.iter(|| run_bit_positions(black_box(matrix), &positions, &config).is_ok());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_instantiate, bench_step, bench_bit_chain);
criterion_main!(benches);
