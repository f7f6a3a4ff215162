use std::rc::Rc;

use brimstone_parser::js::{
    common::options::ParseOptions,
    parser::{ast::Program, parse_script, program_to_estree, source::Source},
};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

fn setup_step(file: &str) -> Rc<Source> {
    Rc::new(Source::new_from_file(&format!("benches/{}", file)).unwrap())
}

fn parse_step(source: Rc<Source>, options: &ParseOptions) -> (Rc<Source>, Program) {
    let program = parse_script(&source, options).unwrap();
    (source, program)
}

/// Benchmark parsing a file, and separately converting the parsed program to ESTree.
/// - Parse
/// - Print
fn bench_file_all_steps(c: &mut Criterion, file: &str, options: ParseOptions) {
    // Isolate parser phase
    c.bench_function(&format!("{} > parse", file), |b| {
        b.iter_batched(
            || setup_step(file),
            |source| parse_step(source, &options),
            BatchSize::PerIteration,
        )
    });

    // Isolate ESTree conversion phase
    c.bench_function(&format!("{} > estree", file), |b| {
        b.iter_batched(
            || parse_step(setup_step(file), &options),
            |(source, program)| {
                program_to_estree(&program, &source, options.record_source_locations)
            },
            BatchSize::PerIteration,
        )
    });
}

pub fn generator_benches(c: &mut Criterion) {
    bench_file_all_steps(c, "generators.js", ParseOptions::default());

    let strict_with_locations =
        ParseOptions { strict: true, record_source_locations: true, ..ParseOptions::default() };
    c.bench_function("generators.js > parse strict", |b| {
        b.iter_batched(
            || setup_step("generators.js"),
            |source| parse_step(source, &strict_with_locations),
            BatchSize::PerIteration,
        )
    });
}

criterion_group!(generators, generator_benches);
criterion_main!(generators);
