//! Lexer throughput benchmarks.
//!
//! Run with: `cargo bench --package tinyc-lex`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tinyc_lex::Lexer;

fn token_count(source: &str) -> usize {
    Lexer::new(source).analyze().tokens.len()
}

fn bench_lexer_keywords(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");

    let source = "int x = 42; while (x < 100) { x = x + 1; }";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("simple_decl", |b| {
        b.iter(|| token_count(black_box("int x = 42;")))
    });

    group.bench_function("while_loop", |b| b.iter(|| token_count(black_box(source))));

    group.finish();
}

fn bench_lexer_program(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_program");

    let source = r#"
        int fib(int n) {
            if (n <= 1) {
                return n;
            }
            int a = 0;
            int b = 1;
            for (int i = 2; i <= n; i = i + 1) {
                int tmp = a + b;
                a = b;
                b = tmp;
            }
            return b;
        }

        int main() {
            int i = 0;
            while (i < 10) {
                // print fib(i)
                i += 1;
            }
            return 0;
        }
    "#;

    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("fib_program", |b| b.iter(|| token_count(black_box(source))));

    group.finish();
}

fn bench_lexer_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_strings");

    group.bench_function("short_string", |b| {
        b.iter(|| token_count(black_box("\"hello\"")))
    });

    group.bench_function("long_string", |b| {
        let source = "\"This is a longer string literal used for benchmarking purposes.\"";
        b.iter(|| token_count(black_box(source)))
    });

    group.finish();
}

fn bench_lexer_numbers(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_numbers");

    group.bench_function("integer", |b| b.iter(|| token_count(black_box("123456"))));
    group.bench_function("real", |b| b.iter(|| token_count(black_box("3.14159"))));

    group.finish();
}

fn bench_lexer_identifiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_identifiers");

    group.bench_function("short_ident", |b| b.iter(|| token_count(black_box("x"))));
    group.bench_function("long_ident", |b| {
        b.iter(|| token_count(black_box("very_long_variable_name")))
    });
    group.bench_function("many_idents", |b| {
        b.iter(|| {
            token_count(black_box(
                "int a = 1; int b = 2; int c = 3; int d = 4; int e = 5;",
            ))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lexer_keywords,
    bench_lexer_program,
    bench_lexer_strings,
    bench_lexer_numbers,
    bench_lexer_identifiers
);
criterion_main!(benches);
