//! Benchmarks for bidi resolution and itemization.
//!
//! Run with: cargo bench -p skein-text --bench bidi_bench
//!
//! Workloads:
//! - **latin**: pure LTR text that takes the short-circuit path.
//! - **mixed**: Latin with embedded Hebrew words and digits.
//! - **arabic**: RTL paragraph with numbers and brackets.
//! - **nested**: isolates and embeddings nested a few levels deep.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use skein_text::TextEngine;
use skein_text::reorder::reorder_visual;
use std::hint::black_box;

// ── Workload Generators ─────────────────────────────────────────────────

fn latin(words: usize) -> String {
    (0..words).map(|i| format!("word{i} ")).collect()
}

fn mixed(words: usize) -> String {
    (0..words)
        .map(|i| match i % 4 {
            0 => "\u{05E9}\u{05DC}\u{05D5}\u{05DD} ".to_string(),
            1 => format!("{i} "),
            _ => "text ".to_string(),
        })
        .collect()
}

fn arabic(words: usize) -> String {
    (0..words)
        .map(|i| match i % 3 {
            0 => "\u{0633}\u{0644}\u{0627}\u{0645} ".to_string(),
            1 => format!("({i}) "),
            _ => "\u{0643}\u{062A}\u{0627}\u{0628} ".to_string(),
        })
        .collect()
}

fn nested(words: usize) -> String {
    (0..words)
        .map(|i| match i % 5 {
            0 => "\u{2067}\u{05D0} ".to_string(),
            1 => "\u{202A}b ".to_string(),
            2 => "\u{202C}\u{2069} ".to_string(),
            _ => "c ".to_string(),
        })
        .collect()
}

// ── Benchmark Functions ─────────────────────────────────────────────────

fn bench_itemize(c: &mut Criterion) {
    let mut group = c.benchmark_group("bidi/itemize");
    for (name, make) in [
        ("latin", latin as fn(usize) -> String),
        ("mixed", mixed),
        ("arabic", arabic),
        ("nested", nested),
    ] {
        for words in [50, 500] {
            let text = make(words);
            group.throughput(Throughput::Elements(text.chars().count() as u64));
            group.bench_with_input(BenchmarkId::new(name, words), &text, |b, text| {
                b.iter(|| {
                    let mut engine = TextEngine::new(black_box(text));
                    engine.itemize();
                    black_box(engine.items().len())
                });
            });
        }
    }
    group.finish();
}

fn bench_reorder(c: &mut Criterion) {
    let mut group = c.benchmark_group("bidi/reorder");
    for words in [50, 500] {
        let mut engine = TextEngine::new(&nested(words));
        engine.itemize();
        let levels = engine.levels();
        group.bench_with_input(BenchmarkId::new("nested", words), &levels, |b, levels| {
            b.iter(|| black_box(reorder_visual(black_box(levels))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_itemize, bench_reorder);
criterion_main!(benches);
