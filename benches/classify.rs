use criterion::{black_box, criterion_group, criterion_main, Criterion};
use streamblocks::classify::{assemble, to_canonical};
use streamblocks::LanguageHint;

fn synthetic_answer(paragraphs: usize) -> String {
    let mut out = String::new();
    for i in 0..paragraphs {
        out.push_str(&format!("## Section {i}\n"));
        out.push_str("Some explanatory prose that reads like a model answer.\n");
        out.push_str("- first point\n- second point\n");
        out.push_str("| Metric | Value |\n|---|---|\n| p50 | 12ms |\n| p99 | 40ms |\n");
        out.push_str(&format!("{i} + {i} = {}\n\n", i * 2));
    }
    out
}

fn bench_assemble(c: &mut Criterion) {
    let small = synthetic_answer(4);
    let large = synthetic_answer(64);

    c.bench_function("assemble_small", |b| {
        b.iter(|| assemble(black_box(&small), LanguageHint::Auto))
    });
    c.bench_function("assemble_large", |b| {
        b.iter(|| assemble(black_box(&large), LanguageHint::Auto))
    });

    // Streaming shape: reclassify every growing prefix of the buffer.
    c.bench_function("assemble_incremental", |b| {
        b.iter(|| {
            let mut buf = String::new();
            for chunk in small.as_bytes().chunks(64) {
                buf.push_str(std::str::from_utf8(chunk).unwrap_or(""));
                black_box(assemble(&buf, LanguageHint::Auto));
            }
        })
    });
}

fn bench_transcribe(c: &mut Criterion) {
    let exprs = [
        "sqrt(16) = 4",
        r"\frac{a}{b} + \alpha^2",
        "x_1 + x_2 = 10",
        "3^2 + 4^2 = 5^2",
    ];
    c.bench_function("to_canonical", |b| {
        b.iter(|| {
            for e in exprs {
                black_box(to_canonical(black_box(e)));
            }
        })
    });
}

criterion_group!(benches, bench_assemble, bench_transcribe);
criterion_main!(benches);
