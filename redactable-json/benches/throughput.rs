//! Criterion benchmarks for document redaction.
//!
//! Compares a reused `Session` against building a fresh pipeline per document,
//! over a small flat document and a larger one with redacted subtrees.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use redactable_json::{RedactConfig, Redactor};

fn flat_document() -> String {
    r#"{"first_name":"Alice","last_name":"Smith","age":30,"email":"alice@example.com","active":true}"#
        .to_owned()
}

fn nested_document() -> String {
    let record = r#"{"id":1,"first_name":"Bob","contact":{"phone":"555-0100","tags":["a","b","c"]},"scores":[1.5,2.25,-3,4294967296],"address":{"city":"X","first_name":"Bob"}}"#;
    let records = vec![record; 200].join(",");
    format!(r#"{{"records":[{records}],"count":200}}"#)
}

fn bench_redact(c: &mut Criterion) {
    let redactor = Redactor::new(
        RedactConfig::from_keys(["first_name", "last_name", "contact"]).with_substitute("ass"),
    );

    let mut group = c.benchmark_group("redact");
    for (name, document) in [("flat", flat_document()), ("nested", nested_document())] {
        group.throughput(Throughput::Bytes(document.len() as u64));

        group.bench_with_input(BenchmarkId::new("fresh", name), &document, |b, input| {
            b.iter(|| {
                let output = redactor
                    .redact_str(black_box(input))
                    .expect("document should redact");
                black_box(output);
            });
        });

        group.bench_with_input(BenchmarkId::new("session", name), &document, |b, input| {
            let mut session = redactor.session();
            b.iter(|| {
                let output = session
                    .redact(black_box(input))
                    .expect("document should redact");
                black_box(output.len());
            });
        });
    }
    group.finish();
}

fn bench_passthrough(c: &mut Criterion) {
    let redactor = Redactor::default();
    let document = nested_document();

    c.bench_function("redact/passthrough_nested", |b| {
        let mut session = redactor.session();
        b.iter(|| {
            let output = session
                .redact(black_box(&document))
                .expect("document should redact");
            black_box(output.len());
        });
    });
}

criterion_group!(benches, bench_redact, bench_passthrough);
criterion_main!(benches);
