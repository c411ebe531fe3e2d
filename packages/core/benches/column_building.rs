//! Benchmarks for the pure rebuild path
//!
//! Run with: `cargo bench -p docgrid-core`
//!
//! Every refresh re-normalizes the full result set and rebuilds every
//! column, so both have to stay cheap for large categories.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use docgrid_core::models::{Document, FieldSchema, FieldTypeDeclaration, PageRef};
use docgrid_core::services::{ColumnBuilder, RecordNormalizer};
use docgrid_core::BindingConfig;
use serde_json::json;
use std::sync::Arc;

/// N documents with a handful of overlapping properties
fn generate_documents(count: usize) -> Vec<Document> {
    let page = PageRef::new("page-bench", "Book");
    (0..count)
        .map(|i| {
            let mut properties = json!({
                "is": "[[Book]]",
                "status": if i % 2 == 0 { "Open" } else { "Closed" },
                "pages": i * 10,
            });
            properties[format!("extra{}", i % 20)] = json!("x");
            Document::new(
                format!("Book {}\nis:: [[Book]]", i),
                properties,
                Some(page.clone()),
            )
        })
        .collect()
}

fn bench_schema() -> FieldSchema {
    let mut schema = FieldSchema::new();
    schema.insert("status".into(), FieldTypeDeclaration::parse("select(Open;Closed)"));
    schema.insert("pages".into(), FieldTypeDeclaration::parse("number"));
    schema.insert("author".into(), FieldTypeDeclaration::parse("reference(Person)"));
    schema
}

fn bench_normalize(c: &mut Criterion) {
    let documents = generate_documents(1000);
    let normalizer = RecordNormalizer::new();

    c.bench_function("normalize_1000_documents", |b| {
        b.iter(|| black_box(normalizer.normalize(black_box(&documents))))
    });
}

fn bench_build_columns(c: &mut Criterion) {
    let rows = RecordNormalizer::new().normalize(&generate_documents(1000));
    let schema = bench_schema();
    let builder = ColumnBuilder::new(Arc::new(BindingConfig::default()));

    let mut group = c.benchmark_group("build_columns");
    group.bench_function("1000_rows", |b| {
        b.iter(|| black_box(builder.build_columns(black_box(&rows), black_box(&schema))))
    });
    group.bench_function("schema_only", |b| {
        b.iter(|| black_box(builder.build_columns(&[], black_box(&schema))))
    });
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_build_columns);
criterion_main!(benches);
