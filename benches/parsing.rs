use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lacon::{convert, from_str, parse_str, preprocess, to_string};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone)]
struct Service {
    name: String,
    port: u32,
    replicas: u32,
    tags: Vec<String>,
}

fn flat_document(size: usize) -> String {
    (0..size)
        .map(|i| format!("key_{} value number {}", i, i))
        .collect::<Vec<_>>()
        .join("\n")
}

fn nested_document(size: usize) -> String {
    let mut text = String::from("$region eu-west\n");
    for i in 0..size {
        text.push_str(&format!(
            "service_{i} {{\n  host \"svc-{i}.$region.internal\"\n  port {}\n  limits cpu=2 mem=512\n  tags [web, api, \"v{i}\"]\n}}\n",
            8000 + i
        ));
    }
    text
}

fn benchmark_parse_flat(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_flat");

    for size in [10, 100, 1000].iter() {
        let text = flat_document(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| parse_str(black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_parse_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_nested");

    for size in [10, 100, 500].iter() {
        let text = nested_document(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| parse_str(black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_emit_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit_expansion");

    for count in [16, 256, 4096].iter() {
        let text = format!(
            "<emit: 0x0 to +{} as local $id>\nreg_$id {{\n  addr @f(\"{{:08X(0x4000)}}\", 0x$id)\n  name \"register $id\"\n}}",
            count
        );
        group.bench_with_input(BenchmarkId::new("parse", count), &text, |b, text| {
            b.iter(|| parse_str(black_box(text)))
        });
        group.bench_with_input(BenchmarkId::new("preprocess", count), &text, |b, text| {
            b.iter(|| preprocess(black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_convert_to_json(c: &mut Criterion) {
    let text = nested_document(100);
    c.bench_function("convert_nested_100", |b| {
        b.iter(|| convert(black_box(&text), None))
    });
}

fn benchmark_roundtrip(c: &mut Criterion) {
    let services: Vec<Service> = (0..50)
        .map(|i| Service {
            name: format!("svc-{}", i),
            port: 8000 + i,
            replicas: i % 5 + 1,
            tags: vec!["web".to_string(), format!("v{}", i)],
        })
        .collect();

    #[derive(Serialize, Deserialize)]
    struct Fleet {
        services: Vec<Service>,
    }
    let fleet = Fleet { services };

    c.bench_function("roundtrip_fleet", |b| {
        b.iter(|| {
            let text = to_string(black_box(&fleet)).unwrap();
            let _back: Fleet = from_str(black_box(&text)).unwrap();
        })
    });
}

criterion_group!(
    benches,
    benchmark_parse_flat,
    benchmark_parse_nested,
    benchmark_emit_expansion,
    benchmark_convert_to_json,
    benchmark_roundtrip
);
criterion_main!(benches);
