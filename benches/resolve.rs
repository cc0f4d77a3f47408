use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use serde_json::{json, Map, Value};

use crossfoot::{CalcVersion, FactId, Report, ResolvedCalculation};

fn fact_json(concept: &str, value: i64) -> Value {
    json!({
        "a": {
            "c": concept,
            "e": "eg:acme",
            "p": "2024-01-01/2025-01-01",
            "u": "iso4217:USD",
        },
        "v": value.to_string(),
        "d": 0,
    })
}

fn report_json(contributors: usize, elr_count: usize) -> Value {
    let mut concepts = Map::new();
    concepts.insert(
        "eg:Total".to_owned(),
        json!({"labels": {"std": {"en": "Total"}}}),
    );
    let mut facts = Map::new();
    facts.insert(
        "total".to_owned(),
        fact_json("eg:Total", 100 * contributors as i64),
    );
    for i in 0..contributors {
        concepts.insert(
            format!("eg:Item{i}"),
            json!({"labels": {"std": {"en": format!("Item {i}")}}}),
        );
        facts.insert(format!("item{i}"), fact_json(&format!("eg:Item{i}"), 100));
    }

    // Group k links the total to a prefix of the contributors, so later
    // groups explain more of the fact set than earlier ones.
    let mut elrs = Map::new();
    for k in 0..elr_count {
        let covered = (k + 1) * contributors / elr_count;
        let arcs: Vec<Value> = (0..covered)
            .map(|i| json!({"t": format!("eg:Item{i}"), "w": 1}))
            .collect();
        elrs.insert(format!("group{k}"), json!({"eg:Total": arcs}));
    }

    json!({
        "prefixes": {
            "eg": "http://example.com/entity",
            "iso4217": "http://www.xbrl.org/2003/iso4217",
        },
        "concepts": concepts,
        "facts": facts,
        "rels": { "calc": elrs.clone(), "calc11": elrs },
    })
}

fn make_report(contributors: usize, elr_count: usize) -> Report {
    Report::parse(&report_json(contributors, elr_count).to_string()).unwrap()
}

fn bench_parse_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for size in [16usize, 256] {
        let text = report_json(size, 1).to_string();
        group.throughput(Throughput::Elements(size as u64 + 1));
        group.bench_function(format!("{size}_contributors"), |b| {
            b.iter(|| Report::parse(&text).unwrap());
        });
    }
    group.finish();
}

fn bench_resolve_verdicts(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    for size in [8usize, 64, 256] {
        let report = make_report(size, 1);
        let total = report.fact("total").unwrap();
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("v11_verdict_{size}_rows"), |b| {
            b.iter(|| {
                let calc = report.calculation(total, CalcVersion::V11);
                calc.resolved_calculations()
                    .iter()
                    .all(ResolvedCalculation::is_consistent)
            });
        });

        group.bench_function(format!("legacy_total_{size}_rows"), |b| {
            b.iter(|| {
                let calc = report.calculation(total, CalcVersion::Legacy);
                calc.resolved_calculations()
                    .first()
                    .and_then(ResolvedCalculation::calculated_total)
            });
        });
    }
    group.finish();
}

fn bench_best_elr(c: &mut Criterion) {
    let mut group = c.benchmark_group("best_elr");
    group.throughput(Throughput::Elements(8));

    let report = make_report(64, 8);
    let total = report.fact("total").unwrap();
    let ids: Vec<FactId> = (0..64).map(|i| FactId::from(format!("item{i}"))).collect();

    group.bench_function("8_groups_64_facts", |b| {
        b.iter(|| {
            let calc = report.calculation(total, CalcVersion::V11);
            calc.best_elr_for_fact_set(&ids).is_some()
        });
    });
    group.finish();
}

criterion_group!(
    resolve,
    bench_parse_report,
    bench_resolve_verdicts,
    bench_best_elr
);
criterion_main!(resolve);
