use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use demography::{Assembler, DemographyConfig};

/// Stepping-stone history of `n` populations: each population `P{i}` splits from `P{i+1}` and
/// goes through a bottleneck. Each `M{i}` is an admixture of `P{i-1}` and `P{i+1}`.
fn synthetic_model(n: usize) -> DemographyConfig {
    let name = |i: usize| format!("P{i}");
    let mut config = DemographyConfig::default();
    for i in 0..n {
        config.population(&name(i), 10_000, true);
    }
    config.population("ROOT", 10_000, false);

    for i in 0..n {
        let time = 100.0 * (i + 1) as f64;
        let ancestral = if i + 1 < n { name(i + 1) } else { String::from("ROOT") };
        config.bottleneck(time - 50.0, &name(i), 1000);
        config.split(time, &[&name(i)], &ancestral);
    }

    // Declared from past to present, to exercise event sorting.
    for i in (1..n-1).rev() {
        let admixed = format!("M{i}");
        config.population(&admixed, 5000, true)
            .admixture(25.0 + i as f64, &admixed, &[&name(i - 1), &name(i + 1)], &[0.5, 0.5]);
    }
    config
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("Assembler::build");
    for n in [10, 100, 1000] {
        let config = synthetic_model(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &config, |b, config| {
            b.iter(|| Assembler::default().build(black_box(config)).expect("Valid model"));
        });
    }
    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let model = Assembler::default().build(&synthetic_model(1000)).expect("Valid model");
    c.bench_function("debug_report (1000 populations)", |b| b.iter(|| black_box(&model).debug_report()));
}

criterion_group!(benches, bench_build, bench_report);
criterion_main!(benches);
