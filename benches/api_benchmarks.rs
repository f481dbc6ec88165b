use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ml::{build_features, train, PatientRecord, RiskLevel, TrainingConfig};

fn cohort(n: usize) -> Vec<PatientRecord> {
    (0..n)
        .map(|i| {
            let age = 18.0 + (i * 13 % 75) as f64;
            PatientRecord::new(i as u64, format!("Patient {i}"), age, RiskLevel::ALL[i % 3])
        })
        .collect()
}

fn feature_building(c: &mut Criterion) {
    let patients = cohort(1_000);
    c.bench_function("build_features/1000", |b| {
        b.iter(|| build_features(black_box(&patients)))
    });
}

fn training(c: &mut Criterion) {
    let patients = cohort(200);
    let config = TrainingConfig::default();
    let mut group = c.benchmark_group("train");
    group.sample_size(10);
    group.bench_function("200 patients", |b| {
        b.iter(|| train(black_box(&patients), &config).map(|m| m.statistics.model_accuracy))
    });
    group.finish();
}

fn prediction(c: &mut Criterion) {
    let model = match train(&cohort(200), &TrainingConfig::default()) {
        Ok(model) => model,
        Err(e) => panic!("benchmark model failed to train: {e}"),
    };
    let batch = cohort(100);
    c.bench_function("predict/100", |b| b.iter(|| model.predict(black_box(&batch))));
}

criterion_group!(benches, feature_building, training, prediction);
criterion_main!(benches);
