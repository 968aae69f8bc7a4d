//! Benchmarks for Tsetlin Machine operations.

use core::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tsetlin_engine::{
    Clause, Config, TsetlinClassifier, TsetlinMachine,
    feedback::{self, TypeIProbs},
    utils::rng_from_seed
};

fn input(n_features: usize) -> Vec<u8> {
    (0..n_features).map(|i| (i % 2) as u8).collect()
}

fn dataset(n_samples: usize, n_features: usize) -> (Vec<Vec<u8>>, Vec<i64>) {
    let x = (0..n_samples)
        .map(|i| (0..n_features).map(|j| ((i * 7 + j * 3) % 5 < 2) as u8).collect())
        .collect();
    let y = (0..n_samples).map(|i| (i % 3) as i64).collect();
    (x, y)
}

fn bench_clause_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("clause_evaluate");

    for n_features in [16, 64, 256, 1024] {
        let mut rng = rng_from_seed(1);
        let clause = Clause::random(n_features, 100, 1, &mut rng);
        let x = input(n_features);

        group.bench_with_input(
            BenchmarkId::from_parameter(n_features),
            &n_features,
            |b, _| {
                b.iter(|| black_box(clause.evaluate(black_box(&x))));
            }
        );
    }

    group.finish();
}

fn bench_feedback(c: &mut Criterion) {
    let mut group = c.benchmark_group("feedback");
    let x = input(256);
    let probs = TypeIProbs::new(3.9, false);

    group.bench_function("type_i_256", |b| {
        let mut rng = rng_from_seed(2);
        let mut clause = Clause::random(256, 100, 1, &mut rng);
        b.iter(|| {
            let fires = clause.evaluate(&x);
            feedback::type_i(&mut clause, black_box(&x), fires, probs, &mut rng);
        });
    });

    group.bench_function("type_ii_256", |b| {
        let mut rng = rng_from_seed(3);
        let mut clause = Clause::random(256, 100, -1, &mut rng);
        b.iter(|| feedback::type_ii(&mut clause, black_box(&x), true));
    });

    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict");

    for n_clauses in [10, 50, 100, 200] {
        let config = Config::builder()
            .clauses(n_clauses)
            .random_state(4)
            .n_jobs(1)
            .build()
            .unwrap();
        let tm = TsetlinMachine::new(config, 64, 10).unwrap();
        let x = input(64);

        group.bench_with_input(
            BenchmarkId::from_parameter(n_clauses),
            &n_clauses,
            |b, _| {
                b.iter(|| black_box(tm.predict(black_box(&x))));
            }
        );
    }

    group.finish();
}

fn bench_training_epoch(c: &mut Criterion) {
    let mut group = c.benchmark_group("training_epoch");
    group.sample_size(10);

    let (x, y) = dataset(200, 64);
    for n_jobs in [1, -1] {
        let config = Config::builder()
            .clauses(200)
            .threshold(50)
            .specificity(3.9)
            .random_state(5)
            .n_jobs(n_jobs)
            .build()
            .unwrap();
        let mut clf = TsetlinClassifier::new(config);
        clf.fit(&x, &y, 1).unwrap();

        group.bench_with_input(BenchmarkId::new("jobs", n_jobs), &n_jobs, |b, _| {
            b.iter(|| black_box(clf.partial_fit(&x, &y, 1).unwrap()));
        });
    }

    group.finish();
}

fn bench_batch_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_predict");
    let (x, y) = dataset(1000, 64);

    for n_jobs in [1, -1] {
        let config = Config::builder()
            .clauses(100)
            .random_state(6)
            .n_jobs(n_jobs)
            .build()
            .unwrap();
        let mut clf = TsetlinClassifier::new(config);
        clf.fit(&x[..100], &y[..100], 2).unwrap();

        group.bench_with_input(BenchmarkId::new("jobs", n_jobs), &n_jobs, |b, _| {
            b.iter(|| black_box(clf.predict(black_box(&x)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_clause_evaluate,
    bench_feedback,
    bench_predict,
    bench_training_epoch,
    bench_batch_predict
);
criterion_main!(benches);
