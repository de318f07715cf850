use criterion::{black_box, criterion_group, criterion_main, Criterion};
use farm_planner_rust::fertility::{score_samples, FertilityStandard, SoilSample};
use farm_planner_rust::optimizer::{allocate, Crop, CropPolicy, GradeSource, Plot};
use farm_planner_rust::utils::PriceRange;
use farm_planner_rust::Grade;
use rand::{Rng, SeedableRng};

fn random_samples(n: usize) -> Vec<SoilSample> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    (0..n)
        .map(|i| SoilSample {
            plot_id: format!("plot{}", i),
            ph: rng.gen_range(4.5..9.5),
            nitrogen_mg_per_kg: rng.gen_range(5.0..3000.0),
            phosphorus_mg_per_kg: rng.gen_range(1.0..40.0),
            potassium_mg_per_kg: rng.gen_range(20.0..300.0),
        })
        .collect()
}

fn plots_and_crops(n: usize) -> (Vec<Plot>, Vec<Crop>) {
    let policy = CropPolicy::default();
    let mut names: Vec<&str> = Grade::ALL.iter().flat_map(|g| policy.allowed(*g)).collect();
    names.sort_unstable();
    names.dedup();

    let crops = names
        .iter()
        .enumerate()
        .map(|(i, name)| Crop::new(*name, "春季", "60天", 3.0 + i as f64, 4.0, PriceRange::fixed(5.0)))
        .collect();

    let plots = (0..n)
        .map(|i| Plot {
            plot_id: format!("plot{}", i),
            area_m2: 100.0 + (i % 7) as f64 * 50.0,
            grade: Grade::ALL[i % 3],
            grade_source: GradeSource::Measured,
        })
        .collect();

    (plots, crops)
}

fn bench_scoring(c: &mut Criterion) {
    let samples = random_samples(10_000);
    let standard = FertilityStandard::default();
    c.bench_function("score_samples_10k", |b| {
        b.iter(|| score_samples(black_box(&samples), &standard))
    });
}

fn bench_allocation(c: &mut Criterion) {
    let policy = CropPolicy::default();
    for n in [18, 200] {
        let (plots, crops) = plots_and_crops(n);
        c.bench_function(&format!("allocate_{}_plots", n), |b| {
            b.iter(|| allocate(black_box(&plots), &crops, &policy))
        });
    }
}

criterion_group!(benches, bench_scoring, bench_allocation);
criterion_main!(benches);
