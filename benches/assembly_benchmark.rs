use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pcm::assembly::{double_layer, single_layer, CollocationOptions};
use pcm::green::{Derivative, UniformDielectric, Vacuum};
use pcm::shapes::spherical_cavity;
use pcm::symmetry::PointGroup;

pub fn assembly_parts_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly");
    group.sample_size(20);

    for n in [4, 8] {
        let cavity = spherical_cavity(2.929075493, n, n, &PointGroup::trivial()).unwrap();
        let vacuum = Vacuum::default();
        let dielectric = UniformDielectric::new(78.39, Derivative::default()).unwrap();
        let options = CollocationOptions::default();

        group.bench_function(
            format!("Single layer collocation, {} elements", cavity.size()),
            |b| {
                b.iter(|| {
                    black_box(single_layer(&dielectric, cavity.elements(), &options).unwrap())
                })
            },
        );
        group.bench_function(
            format!("Double layer collocation, {} elements", cavity.size()),
            |b| b.iter(|| black_box(double_layer(&vacuum, cavity.elements(), &options).unwrap())),
        );
    }
    group.finish();
}

criterion_group!(benches, assembly_parts_benchmark);
criterion_main!(benches);
