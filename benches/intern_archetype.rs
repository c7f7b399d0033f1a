use criterion::*;
use nodec::archetype::{ArchetypeBits, Registry};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn intern_archetype(c: &mut Criterion) {
    let mut group = c.benchmark_group("intern archetype");

    for num_types in [1usize, 4, 16, 64] {
        let mut rng = StdRng::seed_from_u64(num_types as u64);
        let sets: Vec<ArchetypeBits> = (0..64)
            .map(|_| {
                let mut indices: Vec<usize> = (0..num_types * 2).collect();
                indices.shuffle(&mut rng);
                let mut bits = ArchetypeBits::default();
                for index in indices.into_iter().take(num_types) {
                    bits.insert(index);
                }
                bits
            })
            .collect();

        group.throughput(Throughput::Elements(sets.len() as u64));
        group.bench_with_input(BenchmarkId::new("cold", num_types), &sets, |b, sets| {
            b.iter_batched(
                Registry::default,
                |mut registry| {
                    for bits in sets {
                        black_box(registry.get_or_create(bits));
                    }
                    registry
                },
                BatchSize::SmallInput,
            );
        });

        let mut warm = Registry::default();
        for bits in &sets {
            warm.get_or_create(bits);
        }
        group.bench_with_input(BenchmarkId::new("warm", num_types), &sets, |b, sets| {
            b.iter(|| {
                for bits in sets {
                    black_box(warm.get_or_create(bits));
                }
            });
        });
    }
}

criterion_group!(benches, intern_archetype);
criterion_main!(benches);
