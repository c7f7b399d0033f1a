use criterion::*;
use nodec::test_util::{Position, Velocity};
use nodec::Core;

fn add_component(c: &mut Criterion) {
    let mut group = c.benchmark_group("add component");

    for log_entities in (0..=8).step_by(4) {
        let entities = 1 << log_entities;
        group.throughput(Throughput::Elements(entities));
        group.bench_with_input(
            BenchmarkId::new("position + velocity", format!("{entities} entities")),
            &entities,
            |b, &entities| {
                b.iter_batched(
                    || {
                        let mut core = Core::builder().build().expect("default builder");
                        let position = core
                            .define_component_type::<Position>("Position")
                            .expect("fresh core");
                        let velocity = core
                            .define_component_type::<Velocity>("Velocity")
                            .expect("fresh core");
                        (core, position, velocity)
                    },
                    |(mut core, position, velocity)| {
                        for _ in 0..entities {
                            let entity = core.create_entity();
                            core.add_entity_component(entity, position.create(Position { x: 0., y: 0. }))
                                .expect("fresh entity");
                            core.add_entity_component(entity, velocity.create(Velocity { dx: 1., dy: 1. }))
                                .expect("fresh entity");
                        }
                        core
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }
}

criterion_group!(benches, add_component);
criterion_main!(benches);
