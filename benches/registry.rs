use std::cell::Cell;

use cloister::{new_object, Blueprint, EligibilityPolicy, Isolate, Registry, TypeDefinition};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

struct Sequencer {
    at: Cell<i64>,
}

impl Isolate for Sequencer {
    fn define() -> TypeDefinition {
        TypeDefinition::builder::<Self>()
            .constructor0(|| Ok(Sequencer { at: Cell::new(0) }))
            .factory1("starting_at", |seed: i64| Ok(Sequencer { at: Cell::new(seed) }))
            .finish()
    }
}

fn bench_registry(c: &mut Criterion) {
    let policy = EligibilityPolicy::protecting_namespace_of::<Sequencer>();
    let registry = Registry::<Sequencer>::create(policy).unwrap();

    c.bench_function("get_hot_path", |b| {
        let _warm = registry.get().unwrap();
        b.iter(|| black_box(registry.get().unwrap()));
    });

    c.bench_function("construct_default", |b| {
        let context = registry.get().unwrap();
        let plan = Blueprint::for_target::<Sequencer>();
        b.iter(|| {
            let sequencer: Sequencer = new_object(&context, &plan).unwrap().downcast().unwrap();
            black_box(sequencer.at.get())
        });
    });

    c.bench_function("construct_factory", |b| {
        let context = registry.get().unwrap();
        let plan = Blueprint::for_target::<Sequencer>()
            .factory_method("starting_at")
            .arguments([cloister::Arg::new(42_i64)]);
        b.iter(|| {
            let sequencer: Sequencer = new_object(&context, &plan).unwrap().downcast().unwrap();
            black_box(sequencer.at.get())
        });
    });
}

criterion_group!(benches, bench_registry);
criterion_main!(benches);
