use std::collections::BTreeMap;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Repository;
use crate::comp::{LocalFactory, TypeRegistry};
use crate::entity::{self, EntityId};
use crate::error::{Error, Subject};
use crate::test_util::{self, ComponentEvent, ComponentRecorder, Health, Position, TestTypes};

fn setup() -> (Repository, TestTypes, Rc<ComponentRecorder>, entity::Manager) {
    test_util::init();

    let mut registry = TypeRegistry::new(Box::new(LocalFactory::default()));
    let types = TestTypes::define(&mut registry);
    let recorder = ComponentRecorder::new();
    let mut repo = Repository::default();
    repo.hooks_mut().add(recorder.clone());

    (repo, types, recorder, entity::Manager::default())
}

#[test]
fn test_add_then_get() {
    let (mut repo, types, recorder, mut entities) = setup();
    let entity = entities.create();

    assert!(!repo.has_component(&types.position, entity));
    repo.add_component(types.position.create(Position { x: 1.0, y: 2.0 }), entity).unwrap();

    assert!(repo.has_component(&types.position, entity));
    assert!(repo.has_entity(entity));
    let position = repo.get_component(&types.position, entity).unwrap();
    assert_eq!(**position, Position { x: 1.0, y: 2.0 });
    assert_eq!(
        recorder.take(),
        vec![ComponentEvent::Added(types.position.id().clone(), entity)]
    );
}

#[test]
fn test_remove_then_missing() {
    let (mut repo, types, recorder, mut entities) = setup();
    let entity = entities.create();
    repo.add_component(types.health.create(Health(10)), entity).unwrap();
    recorder.take();

    let removed = repo.remove_component(&types.health, entity).unwrap();
    assert_eq!(removed.into_data(), Health(10));
    assert!(!repo.has_component(&types.health, entity));
    assert!(!repo.has_entity(entity));
    assert_eq!(repo.component_count(), 0);
    assert_eq!(recorder.take(), vec![ComponentEvent::Removed(types.health.id().clone(), entity)]);

    let err = repo.get_component(&types.health, entity).unwrap_err();
    assert!(matches!(
        err,
        Error::NotFound(Subject::Component { component_type, entity: e })
            if component_type == *types.health.id() && e == entity
    ));
    let err = repo.remove_component(&types.health, entity).unwrap_err();
    assert!(matches!(err, Error::NotFound(Subject::Component { .. })));
    assert!(recorder.take().is_empty());
}

#[test]
fn test_colliding_indices_stay_separate() {
    let (mut repo, types, _recorder, mut entities) = setup();
    let entity = entities.create();
    let name = TypeRegistry::new(Box::new(LocalFactory::default())).define::<String>("Name").unwrap();
    assert_eq!(name.id().index(), types.position.id().index());

    repo.add_component(types.position.create(Position { x: 3.0, y: 4.0 }), entity).unwrap();
    repo.add_component(name.create("rock".into()), entity).unwrap();

    assert_eq!(**repo.get_component(&types.position, entity).unwrap(), Position { x: 3.0, y: 4.0 });
    assert_eq!(repo.get_component(&name, entity).unwrap().as_str(), "rock");
    assert_eq!(repo.remove_component(&name, entity).unwrap().into_data(), "rock");
    assert!(repo.has_component(&types.position, entity));
}

#[test]
fn test_duplicate_add_keeps_original() {
    let (mut repo, types, recorder, mut entities) = setup();
    let entity = entities.create();
    repo.add_component(types.health.create(Health(1)), entity).unwrap();

    let err = repo.add_component(types.health.create(Health(2)), entity).unwrap_err();
    assert!(matches!(err, Error::AlreadyPresent(Subject::Component { .. })));
    assert_eq!(**repo.get_component(&types.health, entity).unwrap(), Health(1));
    assert_eq!(recorder.take().len(), 1, "rejected additions must not be broadcast");
}

#[test]
fn test_entity_component_types_in_insertion_order() {
    let (mut repo, types, _recorder, mut entities) = setup();
    let entity = entities.create();
    let other = entities.create();

    repo.add_component(types.health.create(Health(3)), entity).unwrap();
    repo.add_component(types.position.create(Position { x: 0.0, y: 0.0 }), entity).unwrap();
    repo.add_component(types.health.create(Health(4)), other).unwrap();

    let ids: Vec<_> = repo.get_entity_component_types(entity).cloned().collect();
    assert_eq!(ids, vec![types.health.id().clone(), types.position.id().clone()]);

    let components = repo.get_entity_components(entity);
    let first: Vec<_> = components.map(|comp| comp.component_type_id().clone()).collect();
    let second: Vec<_> =
        repo.get_entity_components(entity).map(|comp| comp.component_type_id().clone()).collect();
    assert_eq!(first, ids);
    assert_eq!(first, second, "iteration must be restartable");

    assert_eq!(repo.get_entity_component_types(entities.create()).count(), 0);
}

#[test]
fn test_remove_entity_components_fires_once_per_component() {
    let (mut repo, types, recorder, mut entities) = setup();
    let entity = entities.create();
    let bystander = entities.create();

    repo.add_component(types.health.create(Health(3)), entity).unwrap();
    repo.add_component(types.position.create(Position { x: 0.0, y: 0.0 }), entity).unwrap();
    repo.add_component(types.health.create(Health(5)), bystander).unwrap();
    recorder.take();

    repo.remove_entity_components(entity).unwrap();
    assert!(!repo.has_entity(entity));
    assert!(repo.has_entity(bystander));
    assert_eq!(
        recorder.take(),
        vec![
            ComponentEvent::Removed(types.health.id().clone(), entity),
            ComponentEvent::Removed(types.position.id().clone(), entity),
        ]
    );

    repo.remove_entity_components(entity).unwrap();
    assert!(recorder.take().is_empty());
    assert_eq!(repo.entities_with(types.position.id()).count(), 0);
}

#[test]
fn test_hook_failure_keeps_mutation() {
    let (mut repo, types, recorder, mut entities) = setup();
    let later = ComponentRecorder::new();
    repo.hooks_mut().add(later.clone());
    let entity = entities.create();

    recorder.set_fail(true);
    let err = repo.add_component(types.health.create(Health(7)), entity).unwrap_err();
    assert!(matches!(err, Error::Hook { .. }));
    assert!(repo.has_component(&types.health, entity));
    assert_eq!(later.take().len(), 1, "later hooks still run after a failure");

    let err = repo.remove_entity_components(entity).unwrap_err();
    assert!(matches!(err, Error::Hook { .. }));
    assert!(!repo.has_entity(entity));
    assert_eq!(later.take().len(), 1);
}

#[test]
fn test_get_component_mut_is_silent() {
    let (mut repo, types, recorder, mut entities) = setup();
    let entity = entities.create();
    repo.add_component(types.health.create(Health(1)), entity).unwrap();
    recorder.take();

    repo.get_component_mut(&types.health, entity).unwrap().0 += 41;
    assert_eq!(**repo.get_component(&types.health, entity).unwrap(), Health(42));
    assert!(recorder.take().is_empty());
}

#[test]
fn test_random_mutations_match_model() {
    let (mut repo, types, _recorder, mut entities) = setup();
    let pool: Vec<EntityId> = (0..8).map(|_| entities.create()).collect();
    let mut model: BTreeMap<(EntityId, bool), i32> = BTreeMap::new();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for step in 0..512 {
        let entity = pool[rng.gen_range(0..pool.len())];
        let use_health = rng.gen_bool(0.5);
        let key = (entity, use_health);

        if rng.gen_bool(0.6) {
            let result = if use_health {
                repo.add_component(types.health.create(Health(step)), entity)
            } else {
                repo.add_component(types.position.create(Position { x: step as f32, y: 0.0 }), entity)
            };
            assert_eq!(result.is_ok(), !model.contains_key(&key));
            model.entry(key).or_insert(step);
        } else {
            let removed = if use_health {
                repo.remove_component(&types.health, entity).map(|comp| comp.0)
            } else {
                repo.remove_component(&types.position, entity).map(|comp| comp.x as i32)
            };
            assert_eq!(removed.ok(), model.remove(&key));
        }

        for &entity in &pool {
            let expected = model.keys().filter(|(e, _)| *e == entity).count();
            assert_eq!(repo.get_entity_component_types(entity).count(), expected);
            assert_eq!(repo.has_entity(entity), expected > 0);
        }
        assert_eq!(repo.component_count(), model.len());
    }
}
