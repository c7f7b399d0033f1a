//! A node-schema ECS runtime core.
//!
//! # What is ECS?
//! ECS is a data-oriented programming paradigm.
//! Objects ("Entities") store their data in "Components",
//! which are processed in "Systems".
//!
//! # Entities and components
//! An [entity](entity) is an opaque identity.
//! Components are typed values attached to entities,
//! at most one per [component type](comp::ComponentType) per entity.
//! Component types are defined at runtime through [`Core::define_component_type`],
//! which binds a fresh [`ComponentTypeId`](comp::ComponentTypeId) to the payload type.
//!
//! Components are stored in the [repository](comp::Repository),
//! which notifies [hooks](comp::RepositoryHook) synchronously
//! whenever a component is added or removed.
//!
//! # Archetypes and node schemas
//! The set of component types of an entity is its [archetype](archetype),
//! identified by a bit-set with one bit per component type.
//! Systems do not query components directly.
//! Instead, each system declares a [node schema](node::NodeSchema),
//! the set of component types it needs,
//! and is given the entities that currently carry all of them.
//!
//! When a schema is registered,
//! the [bridge](node::SchemaArchetypeBridge) resolves it to an interned archetype
//! and notifies the [node index](node::Index),
//! which answers "which entities match this schema" during updates.
//!
//! # Phases and ticks
//! Systems are grouped into [phases](system::Phase),
//! ordered by the [orchestrator](system::Orchestrator).
//! Each [`Core::update`] is one tick, running every phase in order.
//! A failing system is logged and reported to the [tracer](tracer),
//! but never stops the rest of the tick.
//!
//! # Example
//! ```
//! use std::rc::Rc;
//!
//! use nodec::node::{NodeSchema, NodeSchemaMeta};
//! use nodec::system::{self, Phase};
//!
//! let mut core = nodec::Core::builder().build().unwrap();
//! let health = core.define_component_type::<u32>("Health").unwrap();
//!
//! let alive = Rc::new(NodeSchemaMeta::new("Alive", NodeSchema::default().with("hp", &health)));
//! core.register_node_schema(Rc::clone(&alive)).unwrap();
//!
//! let entity = core.create_entity();
//! core.add_entity_component(entity, health.create(3)).unwrap();
//!
//! let mut phase = Phase::new("regenerate");
//! let repository = Rc::clone(core.repository());
//! let regen_type = health.clone();
//! phase
//!     .push_system(system::from_fn("regen", alive, move |nodes| {
//!         let mut repository = repository.borrow_mut();
//!         for &entity in nodes {
//!             **repository.get_component_mut(&regen_type, entity)? += 1;
//!         }
//!         Ok(())
//!     }))
//!     .unwrap();
//! core.orchestrator_mut().push_phase(nodec::util::shared(phase)).unwrap();
//!
//! core.update(&nodec::tracer::Noop);
//! assert_eq!(**core.repository().borrow().get_component(&health, entity).unwrap(), 4);
//! ```

#![cfg_attr(doc, warn(missing_docs))]

mod macros;
#[doc(inline)]
pub use macros::*;

pub mod tracer;

pub mod archetype;

pub mod comp;

pub mod core;
pub use crate::core::{Core, Runtime};

pub mod entity;
pub use entity::EntityId;

pub mod error;
pub use error::{Error, Result};

pub mod hook;

pub mod node;

mod ordered;

pub mod system;

#[cfg(any(test, feature = "internal-bench"))]
pub mod test_util;

pub mod util;
