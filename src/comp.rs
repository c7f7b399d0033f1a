//! Components are typed data attached to entities.
//!
//! # Component types
//! Every kind of component is identified by a [`ComponentTypeId`],
//! issued once by the [type registry](TypeRegistry) when the kind is defined.
//! The ID doubles as the bit index of the kind in
//! [archetype bit-sets](crate::archetype::ArchetypeBits),
//! so the mapping between component kinds and archetype bits is bijective.
//!
//! A [`ComponentType<T>`] pairs the ID with the payload type `T`.
//! It can only be obtained from [`TypeRegistry::define`],
//! so each ID is bound to exactly one payload type.
//!
//! # Components
//! A [`Component<T>`] is a payload tagged with its component type.
//! The [`Repository`] stores components type-erased as [`AnyComponent`]
//! and downcasts them back when accessed through a `ComponentType<T>`.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;
use std::{cmp, fmt, hash, ops};

use crate::error::{Error, Result};

mod registry;
pub use registry::{GlobalFactory, LocalFactory, TypeFactory, TypeRegistry};

mod repository;
pub use repository::{Repository, RepositoryHook};

/// Identifies a kind of component.
///
/// Equality, ordering and hashing consider the issued index
/// and the [`TypeRegistry`] that issued it,
/// so types from different registries never compare equal even if their indices collide.
/// The name is only used for debugging and logging.
#[derive(Clone)]
pub struct ComponentTypeId {
    index:  usize,
    origin: usize,
    name:   Arc<str>,
}

impl ComponentTypeId {
    pub(crate) fn new(origin: usize, index: usize, name: &str) -> Self {
        Self { index, origin, name: Arc::from(name) }
    }

    /// The index of this type, which is also its bit in archetype bit-sets.
    pub fn index(&self) -> usize { self.index }

    /// The debug name attached to this type.
    pub fn name(&self) -> &str { &self.name }
}

impl PartialEq for ComponentTypeId {
    fn eq(&self, other: &Self) -> bool { (self.index, self.origin) == (other.index, other.origin) }
}

impl Eq for ComponentTypeId {}

impl PartialOrd for ComponentTypeId {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> { Some(self.cmp(other)) }
}

impl Ord for ComponentTypeId {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        (self.index, self.origin).cmp(&(other.index, other.origin))
    }
}

impl hash::Hash for ComponentTypeId {
    fn hash<H: hash::Hasher>(&self, state: &mut H) { (self.index, self.origin).hash(state) }
}

impl fmt::Debug for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ComponentTypeId({}@{}, {:?})", self.index, self.origin, &*self.name)
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(&self.name) }
}

static_assertions::assert_impl_all!(ComponentTypeId: Clone, Eq, Ord, hash::Hash, Send, Sync);

/// A component type with `T` as the shape of its data.
pub struct ComponentType<T> {
    id:  ComponentTypeId,
    _ph: PhantomData<fn() -> T>,
}

impl<T> ComponentType<T> {
    pub(crate) fn new(id: ComponentTypeId) -> Self { Self { id, _ph: PhantomData } }

    /// The untyped identity of this type.
    pub fn id(&self) -> &ComponentTypeId { &self.id }

    /// Wraps `data` into a component of this type.
    pub fn create(&self, data: T) -> Component<T> {
        Component { component_type: self.id.clone(), data }
    }
}

impl<T> Clone for ComponentType<T> {
    fn clone(&self) -> Self { Self::new(self.id.clone()) }
}

impl<T> fmt::Debug for ComponentType<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ComponentType").field(&self.id).finish()
    }
}

impl<T> PartialEq for ComponentType<T> {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl<T> Eq for ComponentType<T> {}

/// A payload tagged with its component type.
pub struct Component<T> {
    component_type: ComponentTypeId,
    data:           T,
}

impl<T> Component<T> {
    /// The type this component belongs to.
    pub fn component_type_id(&self) -> &ComponentTypeId { &self.component_type }

    /// Consumes the component and returns its payload.
    pub fn into_data(self) -> T { self.data }
}

impl<T> ops::Deref for Component<T> {
    type Target = T;

    fn deref(&self) -> &T { &self.data }
}

impl<T> ops::DerefMut for Component<T> {
    fn deref_mut(&mut self) -> &mut T { &mut self.data }
}

impl<T: fmt::Debug> fmt::Debug for Component<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Component")
            .field("type", &self.component_type)
            .field("data", &self.data)
            .finish()
    }
}

/// A type-erased [`Component`].
pub trait AnyComponent: Any + 'static {
    /// The type this component belongs to.
    fn component_type_id(&self) -> &ComponentTypeId;

    /// Upcasts to [`Any`] for downcasting to the concrete `Component<T>`.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts to [`Any`] for downcasting to the concrete `Component<T>`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Upcasts to [`Any`] for downcasting to the concrete `Component<T>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: 'static> AnyComponent for Component<T> {
    fn component_type_id(&self) -> &ComponentTypeId { &self.component_type }

    fn as_any(&self) -> &dyn Any { self }

    fn as_any_mut(&mut self) -> &mut dyn Any { self }

    fn into_any(self: Box<Self>) -> Box<dyn Any> { self }
}

impl dyn AnyComponent {
    /// Returns the typed component if its payload type is `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&Component<T>> { self.as_any().downcast_ref() }

    /// Returns the typed component if its payload type is `T`.
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut Component<T>> {
        self.as_any_mut().downcast_mut()
    }
}

impl fmt::Debug for dyn AnyComponent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AnyComponent").field("type", self.component_type_id()).finish_non_exhaustive()
    }
}

pub(crate) fn downcast_box<T: 'static>(boxed: Box<dyn AnyComponent>) -> Result<Component<T>> {
    let component_type = boxed.component_type_id().clone();
    match boxed.into_any().downcast::<Component<T>>() {
        Ok(component) => Ok(*component),
        Err(_) => Err(Error::PayloadMismatch(component_type)),
    }
}
