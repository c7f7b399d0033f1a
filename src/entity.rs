//! An entity is an opaque identity that components attach to.
//!
//! Entities carry no data of their own.
//! Their existence is tracked by the [`Manager`],
//! while the components attached to them live in the
//! [component repository](crate::comp::Repository).
//!
//! An entity must have all its components removed before it is deleted;
//! [`Core::remove_entity`](crate::Core::remove_entity) does this in the right order.

use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroU32;

use crate::error::{Error, Result, Subject};

/// A raw, opaque entity ID.
///
/// Equality is value equality on the issued number.
/// IDs are never reused by the same [`Manager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(NonZeroU32);

impl EntityId {
    /// Returns the issued number of this entity.
    pub fn get(self) -> u32 { self.0.get() }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "entity#{}", self.0) }
}

static_assertions::assert_impl_all!(EntityId: Copy, Eq, Ord, std::hash::Hash, Send, Sync);

/// Issues entity IDs and tracks which of them are alive.
pub struct Manager {
    next: NonZeroU32,
    live: BTreeSet<EntityId>,
}

impl Default for Manager {
    fn default() -> Self { Self { next: NonZeroU32::MIN, live: BTreeSet::new() } }
}

impl Manager {
    /// Allocates a new entity.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX - 1` entities have been allocated.
    pub fn create(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.checked_add(1).expect("entity ID space exhausted");
        self.live.insert(id);
        log::trace!("Created {id}");
        id
    }

    /// Returns whether the entity was created by this manager and not yet removed.
    pub fn has(&self, entity: EntityId) -> bool { self.live.contains(&entity) }

    /// Removes an entity.
    ///
    /// The caller is responsible for removing its components first.
    pub fn remove(&mut self, entity: EntityId) -> Result<()> {
        if !self.live.remove(&entity) {
            return Err(Error::NotFound(Subject::Entity(entity)));
        }
        log::trace!("Removed {entity}");
        Ok(())
    }

    /// Iterates over live entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ { self.live.iter().copied() }

    /// Returns the number of live entities.
    pub fn len(&self) -> usize { self.live.len() }

    /// Returns true if there are no live entities.
    pub fn is_empty(&self) -> bool { self.live.is_empty() }
}
