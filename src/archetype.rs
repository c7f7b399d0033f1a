//! An archetype is a set of component types, identified by a bit-set.
//!
//! Bit `i` of an [`ArchetypeBits`] is set iff the component type with index `i`
//! (see [`ComponentTypeId::index`]) is part of the set.
//! Archetypes are compared by their bits only,
//! and the [`Registry`] interns them so that equal bits always resolve to the same
//! [`Rc<Archetype>`](Archetype).
//!
//! Archetypes are derived from [node schemas](crate::node::NodeSchema)
//! by the [bridge](crate::node::SchemaArchetypeBridge).
//! Which entities currently match an archetype is tracked by the [node index](crate::node::Index).

use std::fmt;

use bitvec::prelude::BitVec;
use itertools::Itertools;

use crate::comp::ComponentTypeId;

mod registry;
pub use registry::Registry;


/// A normalized bit-set of component type indices.
///
/// Trailing zero bits are always trimmed,
/// so two bit-sets containing the same types are equal and hash equally
/// regardless of the order or capacity they were built with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ArchetypeBits(BitVec);

impl ArchetypeBits {
    /// Creates the bit-set of the given component types.
    ///
    /// Duplicates and order do not matter.
    pub fn from_types<'t>(types: impl IntoIterator<Item = &'t ComponentTypeId>) -> Self {
        let mut bits = Self::default();
        for ty in types {
            bits.insert(ty.index());
        }
        bits
    }

    /// Sets the bit at `index`.
    pub fn insert(&mut self, index: usize) {
        if self.0.len() <= index {
            self.0.resize(index + 1, false);
        }
        self.0.set(index, true);
    }

    /// Clears the bit at `index`.
    pub fn remove(&mut self, index: usize) {
        if index < self.0.len() {
            self.0.set(index, false);
            self.normalize();
        }
    }

    /// Returns whether the bit at `index` is set.
    pub fn contains(&self, index: usize) -> bool { self.0.get(index).map_or(false, |bit| *bit) }

    /// Returns whether every bit set in `other` is also set in `self`.
    pub fn is_superset_of(&self, other: &Self) -> bool {
        other.0.len() <= self.0.len() && other.0.iter_ones().all(|index| self.0[index])
    }

    /// Iterates over the set bit indices in ascending order.
    pub fn types(&self) -> impl Iterator<Item = usize> + '_ { self.0.iter_ones() }

    /// Returns the number of set bits.
    pub fn len(&self) -> usize { self.0.count_ones() }

    /// Returns true if no bits are set.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    fn normalize(&mut self) {
        match self.0.last_one() {
            Some(last) => self.0.truncate(last + 1),
            None => self.0.clear(),
        }
    }
}

impl From<BitVec> for ArchetypeBits {
    fn from(bits: BitVec) -> Self {
        let mut bits = Self(bits);
        bits.normalize();
        bits
    }
}

impl fmt::Display for ArchetypeBits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{{}}}", self.types().join(", "))
    }
}

/// An interned archetype.
#[derive(Debug, PartialEq, Eq)]
pub struct Archetype {
    bits: ArchetypeBits,
}

impl Archetype {
    /// Creates a standalone archetype.
    ///
    /// Use [`Registry::get_or_create`] to obtain the interned instance instead.
    pub fn new(bits: ArchetypeBits) -> Self { Self { bits } }

    /// The component types of this archetype.
    pub fn bits(&self) -> &ArchetypeBits { &self.bits }

    /// Returns whether an entity with the component types `entity` is a member of this archetype.
    pub fn matches(&self, entity: &ArchetypeBits) -> bool { entity.is_superset_of(&self.bits) }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "archetype {}", self.bits) }
}
