use std::rc::Rc;

use indexmap::IndexMap;

use super::{Archetype, ArchetypeBits};
use crate::error::{Error, Result, Subject};

/// Interns archetypes by their bits.
///
/// This is the only source of archetype identity:
/// as long as an entry is not removed,
/// every lookup of equal bits yields the same `Rc<Archetype>`.
#[derive(Debug, Default)]
pub struct Registry {
    archetypes: IndexMap<ArchetypeBits, Rc<Archetype>>,
}

impl Registry {
    /// Returns whether an archetype with `bits` is interned.
    pub fn has(&self, bits: &ArchetypeBits) -> bool { self.archetypes.contains_key(bits) }

    /// Gets the interned archetype with `bits`.
    pub fn get(&self, bits: &ArchetypeBits) -> Result<Rc<Archetype>> {
        self.archetypes
            .get(bits)
            .cloned()
            .ok_or_else(|| Error::NotFound(Subject::Archetype(bits.clone())))
    }

    /// Gets the interned archetype with `bits`, interning a new one if absent.
    pub fn get_or_create(&mut self, bits: &ArchetypeBits) -> Rc<Archetype> {
        if let Some(archetype) = self.archetypes.get(bits) {
            return Rc::clone(archetype);
        }

        let archetype = Rc::new(Archetype::new(bits.clone()));
        log::debug!("Interned {archetype}");
        self.archetypes.insert(bits.clone(), Rc::clone(&archetype));
        archetype
    }

    /// Interns `archetype` under its own bits, replacing any previous entry.
    pub fn add(&mut self, archetype: Rc<Archetype>) {
        let bits = archetype.bits().clone();
        if self.archetypes.insert(bits, archetype).is_some() {
            log::debug!("Replaced an interned archetype");
        }
    }

    /// Removes the interned archetype with `bits`.
    pub fn remove(&mut self, bits: &ArchetypeBits) -> Result<Rc<Archetype>> {
        let archetype = self
            .archetypes
            .shift_remove(bits)
            .ok_or_else(|| Error::NotFound(Subject::Archetype(bits.clone())))?;
        log::debug!("Removed {archetype}");
        Ok(archetype)
    }

    /// Iterates over interned archetypes in interning order.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<Archetype>> { self.archetypes.values() }

    /// Returns the number of interned archetypes.
    pub fn len(&self) -> usize { self.archetypes.len() }

    /// Returns true if nothing is interned.
    pub fn is_empty(&self) -> bool { self.archetypes.is_empty() }
}
