//! A list of shared handles sorted by a priority key.

use crate::util::{self, Shared};

struct Entry<T: ?Sized> {
    order: usize,
    item:  Shared<T>,
}

/// Shared handles kept in ascending `order`.
///
/// Handles are compared by allocation, so two equal values in different handles are distinct.
/// Entries with equal keys keep their insertion order.
pub(crate) struct OrderedList<T: ?Sized> {
    entries: Vec<Entry<T>>,
}

impl<T: ?Sized> Default for OrderedList<T> {
    fn default() -> Self { Self { entries: Vec::new() } }
}

impl<T: ?Sized> OrderedList<T> {
    pub(crate) fn has(&self, item: &Shared<T>) -> bool { self.position(item).is_some() }

    /// Inserts `item` after every entry with a key not greater than `order`.
    ///
    /// The caller checks for duplicates.
    pub(crate) fn insert(&mut self, item: Shared<T>, order: usize) {
        let index = self.entries.partition_point(|entry| entry.order <= order);
        self.entries.insert(index, Entry { order, item });
    }

    pub(crate) fn remove(&mut self, item: &Shared<T>) -> Option<Shared<T>> {
        let index = self.position(item)?;
        Some(self.entries.remove(index).item)
    }

    pub(crate) fn len(&self) -> usize { self.entries.len() }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Shared<T>> + '_ {
        self.entries.iter().map(|entry| &entry.item)
    }

    fn position(&self, item: &Shared<T>) -> Option<usize> {
        self.entries.iter().position(|entry| util::same_rc(&entry.item, item))
    }
}
