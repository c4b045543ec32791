//! Insertion-ordered collection with identifier lookup.

use crate::model::EntityId;
use std::collections::HashMap;

/// Entities in insertion order plus an id -> position index.
///
/// Positions never shift because nothing is ever removed.
#[derive(Debug, Clone)]
pub(crate) struct Registry<T> {
    items: Vec<T>,
    index: HashMap<EntityId, usize>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Registry<T> {
    /// Appends `item` under `id`, returning `false` if the id is taken.
    pub(crate) fn insert(&mut self, id: EntityId, item: T) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, self.items.len());
        self.items.push(item);
        true
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&T> {
        self.index.get(&id).and_then(|&pos| self.items.get(pos))
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        match self.index.get(&id) {
            Some(&pos) => self.items.get_mut(pos),
            None => None,
        }
    }

    pub(crate) fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Registry;
    use uuid::Uuid;

    #[test]
    fn keeps_insertion_order_and_rejects_duplicate_ids() {
        let mut registry = Registry::default();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        assert!(registry.insert(first, "a"));
        assert!(registry.insert(second, "b"));
        assert!(!registry.insert(first, "c"));

        assert_eq!(registry.as_slice(), &["a", "b"]);
        assert_eq!(registry.get(second), Some(&"b"));
        assert_eq!(registry.len(), 2);
    }
}
