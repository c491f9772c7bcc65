use std::fmt;
use std::marker::PhantomData;

use uuid::Uuid;

/// Stable handle into a [`Store`]. Deleting other entries never changes what a key points to.
pub struct Key<T> {
    id: Uuid,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    fn generate() -> Self {
        Key { id: Uuid::new_v4(), _kind: PhantomData }
    }
}

// Manual impls so `T` doesn't need to be Clone/Eq itself.
impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Key<T> {}

impl<T> std::hash::Hash for Key<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.id)
    }
}

/// Insertion-ordered arena keyed by generated ids.
#[derive(Debug, Clone)]
pub struct Store<T> {
    entries: Vec<(Key<T>, T)>,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Store { entries: Vec::new() }
    }
}

impl<T> Store<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> Key<T> {
        let key = Key::generate();
        self.entries.push((key, value));
        key
    }

    pub fn get(&self, key: Key<T>) -> Option<&T> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: Key<T>) -> Option<&mut T> {
        self.entries.iter_mut().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: Key<T>) -> Option<T> {
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = Key<T>> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Key<T>, &T)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_survive_removal_of_neighbours() {
        let mut store = Store::new();
        let a = store.insert("a");
        let b = store.insert("b");
        let c = store.insert("c");

        assert_eq!(store.remove(b), Some("b"));
        assert_eq!(store.get(a), Some(&"a"));
        assert_eq!(store.get(c), Some(&"c"));
        assert_eq!(store.values().copied().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn test_removed_key_is_gone() {
        let mut store = Store::new();
        let a = store.insert(1);
        store.remove(a);
        assert!(store.get(a).is_none());
        assert!(store.remove(a).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_keys_are_unique() {
        let mut store = Store::new();
        let a = store.insert(());
        let b = store.insert(());
        assert_ne!(a, b);
        assert_eq!(store.keys().collect::<Vec<_>>(), vec![a, b]);
    }
}
