//! Generational slot arena
//!
//! Plays and registry entries refer to each other through [`Key`]s into an
//! arena instead of pointers. A key carries the generation of its slot; once
//! the slot is vacated the generation moves on and the old key stops resolving.

use std::ops::{Index, IndexMut};

/// Stable handle to an arena slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Key {
    index: usize,
    generation: u64,
}

#[derive(Debug)]
struct Slot<V> {
    generation: u64,
    value: Option<V>,
}

/// Slot storage with free-list reuse
#[derive(Debug)]
pub(crate) struct Arena<V> {
    slots: Vec<Slot<V>>,

    /// Vacant slot indices, most recently freed last
    free: Vec<usize>,

    /// Number of occupied slots
    len: usize,

    /// Generation given to brand new slots
    epoch: u64,
}

impl<V> Arena<V> {
    /// Create an empty arena with room for `capacity` values
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
            epoch: 0,
        }
    }

    /// Create an empty arena whose keys can never equal a key issued by `self`
    pub fn successor(&self) -> Self {
        let newest = self
            .slots
            .iter()
            .map(|slot| slot.generation)
            .max()
            .unwrap_or(self.epoch)
            .max(self.epoch);

        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            epoch: newest + 1,
        }
    }

    /// Store `value` and return its key
    pub fn insert(&mut self, value: V) -> Key {
        self.len += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.value = Some(value);
            return Key {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len();
        self.slots.push(Slot {
            generation: self.epoch,
            value: Some(value),
        });
        Key {
            index,
            generation: self.epoch,
        }
    }

    /// Take the value out of `key`'s slot
    ///
    /// Returns `None` if the key is stale.
    pub fn remove(&mut self, key: Key) -> Option<V> {
        let slot = self.slots.get_mut(key.index)?;
        if slot.generation != key.generation {
            return None;
        }

        let value = slot.value.take()?;
        slot.generation += 1;
        self.free.push(key.index);
        self.len -= 1;
        Some(value)
    }

    /// Value behind `key`, if the key is live
    pub fn get(&self, key: Key) -> Option<&V> {
        self.slots
            .get(key.index)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    /// Mutable value behind `key`, if the key is live
    pub fn get_mut(&mut self, key: Key) -> Option<&mut V> {
        self.slots
            .get_mut(key.index)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Number of live values
    pub fn len(&self) -> usize {
        self.len
    }

    /// Copy the arena slot for slot, keeping every key valid in the copy
    ///
    /// Stops at the first failing copy; `self` is never touched.
    pub fn try_duplicate<E>(&self, mut copy: impl FnMut(&V) -> Result<V, E>) -> Result<Self, E> {
        let mut slots = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let value = match &slot.value {
                Some(value) => Some(copy(value)?),
                None => None,
            };
            slots.push(Slot {
                generation: slot.generation,
                value,
            });
        }

        Ok(Self {
            slots,
            free: self.free.clone(),
            len: self.len,
            epoch: self.epoch,
        })
    }
}

/// Panics on a stale key; internal links are kept live by the playlist state
impl<V> Index<Key> for Arena<V> {
    type Output = V;

    fn index(&self, key: Key) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("stale arena key {key:?}"),
        }
    }
}

impl<V> IndexMut<Key> for Arena<V> {
    fn index_mut(&mut self, key: Key) -> &mut V {
        match self.get_mut(key) {
            Some(value) => value,
            None => panic!("stale arena key {key:?}"),
        }
    }
}
