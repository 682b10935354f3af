//! Bounded Map: fixed-capacity map with insertion-order eviction
//!
//! Values live in a slot arena; a hash index maps keys to slots and a queue
//! records insertion order. When an insert pushes the map past capacity the
//! oldest-inserted key is evicted, no matter how recently it was read.

use std::borrow::Borrow;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// What an insert did, enough to reverse it
#[derive(Debug, Clone, PartialEq)]
pub enum Inserted<K, V> {
    /// The key existed; holds the value it replaced
    Replaced(V),
    /// The key was new; holds the entry it pushed out, if any
    Added { evicted: Option<(K, V)> },
}

impl<K, V> Inserted<K, V> {
    pub fn evicted(&self) -> Option<&(K, V)> {
        match self {
            Inserted::Added { evicted } => evicted.as_ref(),
            Inserted::Replaced(_) => None,
        }
    }
}

/// Capacity-capped, insertion-ordered map
#[derive(Debug, Clone)]
pub struct BoundedMap<K, V> {
    /// Slot arena; `None` marks a free slot
    slots: Vec<Option<(K, V)>>,
    /// Free slot indices for reuse
    free: Vec<usize>,
    /// Key -> slot
    index: HashMap<K, usize>,
    /// Slots in insertion order
    order: VecDeque<usize>,
    capacity: usize,
}

impl<K, V> BoundedMap<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Insert or replace. Replacing keeps the key's original position.
    pub fn insert(&mut self, key: K, value: V) -> Inserted<K, V> {
        if let Some(&slot) = self.index.get(&key) {
            return match self.slots[slot].replace((key, value)) {
                Some((_, old)) => Inserted::Replaced(old),
                None => Inserted::Added { evicted: None },
            };
        }

        let slot = self.occupy(key, value);
        self.order.push_back(slot);

        let evicted = if self.index.len() > self.capacity {
            self.evict_oldest()
        } else {
            None
        };
        Inserted::Added { evicted }
    }

    /// Reverse an insert of `key`, restoring any replaced or evicted entry
    /// to its previous position
    pub fn undo_insert(&mut self, key: &K, inserted: Inserted<K, V>) {
        match inserted {
            Inserted::Replaced(old) => {
                if let Some(&slot) = self.index.get(key) {
                    self.slots[slot] = Some((key.clone(), old));
                }
            }
            Inserted::Added { evicted } => {
                self.remove(key);
                if let Some((k, v)) = evicted {
                    let slot = self.occupy(k, v);
                    self.order.push_front(slot);
                }
            }
        }
    }

    fn occupy(&mut self, key: K, value: V) -> usize {
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some((key.clone(), value));
                slot
            }
            None => {
                self.slots.push(Some((key.clone(), value)));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, slot);
        slot
    }

    fn evict_oldest(&mut self) -> Option<(K, V)> {
        let slot = self.order.pop_front()?;
        let (key, value) = self.slots[slot].take()?;
        self.index.remove(&key);
        self.free.push(slot);
        Some((key, value))
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = *self.index.get(key)?;
        self.slots[slot].as_ref().map(|(_, v)| v)
    }

    /// Remove one entry, freeing its slot
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.index.remove(key)?;
        self.order.retain(|&s| s != slot);
        self.free.push(slot);
        self.slots[slot].take().map(|(_, v)| v)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order
            .iter()
            .filter_map(|&slot| self.slots[slot].as_ref().map(|(k, v)| (k, v)))
    }

    /// Values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    /// Drop every entry matching the predicate, returning how many went
    pub fn remove_where(&mut self, mut pred: impl FnMut(&K, &V) -> bool) -> usize {
        let mut removed = 0;
        let slots = &mut self.slots;
        let index = &mut self.index;
        let free = &mut self.free;
        self.order.retain(|&slot| {
            let doomed = matches!(&slots[slot], Some((k, v)) if pred(k, v));
            if doomed {
                if let Some((k, _)) = slots[slot].take() {
                    index.remove(&k);
                }
                free.push(slot);
                removed += 1;
            }
            !doomed
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
