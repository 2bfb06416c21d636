//! Bounded color → index cache with LRU eviction.

use std::collections::HashMap;

/// Default number of cached colors per palette.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

const NIL: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct Entry {
    color: u32,
    index: u8,
    prev: u32,
    next: u32,
}

/// Least-recently-used cache of nearest-color answers.
///
/// Entries live in a slab linked most-recent first; the map points into the
/// slab. Lookups and inserts are O(1) and the entry count never exceeds the
/// capacity.
#[derive(Debug)]
pub(crate) struct ColorCache {
    map: HashMap<u32, u32>,
    entries: Vec<Entry>,
    head: u32,
    tail: u32,
    capacity: usize,
}

impl ColorCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity.min(DEFAULT_CACHE_CAPACITY)),
            entries: Vec::new(),
            head: NIL,
            tail: NIL,
            capacity,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cached index for `color`, marking it most recently used.
    pub(crate) fn get(&mut self, color: u32) -> Option<u8> {
        let slot = *self.map.get(&color)?;
        self.touch(slot);
        Some(self.entries[slot as usize].index)
    }

    /// Remember `color → index`, evicting the least recently used entry when full.
    pub(crate) fn insert(&mut self, color: u32, index: u8) {
        if self.capacity == 0 {
            return;
        }
        if let Some(&slot) = self.map.get(&color) {
            self.entries[slot as usize].index = index;
            self.touch(slot);
            return;
        }

        let slot = if self.entries.len() < self.capacity {
            self.entries.push(Entry {
                color,
                index,
                prev: NIL,
                next: NIL,
            });
            (self.entries.len() - 1) as u32
        } else {
            // Reuse the tail slot.
            let slot = self.tail;
            self.unlink(slot);
            let evicted = self.entries[slot as usize].color;
            self.map.remove(&evicted);
            let entry = &mut self.entries[slot as usize];
            entry.color = color;
            entry.index = index;
            slot
        };

        self.push_front(slot);
        self.map.insert(color, slot);
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
        self.entries.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    fn touch(&mut self, slot: u32) {
        if self.head != slot {
            self.unlink(slot);
            self.push_front(slot);
        }
    }

    fn unlink(&mut self, slot: u32) {
        let Entry { prev, next, .. } = self.entries[slot as usize];
        if prev == NIL {
            self.head = next;
        } else {
            self.entries[prev as usize].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.entries[next as usize].prev = prev;
        }
    }

    fn push_front(&mut self, slot: u32) {
        {
            let entry = &mut self.entries[slot as usize];
            entry.prev = NIL;
            entry.next = self.head;
        }
        if self.head != NIL {
            self.entries[self.head as usize].prev = slot;
        }
        self.head = slot;
        if self.tail == NIL {
            self.tail = slot;
        }
    }
}
