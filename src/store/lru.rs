//! Byte-bounded LRU store.
//!
//! Entries live in a slot vector threaded by an intrusive doubly-linked
//! recency list, with a key index pointing at slots. All operations are O(1);
//! freed slots are recycled through a free stack so a long-lived store does
//! not grow past its high-water entry count.

use std::collections::HashMap;

use super::view::ByteView;

/// Callback invoked synchronously for every evicted entry.
///
/// Must not call back into the store.
pub type EvictCallback = Box<dyn FnMut(&str, &ByteView) + Send>;

struct Slot {
    key: String,
    value: ByteView,
    prev: Option<usize>,
    next: Option<usize>,
}

impl Slot {
    fn charge(&self) -> usize {
        self.key.len() + self.value.len()
    }
}

/// LRU store limited by the total byte charge of its entries.
///
/// The charge of an entry is `key length + value length`. A `max_bytes` of 0
/// disables eviction entirely. Not safe for concurrent access; callers must
/// serialize externally.
pub struct LruStore {
    max_bytes: usize,
    used: usize,
    index: HashMap<String, usize>,
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
    /// Most recently used entry.
    head: Option<usize>,
    /// Eviction candidate.
    tail: Option<usize>,
    on_evict: Option<EvictCallback>,
}

impl LruStore {
    pub fn new(max_bytes: usize, on_evict: Option<EvictCallback>) -> Self {
        Self {
            max_bytes,
            used: 0,
            index: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            on_evict,
        }
    }

    /// Looks up `key`, promoting the entry to the most-recently-used
    /// position on a hit.
    pub fn get(&mut self, key: &str) -> Option<ByteView> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        Some(self.slot(idx).value.clone())
    }

    /// Looks up `key` without touching recency.
    pub fn peek(&self, key: &str) -> Option<ByteView> {
        let idx = *self.index.get(key)?;
        Some(self.slot(idx).value.clone())
    }

    /// Inserts `key` or updates its value, promoting it to the
    /// most-recently-used position, then evicts from the LRU end while over
    /// budget.
    ///
    /// The entry touched by this call is never evicted by it: a value larger
    /// than the whole budget is still admitted (pushing everything else out)
    /// and only falls out on the next insertion.
    pub fn add(&mut self, key: &str, value: ByteView) {
        let idx = match self.index.get(key) {
            Some(&idx) => {
                let new_len = value.len();
                let slot = self.slot_mut(idx);
                let old_len = slot.value.len();
                slot.value = value;
                self.used = self.used - old_len + new_len;
                self.move_to_front(idx);
                idx
            }
            None => {
                let slot = Slot {
                    key: key.to_string(),
                    value,
                    prev: None,
                    next: None,
                };
                self.used += slot.charge();
                let idx = self.alloc(slot);
                self.index.insert(key.to_string(), idx);
                self.push_front(idx);
                idx
            }
        };

        while self.max_bytes > 0 && self.used > self.max_bytes {
            match self.tail {
                Some(tail) if tail != idx => self.remove_oldest(),
                _ => break,
            }
        }
    }

    /// Pops the least-recently-used entry and invokes the eviction callback,
    /// if any. No-op on an empty store.
    pub fn remove_oldest(&mut self) {
        let Some(tail) = self.tail else {
            return;
        };
        self.unlink(tail);
        let slot = self.slots[tail].take().expect("tail slot occupied");
        self.index.remove(&slot.key);
        self.free.push(tail);
        self.used -= slot.charge();

        if let Some(on_evict) = self.on_evict.as_mut() {
            on_evict(&slot.key, &slot.value);
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Current total byte charge of live entries.
    pub fn used_bytes(&self) -> usize {
        self.used
    }

    fn slot(&self, idx: usize) -> &Slot {
        self.slots[idx].as_ref().expect("indexed slot occupied")
    }

    fn slot_mut(&mut self, idx: usize) -> &mut Slot {
        self.slots[idx].as_mut().expect("indexed slot occupied")
    }

    fn alloc(&mut self, slot: Slot) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(slot);
                idx
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        }
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let slot = self.slot_mut(idx);
            slot.prev = None;
            slot.next = old_head;
        }
        if let Some(h) = old_head {
            self.slot_mut(h).prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let slot = self.slot(idx);
            (slot.prev, slot.next)
        };
        match prev {
            Some(p) => self.slot_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slot_mut(n).prev = prev,
            None => self.tail = prev,
        }
        let slot = self.slot_mut(idx);
        slot.prev = None;
        slot.next = None;
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }
}
