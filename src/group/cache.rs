//! Mutex wrapper around the LRU store.
//!
//! The store itself is single-threaded; this wrapper serializes access for
//! the many concurrent readers a group serves. The lock only ever covers
//! in-memory map and list work — no I/O and no await points.

use std::sync::Mutex;

use crate::store::{ByteView, LruStore};

pub(crate) struct SharedCache {
    inner: Mutex<LruStore>,
}

impl SharedCache {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(LruStore::new(max_bytes, None)),
        }
    }

    pub fn get(&self, key: &str) -> Option<ByteView> {
        self.lock().get(key)
    }

    pub fn add(&self, key: &str, value: ByteView) {
        self.lock().add(key, value);
    }

    /// Presence check that leaves recency untouched.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().peek(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn used_bytes(&self) -> usize {
        self.lock().used_bytes()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruStore> {
        self.inner.lock().expect("cache lock poisoned")
    }
}
