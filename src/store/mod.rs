//! Local Cache Store Module
//!
//! Implements the bounded in-memory store backing every cache namespace.
//!
//! ## Core Concepts
//! - **Byte budget**: The store is limited by the total byte charge of its
//!   entries (`len(key) + len(value)`), not by entry count.
//! - **Recency**: Both lookups and insertions promote an entry to the
//!   most-recently-used position; eviction always removes the LRU end.
//! - **Immutable views**: Values are handed out as [`ByteView`]s, cheap
//!   clones of immutable byte blobs that stay valid after eviction.
//!
//! The store itself is not safe for concurrent access; the group layer wraps
//! it in a mutex.

pub mod lru;
pub mod view;

pub use lru::LruStore;
pub use view::ByteView;
