//! Cache Orchestration Module
//!
//! The core component coordinating where a cached value comes from.
//!
//! ## Overview
//! A [`Group`] is a named cache namespace owning a bounded local store, a
//! user-supplied loader, and a request coalescer. Every read follows the same
//! sequence:
//!
//! 1. **Local hit**: If the value is in the local store, serve it — a hit is
//!    never route-dependent.
//! 2. **Remote peer**: Otherwise, if a peer picker is registered and the key
//!    hashes to another node, fetch the bytes from that node.
//! 3. **Local load**: If the key hashes to this node, no picker is attached,
//!    or the remote fetch failed, invoke the loader and admit the result.
//!
//! Only locally loaded values are admitted to the local store: each key has
//! exactly one authoritative cache location, and its owner bears the
//! eviction cost.
//!
//! ## Submodules
//! - **`cache`**: Mutex wrapper making the LRU store safe to share.
//! - **`peers`**: The contracts a transport implements to plug in.

pub mod cache;
pub mod peers;

mod orchestrator;

pub use orchestrator::{Getter, GetterFn, Group, GroupStats, get_group, group_names, new_group};
pub use peers::{PeerFetcher, PeerPicker};

#[cfg(test)]
mod tests;
