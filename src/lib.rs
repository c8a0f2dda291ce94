//! Cooperative Distributed Cache Library
//!
//! This library crate defines the core modules of a peer-to-peer in-memory
//! cache. It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of five loosely coupled subsystems:
//!
//! - **`store`**: The bounded local cache. An LRU store charged by entry byte
//!   size, handing out immutable byte views of cached values.
//! - **`ring`**: The key placement layer. A consistent-hash ring with virtual
//!   nodes that maps every key to exactly one owning peer.
//! - **`flight`**: The duplicate-suppression layer. Collapses concurrent
//!   loads for the same key into a single in-flight call whose result is
//!   shared by every waiter.
//! - **`group`**: The orchestration layer. A named cache namespace that
//!   sequences local-hit -> remote-peer -> local-load and owns the admission
//!   policy, plus the peer contracts the transport plugs into.
//! - **`transport`**: The internode communication layer. An HTTP pool that
//!   routes keys to their owners and fetches cached bytes from remote peers.

pub mod error;
pub mod flight;
pub mod group;
pub mod ring;
pub mod store;
pub mod transport;
