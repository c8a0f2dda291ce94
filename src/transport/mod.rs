//! HTTP Transport Module
//!
//! Gives a node the ability to be reached by its peers and to reach them,
//! implementing the peer contracts the orchestrator composes.
//!
//! ## Core Concepts
//! - **Pool**: [`HttpPool`] owns the consistent-hash ring and one HTTP
//!   client handle per peer; it decides, per key, whether another node owns
//!   the value and which one.
//! - **Peer endpoint**: Every node serves `GET <base>/:group/:key` returning
//!   the raw cached bytes, so a peer fetch is a single round trip carrying no
//!   envelope.
//! - **Fetcher**: [`HttpFetcher`] is the client side of that endpoint, one
//!   per remote peer, all sharing the pool's connection pool.
//!
//! ## Submodules
//! - **`pool`**: Ring ownership, peer selection, and the HTTP client side.
//! - **`handlers`**: Axum request handlers for the peer endpoint.
//! - **`protocol`**: Path and tuning constants shared by both sides.

pub mod handlers;
pub mod pool;
pub mod protocol;

pub use pool::{HttpFetcher, HttpPool};
