//! Peer Contracts
//!
//! The two capabilities a transport must provide for groups to cooperate
//! across nodes. The orchestrator performs no network I/O itself; it only
//! composes these interfaces, so any transport (HTTP, gRPC, in-process
//! stubs in tests) can plug in.

use async_trait::async_trait;
use std::sync::Arc;

/// Selects the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns a fetcher for the owning peer, or `None` when the local node
    /// owns `key` or no peers are registered.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>>;
}

/// Fetches a cached value from one remote peer.
#[async_trait]
pub trait PeerFetcher: Send + Sync {
    /// Retrieves the raw bytes for `key` in the named group.
    async fn fetch(&self, group: &str, key: &str) -> anyhow::Result<Vec<u8>>;
}
