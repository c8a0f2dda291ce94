//! Transport Constants
//!
//! The wire contract between peers is deliberately thin: a GET under the
//! base path, the group name and key as percent-escaped path segments, and
//! the raw value bytes as the response body. Constants here are shared by
//! the pool (client side) and the handlers (server side).

use std::time::Duration;

/// Path prefix for peer-to-peer cache requests. A dedicated prefix keeps the
/// cache endpoint out of the way of whatever else the host serves.
pub const DEFAULT_BASE_PATH: &str = "/_meshcache/";

/// Virtual nodes per real peer on the placement ring.
pub const DEFAULT_REPLICAS: usize = 50;

/// Upper bound on a single peer fetch. A slow peer is treated as failed and
/// the requesting node falls back to its own loader.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(500);
