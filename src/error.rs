//! Caller-facing error types.
//!
//! Transport and loader internals report failures through `anyhow`; this
//! module defines the small set of error kinds that actually reach a cache
//! caller. The enum is `Clone` because a single failed load is fanned out to
//! every caller coalesced onto the same in-flight request.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The caller passed an empty key.
    #[error("key must not be empty")]
    EmptyKey,

    /// The user-supplied loader failed. The message carries the loader's
    /// rendered error; the failure is never cached, so the next request for
    /// the same key invokes the loader again.
    #[error("loading key {key:?} failed: {message}")]
    Loader { key: String, message: String },

    /// The in-flight load this caller was waiting on was dropped before it
    /// produced a result.
    #[error("load for key {0:?} was abandoned before completing")]
    LoadAbandoned(String),
}
