//! Request Coalescing Module
//!
//! Suppresses duplicate concurrent loads for the same key.
//!
//! ## Core Mechanism
//! The first caller for a key (the leader) registers an in-flight call and
//! runs the load; every caller arriving while the call is pending (a
//! follower) waits for the leader's result instead of loading again. The
//! shared result — success or error — is handed to all of them, and the call
//! record is removed as soon as the leader finishes. Sharing is therefore
//! strictly in-flight: a caller arriving after completion starts a fresh
//! load, and errors are never memoized.

pub mod registry;

pub use registry::SingleFlight;
