use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;

use super::cache::SharedCache;
use super::peers::PeerPicker;
use crate::error::CacheError;
use crate::flight::SingleFlight;
use crate::store::ByteView;

/// User-supplied loader, invoked on a cache miss the local node must fill.
///
/// Calls are deduplicated per key while one is in flight; the returned bytes
/// are detached from the loader's buffers on admission.
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

/// Adapter so a plain async closure can serve as a [`Getter`].
pub struct GetterFn<F>(pub F);

#[async_trait]
impl<F, Fut> Getter for GetterFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Vec<u8>>> + Send,
{
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        (self.0)(key.to_string()).await
    }
}

static GROUPS: OnceLock<DashMap<String, Arc<Group>>> = OnceLock::new();

fn registry() -> &'static DashMap<String, Arc<Group>> {
    GROUPS.get_or_init(DashMap::new)
}

/// Creates a group and registers it in the process-wide registry.
///
/// Registering a second group under an existing name replaces the previous
/// instance (callers holding the old `Arc` keep using it, new lookups see
/// the replacement).
pub fn new_group(name: &str, max_bytes: usize, getter: impl Getter + 'static) -> Arc<Group> {
    let group = Arc::new(Group {
        name: name.to_string(),
        getter: Arc::new(getter),
        cache: SharedCache::new(max_bytes),
        peers: OnceLock::new(),
        flight: SingleFlight::new(),
        stats: Counters::default(),
    });

    if registry().insert(name.to_string(), group.clone()).is_some() {
        tracing::warn!("group {} re-registered, previous instance replaced", name);
    }
    group
}

/// Looks up a previously created group by name.
pub fn get_group(name: &str) -> Option<Arc<Group>> {
    registry().get(name).map(|entry| entry.value().clone())
}

/// A named cache namespace.
///
/// Owns its local store and request coalescer; holds a non-owning handle to
/// the peer picker supplied by the transport.
pub struct Group {
    name: String,
    getter: Arc<dyn Getter>,
    cache: SharedCache,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    flight: SingleFlight<ByteView>,
    stats: Counters,
}

#[derive(Default)]
struct Counters {
    gets: AtomicU64,
    hits: AtomicU64,
    peer_fetches: AtomicU64,
    peer_errors: AtomicU64,
    local_loads: AtomicU64,
    loader_errors: AtomicU64,
}

/// Point-in-time snapshot of a group's counters, served by the stats API.
#[derive(Debug, Clone, Serialize)]
pub struct GroupStats {
    pub name: String,
    pub entries: usize,
    pub used_bytes: usize,
    pub gets: u64,
    pub hits: u64,
    pub peer_fetches: u64,
    pub peer_errors: u64,
    pub local_loads: u64,
    pub loader_errors: u64,
}

impl Group {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attaches the transport's peer picker.
    ///
    /// May be called at most once per group; a second call is a programming
    /// error and panics.
    pub fn register_peers(&self, picker: Arc<dyn PeerPicker>) {
        if self.peers.set(picker).is_err() {
            panic!("register_peers called more than once for group {}", self.name);
        }
    }

    /// Main read path: local hit, then remote peer, then local load.
    pub async fn get(&self, key: &str) -> Result<ByteView, CacheError> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }
        self.stats.gets.fetch_add(1, Ordering::Relaxed);

        if let Some(view) = self.cache.get(key) {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("[{}] cache hit for key {}", self.name, key);
            return Ok(view);
        }

        tracing::debug!("[{}] cache miss for key {}, loading", self.name, key);
        self.load(key).await
    }

    /// Loads a missing key, coalescing concurrent callers onto one in-flight
    /// call per key.
    async fn load(&self, key: &str) -> Result<ByteView, CacheError> {
        self.flight
            .run(key, || async {
                if let Some(picker) = self.peers.get()
                    && let Some(fetcher) = picker.pick_peer(key)
                {
                    match fetcher.fetch(&self.name, key).await {
                        Ok(bytes) => {
                            self.stats.peer_fetches.fetch_add(1, Ordering::Relaxed);
                            tracing::debug!("[{}] key {} served by peer", self.name, key);
                            // The owning peer holds the authoritative copy;
                            // it is not admitted here.
                            return Ok(ByteView::from(bytes));
                        }
                        Err(e) => {
                            self.stats.peer_errors.fetch_add(1, Ordering::Relaxed);
                            tracing::warn!(
                                "[{}] peer fetch for key {} failed, falling back to local load: {:#}",
                                self.name,
                                key,
                                e
                            );
                        }
                    }
                }
                self.load_locally(key).await
            })
            .await
    }

    async fn load_locally(&self, key: &str) -> Result<ByteView, CacheError> {
        let bytes = self.getter.get(key).await.map_err(|e| {
            self.stats.loader_errors.fetch_add(1, Ordering::Relaxed);
            CacheError::Loader {
                key: key.to_string(),
                message: format!("{:#}", e),
            }
        })?;

        let view = ByteView::from(bytes);
        self.cache.add(key, view.clone());
        self.stats.local_loads.fetch_add(1, Ordering::Relaxed);
        Ok(view)
    }

    /// Whether the local store currently holds `key`. Does not touch
    /// recency.
    pub fn is_cached(&self, key: &str) -> bool {
        self.cache.contains(key)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_used_bytes(&self) -> usize {
        self.cache.used_bytes()
    }

    pub fn stats(&self) -> GroupStats {
        GroupStats {
            name: self.name.clone(),
            entries: self.cache.len(),
            used_bytes: self.cache.used_bytes(),
            gets: self.stats.gets.load(Ordering::Relaxed),
            hits: self.stats.hits.load(Ordering::Relaxed),
            peer_fetches: self.stats.peer_fetches.load(Ordering::Relaxed),
            peer_errors: self.stats.peer_errors.load(Ordering::Relaxed),
            local_loads: self.stats.local_loads.load(Ordering::Relaxed),
            loader_errors: self.stats.loader_errors.load(Ordering::Relaxed),
        }
    }
}

/// Names of every registered group, for the stats API.
pub fn group_names() -> Vec<String> {
    registry().iter().map(|entry| entry.key().clone()).collect()
}
