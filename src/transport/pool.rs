use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use axum::Router;
use axum::routing::get;

use super::handlers::handle_peer_get;
use super::protocol::{DEFAULT_BASE_PATH, DEFAULT_FETCH_TIMEOUT, DEFAULT_REPLICAS};
use crate::group::{PeerFetcher, PeerPicker};
use crate::ring::HashRing;

/// HTTP-backed peer pool.
///
/// Owns the placement ring and one fetcher per peer; both are replaced
/// together by [`set_peers`](HttpPool::set_peers) so a picker never sees a
/// ring and a fetcher map that disagree. Peers are identified by their base
/// URL (`http://host:port`), which doubles as their name on the ring.
pub struct HttpPool {
    self_url: String,
    base_path: String,
    fetch_timeout: Duration,
    state: Mutex<PoolState>,
    http_client: reqwest::Client,
}

struct PoolState {
    ring: HashRing,
    fetchers: HashMap<String, Arc<HttpFetcher>>,
}

impl HttpPool {
    /// Creates a pool identified by `self_url`, serving peers under the
    /// default base path.
    pub fn new(self_url: impl Into<String>) -> Arc<Self> {
        Self::with_base_path(self_url, DEFAULT_BASE_PATH)
    }

    pub fn with_base_path(self_url: impl Into<String>, base_path: &str) -> Arc<Self> {
        let fetch_timeout = std::env::var("FETCH_TIMEOUT_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT);

        Arc::new(Self {
            self_url: normalize_peer_url(self_url.into()),
            base_path: base_path.to_string(),
            fetch_timeout,
            state: Mutex::new(PoolState {
                ring: HashRing::new(DEFAULT_REPLICAS, None),
                fetchers: HashMap::new(),
            }),
            http_client: reqwest::Client::new(),
        })
    }

    /// Replaces the pool's peer set (the full cluster, this node included).
    ///
    /// Rebuilds the ring and the per-peer fetchers atomically under the pool
    /// lock.
    pub fn set_peers<I>(&self, peers: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let peers: Vec<String> = peers
            .into_iter()
            .map(|peer| normalize_peer_url(peer.into()))
            .collect();

        let mut ring = HashRing::new(DEFAULT_REPLICAS, None);
        ring.add(peers.iter().cloned());

        let fetchers = peers
            .iter()
            .map(|peer| {
                let fetcher = HttpFetcher::new(
                    format!("{}{}", peer, self.base_path),
                    self.fetch_timeout,
                    self.http_client.clone(),
                );
                (peer.clone(), Arc::new(fetcher))
            })
            .collect();

        let mut state = self.lock();
        state.ring = ring;
        state.fetchers = fetchers;

        tracing::info!("peer set updated, {} peer(s) on the ring", peers.len());
    }

    /// Router serving this node's peer endpoint.
    pub fn router(&self) -> Router {
        Router::new().route(&format!("{}:group/:key", self.base_path), get(handle_peer_get))
    }

    pub fn self_url(&self) -> &str {
        &self.self_url
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PoolState> {
        self.state.lock().expect("pool lock poisoned")
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerFetcher>> {
        let state = self.lock();
        let owner = state.ring.get(key)?;

        if owner == self.self_url {
            tracing::debug!("key {} is owned locally", key);
            return None;
        }

        let fetcher = state.fetchers.get(owner)?.clone();
        tracing::debug!("key {} is owned by peer {}", key, owner);
        Some(fetcher as Arc<dyn PeerFetcher>)
    }
}

/// Client side of one remote peer's cache endpoint.
pub struct HttpFetcher {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpFetcher {
    pub(crate) fn new(base_url: impl Into<String>, timeout: Duration, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            client,
        }
    }
}

#[async_trait]
impl PeerFetcher for HttpFetcher {
    /// Single timed GET; non-2xx is an error. The caller decides whether to
    /// fall back, nothing is retried here.
    async fn fetch(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        let mut url = reqwest::Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("peer url {} cannot be a base", self.base_url))?
            .pop_if_empty()
            .extend([group, key]);

        let response = self.client.get(url).timeout(self.timeout).send().await?;

        if !response.status().is_success() {
            bail!("peer returned {}", response.status());
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Peer URLs act as ring names; a stray trailing slash would make the same
/// peer hash differently on different nodes.
fn normalize_peer_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
