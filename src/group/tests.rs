#[cfg(test)]
mod tests {
    use crate::error::CacheError;
    use crate::group::{Getter, GetterFn, PeerFetcher, PeerPicker, get_group, new_group};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::task::JoinSet;

    /// Simulated slow database shared by the scenarios below.
    fn slow_db() -> HashMap<String, String> {
        HashMap::from([
            ("Tom".to_string(), "630".to_string()),
            ("Jack".to_string(), "589".to_string()),
            ("Sam".to_string(), "567".to_string()),
        ])
    }

    type LoaderFuture = std::pin::Pin<Box<dyn Future<Output = anyhow::Result<Vec<u8>>> + Send>>;

    /// Loader over `slow_db` counting how often each key is loaded.
    fn counting_getter(
        loads: Arc<AtomicUsize>,
    ) -> GetterFn<impl Fn(String) -> LoaderFuture + Send + Sync> {
        let db = slow_db();
        GetterFn(move |key: String| {
            let db = db.clone();
            let loads = loads.clone();
            Box::pin(async move {
                loads.fetch_add(1, Ordering::SeqCst);
                match db.get(&key) {
                    Some(value) => Ok(value.clone().into_bytes()),
                    None => Err(anyhow!("key {} does not exist", key)),
                }
            }) as LoaderFuture
        })
    }

    // ============================================================
    // GETTER & REGISTRY
    // ============================================================

    #[tokio::test]
    async fn test_getter_fn_adapter() {
        let getter = GetterFn(|key: String| async move { Ok(key.into_bytes()) });
        let bytes = getter.get("key1").await.unwrap();
        assert_eq!(bytes, b"key1");
    }

    #[tokio::test]
    async fn test_group_registry_lookup() {
        new_group(
            "registry_demo",
            2048,
            GetterFn(|key: String| async move { Ok(key.into_bytes()) }),
        );

        let group = get_group("registry_demo").expect("group should be registered");
        assert_eq!(group.name(), "registry_demo");

        assert!(get_group("registry_demo_xxx").is_none());
    }

    #[test]
    #[should_panic(expected = "register_peers called more than once")]
    fn test_register_peers_twice_panics() {
        struct NoPeers;
        impl PeerPicker for NoPeers {
            fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerFetcher>> {
                None
            }
        }

        let group = new_group(
            "registry_double_peers",
            1024,
            GetterFn(|key: String| async move { Ok(key.into_bytes()) }),
        );
        group.register_peers(Arc::new(NoPeers));
        group.register_peers(Arc::new(NoPeers));
    }

    // ============================================================
    // LOCAL LOAD PATH
    // ============================================================

    #[tokio::test]
    async fn test_loader_results_are_cached() {
        let loads = Arc::new(AtomicUsize::new(0));
        let group = new_group("scores_local", 2048, counting_getter(loads.clone()));

        for (key, value) in slow_db() {
            // Cold: the loader fills the cache.
            let view = group.get(&key).await.expect("load should succeed");
            assert_eq!(view.to_string_lossy(), value);
            assert!(group.is_cached(&key), "{} should be admitted", key);

            // Warm: served from cache, the loader is not consulted again.
            let view = group.get(&key).await.expect("hit should succeed");
            assert_eq!(view.to_string_lossy(), value);
        }

        assert_eq!(loads.load(Ordering::SeqCst), slow_db().len());

        let err = group.get("unknown").await.expect_err("missing key");
        assert!(matches!(err, CacheError::Loader { .. }));
    }

    #[tokio::test]
    async fn test_empty_key_is_rejected() {
        let loads = Arc::new(AtomicUsize::new(0));
        let group = new_group("scores_empty_key", 2048, counting_getter(loads.clone()));

        let err = group.get("").await.expect_err("empty key");
        assert_eq!(err, CacheError::EmptyKey);
        assert_eq!(loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_loader_errors_are_not_cached() {
        let loads = Arc::new(AtomicUsize::new(0));
        let group = new_group("scores_no_negative", 2048, counting_getter(loads.clone()));

        for _ in 0..3 {
            group.get("unknown").await.expect_err("missing key");
        }

        // Every call re-invoked the loader.
        assert_eq!(loads.load(Ordering::SeqCst), 3);
        assert!(!group.is_cached("unknown"));
    }

    #[tokio::test]
    async fn test_concurrent_gets_coalesce_into_one_load() {
        let loads = Arc::new(AtomicUsize::new(0));
        let db = slow_db();
        let group = new_group(
            "scores_flight",
            2048,
            GetterFn(move |key: String| {
                let db = db.clone();
                let loads = loads.clone();
                async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    db.get(&key)
                        .map(|value| value.clone().into_bytes())
                        .ok_or_else(|| anyhow!("key {} does not exist", key))
                }
            }),
        );

        let mut tasks = JoinSet::new();
        for _ in 0..100 {
            let group = group.clone();
            tasks.spawn(async move { group.get("Tom").await });
        }

        while let Some(result) = tasks.join_next().await {
            let view = result.unwrap().expect("coalesced load should succeed");
            assert_eq!(view.to_string_lossy(), "630");
        }

        let stats = group.stats();
        assert_eq!(stats.local_loads, 1, "loader ran more than once");
        assert_eq!(stats.gets, 100);
    }

    // ============================================================
    // PEER ROUTING
    // ============================================================

    struct StubFetcher {
        calls: AtomicUsize,
        response: anyhow::Result<Vec<u8>>,
    }

    impl StubFetcher {
        fn ok(bytes: &[u8]) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response: Ok(bytes.to_vec()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response: Err(anyhow!("{}", message)),
            })
        }
    }

    #[async_trait]
    impl PeerFetcher for StubFetcher {
        async fn fetch(&self, _group: &str, _key: &str) -> anyhow::Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(bytes) => Ok(bytes.clone()),
                Err(e) => Err(anyhow!("{}", e)),
            }
        }
    }

    /// Picker that routes every key to one stub peer.
    struct StubPicker {
        fetcher: Arc<StubFetcher>,
    }

    impl PeerPicker for StubPicker {
        fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerFetcher>> {
            Some(self.fetcher.clone())
        }
    }

    #[tokio::test]
    async fn test_peer_routed_value_is_not_admitted_locally() {
        let loads = Arc::new(AtomicUsize::new(0));
        let group = new_group("scores_peer_routed", 2048, counting_getter(loads.clone()));

        let fetcher = StubFetcher::ok(b"630");
        group.register_peers(Arc::new(StubPicker {
            fetcher: fetcher.clone(),
        }));

        let view = group.get("Tom").await.expect("peer fetch should succeed");
        assert_eq!(view.to_string_lossy(), "630");

        // Exactly one fetch, no local load, no local admission.
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(loads.load(Ordering::SeqCst), 0);
        assert!(!group.is_cached("Tom"));
        assert_eq!(group.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_peer_failure_falls_back_to_local_load() {
        let loads = Arc::new(AtomicUsize::new(0));
        let group = new_group("scores_peer_fallback", 2048, counting_getter(loads.clone()));

        let fetcher = StubFetcher::failing("connection refused");
        group.register_peers(Arc::new(StubPicker {
            fetcher: fetcher.clone(),
        }));

        let view = group.get("Tom").await.expect("fallback should succeed");
        assert_eq!(view.to_string_lossy(), "630");

        // The remote failure was demoted; the local loader filled the cache.
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(group.is_cached("Tom"));
    }

    #[tokio::test]
    async fn test_self_owned_keys_load_locally() {
        struct SelfPicker;
        impl PeerPicker for SelfPicker {
            fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerFetcher>> {
                None
            }
        }

        let loads = Arc::new(AtomicUsize::new(0));
        let group = new_group("scores_self_owned", 2048, counting_getter(loads.clone()));
        group.register_peers(Arc::new(SelfPicker));

        let view = group.get("Jack").await.expect("local load should succeed");
        assert_eq!(view.to_string_lossy(), "589");
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(group.is_cached("Jack"));
    }
}
