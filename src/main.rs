use axum::extract::{Extension, Query};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get};
use meshcache::group::{self, GetterFn, Group, GroupStats, get_group, new_group};
use meshcache::transport::HttpPool;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use sysinfo::System;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!(
            "Usage: {} --bind <addr:port> [--peer <url>]... [--api <addr:port>]",
            args[0]
        );
        eprintln!("Example: {} --bind 127.0.0.1:8001", args[0]);
        eprintln!(
            "Example: {} --bind 127.0.0.1:8002 --peer http://127.0.0.1:8001 --api 127.0.0.1:9999",
            args[0]
        );

        std::process::exit(1);
    }

    let mut bind_addr: Option<SocketAddr> = None;
    let mut api_addr: Option<SocketAddr> = None;
    let mut peer_urls: Vec<String> = vec![];

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                bind_addr = Some(args[i + 1].parse()?);
                i += 2;
            }
            "--peer" => {
                peer_urls.push(args[i + 1].trim_end_matches('/').to_string());
                i += 2;
            }
            "--api" => {
                api_addr = Some(args[i + 1].parse()?);
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let bind_addr = bind_addr.expect("--bind is required");
    let self_url = format!("http://{}", bind_addr);

    tracing::info!("Starting cache node at {}", self_url);

    // 1. Demo group backed by the simulated slow database:
    let max_bytes = std::env::var("CACHE_MAX_BYTES")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(2 << 10);
    let scores = create_scores_group(max_bytes);

    // 2. Peer pool (the full cluster is this node plus every --peer):
    let pool = HttpPool::new(self_url.clone());
    let mut cluster: Vec<String> = vec![self_url.clone()];
    cluster.extend(peer_urls);
    cluster.sort();
    cluster.dedup();

    tracing::info!("Cluster peers: {:?}", cluster);
    pool.set_peers(cluster);
    scores.register_peers(pool.clone());

    // 3. Optional front-end API server, for clients rather than peers:
    if let Some(api_addr) = api_addr {
        let api_app = Router::new()
            .route("/api", get(handle_api_get))
            .route("/stats", get(handle_stats))
            .layer(Extension(pool.clone()));

        tokio::spawn(async move {
            tracing::info!("API server listening on {}", api_addr);
            let listener = tokio::net::TcpListener::bind(api_addr)
                .await
                .expect("failed to bind API address");
            if let Err(e) = axum::serve(listener, api_app).await {
                tracing::error!("API server failed: {}", e);
            }
        });
    }

    // 4. Cache server handling peer-to-peer fetches:
    tracing::info!("Cache server listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, pool.router()).await?;

    Ok(())
}

/// Builds the demo "scores" group over a simulated slow database.
fn create_scores_group(max_bytes: usize) -> Arc<Group> {
    let db: HashMap<String, String> = HashMap::from([
        ("Tom".to_string(), "630".to_string()),
        ("Jack".to_string(), "589".to_string()),
        ("Sam".to_string(), "567".to_string()),
    ]);

    new_group(
        "scores",
        max_bytes,
        GetterFn(move |key: String| {
            let db = db.clone();
            async move {
                tracing::info!("[SlowDB] search key {}", key);
                db.get(&key)
                    .map(|value| value.clone().into_bytes())
                    .ok_or_else(|| anyhow::anyhow!("key {} does not exist", key))
            }
        }),
    )
}

#[derive(Deserialize)]
struct ApiQuery {
    key: String,
}

#[derive(Serialize)]
struct NodeStatsResponse {
    self_url: String,
    groups: Vec<GroupStats>,
    cpu_usage: f32,
    mem_used_mb: u64,
    mem_total_mb: u64,
}

/// Client-facing read endpoint: `GET /api?key=Tom` returns the raw bytes.
async fn handle_api_get(Query(query): Query<ApiQuery>) -> Response {
    let Some(scores) = get_group("scores") else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "scores group missing").into_response();
    };

    match scores.get(&query.key).await {
        Ok(view) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            view.into_bytes(),
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Node stats: per-group counters plus process CPU and memory.
async fn handle_stats(Extension(pool): Extension<Arc<HttpPool>>) -> Json<NodeStatsResponse> {
    let groups: Vec<GroupStats> = group::group_names()
        .iter()
        .filter_map(|name| get_group(name))
        .map(|g| g.stats())
        .collect();

    let mut sys = System::new_all();
    sys.refresh_cpu();
    sys.refresh_memory();
    let cpu_usage = sys.global_cpu_info().cpu_usage();
    // sysinfo returns bytes for memory values.
    let mem_total_mb = sys.total_memory() / (1024 * 1024);
    let mem_used_mb = sys.used_memory() / (1024 * 1024);

    Json(NodeStatsResponse {
        self_url: pool.self_url().to_string(),
        groups,
        cpu_usage,
        mem_used_mb,
        mem_total_mb,
    })
}
