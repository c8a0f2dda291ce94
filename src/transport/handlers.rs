//! Peer Endpoint Handlers
//!
//! The server half of the wire contract: a peer asks for
//! `GET <base>/:group/:key` and receives the raw value bytes. The handler
//! goes through the full group read path, so a node asked for a key it
//! happens to own but has not cached yet will load and admit it.

use axum::extract::Path;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::error::CacheError;
use crate::group::get_group;

/// Serves the raw cached bytes for a group/key pair.
pub async fn handle_peer_get(Path((group_name, key)): Path<(String, String)>) -> Response {
    tracing::debug!("peer request for group {} key {}", group_name, key);

    let Some(group) = get_group(&group_name) else {
        return (
            StatusCode::NOT_FOUND,
            format!("no such group: {}", group_name),
        )
            .into_response();
    };

    match group.get(&key).await {
        Ok(view) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            view.into_bytes(),
        )
            .into_response(),
        Err(err @ CacheError::EmptyKey) => {
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
        Err(err) => {
            tracing::error!(
                "peer request for group {} key {} failed: {}",
                group_name,
                key,
                err
            );
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}
