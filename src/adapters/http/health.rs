//! Liveness endpoint with real-time layer counters.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::adapters::websocket::RoomRegistry;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: &'static str,
    pub connections: usize,
    pub rooms: usize,
}

/// GET /health
pub async fn health(State(registry): State<Arc<RoomRegistry>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        connections: registry.connection_count().await,
        rooms: registry.active_rooms().await.len(),
    })
}

pub fn health_router(registry: Arc<RoomRegistry>) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ConnectionId, RoomName};

    #[tokio::test]
    async fn health_reports_counts() {
        let registry = Arc::new(RoomRegistry::new());
        let id = ConnectionId::new();
        let _rx = registry.connect(id, 4).await;
        registry.join(id, &RoomName::forum()).await.unwrap();

        let Json(body) = health(State(registry)).await;

        assert_eq!(
            body,
            HealthResponse {
                status: "ok",
                connections: 1,
                rooms: 1
            }
        );
    }
}
