use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::content::{ContentCatalog, ContentItem, ContentSource};
use crate::error::FeedError;
use crate::feed::{self, DEFAULT_FEED_LIMIT};
use crate::profile::{ProfileSource, StubProfileSource};
use crate::query::{QueryInterpretation, QueryRulesHandle};

#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileSource>,
    pub content: Arc<dyn ContentSource>,
    pub query_rules: QueryRulesHandle,
}

impl AppState {
    pub fn new(
        profiles: Arc<dyn ProfileSource>,
        content: Arc<dyn ContentSource>,
        query_rules: QueryRulesHandle,
    ) -> Self {
        Self {
            profiles,
            content,
            query_rules,
        }
    }

    /// State wired the way the binary wires it: JSON-backed stub sources
    /// with seed fallbacks. Integration tests use this too.
    pub fn from_env(query_rules: QueryRulesHandle) -> Self {
        Self::new(
            Arc::new(StubProfileSource::load_from_file("profile.json")),
            Arc::new(ContentCatalog::load_from_file("content.json")),
            query_rules,
        )
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/feed/{user_id}", get(personalized_feed))
        .route("/custom-query", post(custom_query))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct FeedParams {
    #[serde(default)]
    limit: Option<usize>,
}

async fn personalized_feed(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    Query(params): Query<FeedParams>,
) -> Result<Json<Vec<ContentItem>>, FeedError> {
    counter!("feed_requests_total").increment(1);

    let limit = params.limit.unwrap_or(DEFAULT_FEED_LIMIT);
    let ranked =
        feed::personalized_feed(state.profiles.as_ref(), state.content.as_ref(), user_id, limit)
            .await
            .inspect_err(|e| {
                if matches!(e, FeedError::UserNotFound(_)) {
                    // Expected client error, not a fault.
                    counter!("feed_user_not_found_total").increment(1);
                    info!(user_id, "feed request for unknown user");
                }
            })?;

    Ok(Json(ranked))
}

#[derive(serde::Deserialize)]
struct CustomQueryReq {
    user_id: u64,
    query: String,
}

async fn custom_query(
    State(state): State<AppState>,
    Json(body): Json<CustomQueryReq>,
) -> Json<QueryInterpretation> {
    counter!("query_requests_total").increment(1);
    Json(state.query_rules.interpret(body.user_id, &body.query))
}
