mod rankings;
mod stats;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use clipstats_core::Platform;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::middleware::{request_id, require_bearer_auth, AuthState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<AppContext>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "forbidden" => StatusCode::FORBIDDEN,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub fn build_app(state: AppState, auth: AuthState, allowed_origins: &[String]) -> Router {
    let cors = build_cors(allowed_origins);

    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/stats/:clip_id", get(stats::get_stats))
        .route("/rankings/weekly-clips", get(rankings::weekly_clips))
        .route(
            "/rankings/weekly-campaigns",
            get(rankings::weekly_campaigns),
        );

    let protected_routes = Router::new()
        .route("/stats/refresh/:clip_id", post(stats::refresh_stats))
        .route("/stats/batch-refresh", post(stats::batch_refresh))
        .route("/rankings/calculate", post(rankings::calculate))
        .layer(axum_middleware::from_fn_with_state(
            auth,
            require_bearer_auth,
        ));

    public_routes
        .merge(protected_routes)
        .layer(axum_middleware::from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ]);

    if allowed_origins.is_empty() {
        base.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        base.allow_origin(AllowOrigin::list(origins))
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

async fn health(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> impl IntoResponse {
    let database = match clipstats_db::ping(&state.ctx.pool).await {
        Ok(()) => "up",
        Err(e) => {
            tracing::error!(error = %e, "health check: database ping failed");
            "down"
        }
    };
    let status = if database == "up" { "ok" } else { "degraded" };
    Json(ApiResponse {
        data: HealthData { status, database },
        meta: ResponseMeta::new(request_id.0),
    })
}

#[derive(Debug, Serialize)]
struct ReadyData {
    database: &'static str,
    cache: &'static str,
}

/// Readiness gates on the stores the read path depends on: Postgres and the
/// stats cache.
async fn ready(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> axum::response::Response {
    let database = clipstats_db::ping(&state.ctx.pool).await.is_ok();
    let cache = state
        .ctx
        .cache
        .get(Platform::Youtube, "readiness-probe")
        .await
        .is_ok();

    let data = ReadyData {
        database: if database { "up" } else { "down" },
        cache: if cache { "up" } else { "down" },
    };
    let status = if database && cache {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(ApiResponse {
            data,
            meta: ResponseMeta::new(request_id.0),
        }),
    )
        .into_response()
}
