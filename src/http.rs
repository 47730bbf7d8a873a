//! HTTP boundary
//!
//! A thin axum adapter over `Registry`: each handler does parameter
//! extraction, one registry call, and status-code translation.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::error::NoidError;
use crate::logging::{generate_correlation_id, log_api_request, log_api_response};
use crate::registry::Registry;
use crate::storage::PoolInfo;

pub type AppState = Arc<Registry>;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct EmptyErrorBody {
    error: String,
    #[serde(flatten)]
    pool: PoolInfo,
}

/// Map a registry error to its HTTP status code.
fn status_for(err: &NoidError) -> StatusCode {
    match err {
        NoidError::BadTemplate => StatusCode::BAD_REQUEST,
        NoidError::NameExists(_) => StatusCode::CONFLICT,
        NoidError::NoSuchPool(_) => StatusCode::NOT_FOUND,
        NoidError::PoolEmpty(_) => StatusCode::FORBIDDEN,
        NoidError::PoolClosed(_) => StatusCode::BAD_REQUEST,
        NoidError::InvalidId(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: NoidError) -> (StatusCode, Json<ErrorBody>) {
    let status = status_for(&err);
    (status, Json(ErrorBody { error: err.to_string() }))
}

async fn list_pools(State(registry): State<AppState>) -> impl IntoResponse {
    Json(registry.all_pools().await)
}

#[derive(serde::Deserialize)]
struct NewPoolParams {
    name: Option<String>,
    template: Option<String>,
}

async fn new_pool(
    State(registry): State<AppState>,
    Query(params): Query<NewPoolParams>,
) -> impl IntoResponse {
    let (name, template) = match (params.name, params.template) {
        (Some(n), Some(t)) if !n.is_empty() && !t.is_empty() => (n, t),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody { error: "missing arguments".to_string() }),
            )
                .into_response()
        }
    };

    match registry.add_pool(&name, &template).await {
        Ok(info) => (StatusCode::CREATED, Json(info)).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

async fn show_pool(
    State(registry): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match registry.get_pool(&name).await {
        Ok(info) => (StatusCode::OK, Json(info)).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

async fn open_pool(State(registry): State<AppState>, Path(name): Path<String>) -> impl IntoResponse {
    handle_open_close(registry, &name, false).await
}

async fn close_pool(State(registry): State<AppState>, Path(name): Path<String>) -> impl IntoResponse {
    handle_open_close(registry, &name, true).await
}

async fn handle_open_close(registry: AppState, name: &str, closed: bool) -> axum::response::Response {
    match registry.set_pool_state(name, closed).await {
        Ok(info) => (StatusCode::OK, Json(info)).into_response(),
        Err(NoidError::PoolEmpty(_)) => {
            let current = registry.get_pool(name).await.ok();
            match current {
                Some(pool) => (
                    StatusCode::FORBIDDEN,
                    Json(EmptyErrorBody { error: "pool is empty".to_string(), pool }),
                )
                    .into_response(),
                None => (StatusCode::FORBIDDEN, Json(ErrorBody { error: "pool is empty".to_string() })).into_response(),
            }
        }
        Err(e) => error_response(e).into_response(),
    }
}

async fn mint(
    State(registry): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let count: usize = match params.get("n") {
        None => 1,
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if (1..=1000).contains(&n) => n as usize,
            _ => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorBody { error: "count is out of range".to_string() }),
                )
                    .into_response()
            }
        },
    };

    match registry.pool_mint(&name, count).await {
        Ok(ids) => (StatusCode::OK, Json(ids)).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

async fn advance_past(
    State(registry): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let id = match params.get("id") {
        Some(id) if !id.is_empty() => id.clone(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody { error: "missing id".to_string() }),
            )
                .into_response()
        }
    };

    match registry.pool_advance_past(&name, &id).await {
        Ok(info) => (StatusCode::OK, Json(info)).into_response(),
        Err(NoidError::InvalidId(_)) => {
            let current = registry.get_pool(&name).await.ok();
            match current {
                Some(pool) => (
                    StatusCode::BAD_REQUEST,
                    Json(EmptyErrorBody { error: "invalid id".to_string(), pool }),
                )
                    .into_response(),
                None => (StatusCode::BAD_REQUEST, Json(ErrorBody { error: "invalid id".to_string() })).into_response(),
            }
        }
        Err(e) => error_response(e).into_response(),
    }
}

#[derive(Serialize)]
struct StatsBody {
    #[serde(rename = "Version")]
    version: String,
}

async fn stats() -> impl IntoResponse {
    Json(StatsBody { version: env!("CARGO_PKG_VERSION").to_string() })
}

/// A correlation-id-tagging middleware layer, purely for observability —
/// it never changes a response's documented status or body.
async fn with_correlation_id(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let correlation_id = generate_correlation_id();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    log_api_request(&method, &path, &correlation_id);

    let start = std::time::Instant::now();
    let response = next.run(req).await;
    let duration_ms = start.elapsed().as_millis() as u64;
    log_api_response(&method, &path, response.status().as_u16(), duration_ms, &correlation_id);

    response
}

pub fn create_router(registry: Registry) -> Router {
    let state: AppState = Arc::new(registry);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/pools", get(list_pools).post(new_pool))
        .route("/pools/:poolname", get(show_pool))
        .route("/pools/:poolname/open", put(open_pool))
        .route("/pools/:poolname/close", put(close_pool))
        .route("/pools/:poolname/mint", post(mint))
        .route("/pools/:poolname/advancePast", post(advance_past))
        .route("/stats", get(stats))
        .layer(axum::middleware::from_fn(with_correlation_id))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server(registry: Registry, port: u16) -> Result<(), std::io::Error> {
    let app = create_router(registry);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NullPoolStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(Registry::new(Arc::new(NullPoolStore)))
    }

    #[tokio::test]
    async fn list_pools_starts_empty() {
        let response = app()
            .oneshot(Request::builder().uri("/pools").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_pool_then_show_it() {
        let app = app();
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/pools?name=abc&template=.sddd")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(Request::builder().uri("/pools/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_pool_missing_args_is_bad_request() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/pools")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn show_missing_pool_is_404() {
        let response = app()
            .oneshot(Request::builder().uri("/pools/ghost").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_name_is_409() {
        let app = app();
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/pools?name=abc&template=.sddd")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/pools?name=abc&template=.sddd")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn mint_then_stats_endpoint_ok() {
        let app = app();
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/pools?name=abc&template=.sddd")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/pools/abc/mint?n=3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
