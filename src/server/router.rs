use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{health, query};
use crate::state::AppState;

pub const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Creates the application router.
///
/// - `POST /` answers a query with a prompt
/// - `GET /health` liveness probe
///
/// Pre-flight `OPTIONS` requests are answered by the CORS layer before any
/// handler runs; the body is then replaced with a plain `ok`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(query::answer_query))
        .route("/health", get(health::health))
        .with_state(state)
        .layer(middleware::map_response(with_cors_headers))
        .layer(build_cors_layer())
        .layer(middleware::from_fn(acknowledge_preflight))
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

async fn acknowledge_preflight(request: Request, next: Next) -> Response {
    let is_preflight = request.method() == Method::OPTIONS;
    let response = next.run(request).await;
    if !is_preflight {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    Response::from_parts(parts, Body::from("ok"))
}

/// `CorsLayer` only sends the allowed header list on pre-flight responses;
/// browser clients of this endpoint expect it on every response.
async fn with_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers
        .entry(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .or_insert(HeaderValue::from_static("*"));
    headers
        .entry(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .or_insert(HeaderValue::from_static(CORS_ALLOW_HEADERS));
    response
}
