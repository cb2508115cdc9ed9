use crate::config::Config;
use crate::state::AppState;
use crate::timeseries::timeseries_handler;
use axum::{
    http::{header, HeaderValue, Method},
    routing::post,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: Arc<AppState>, cfg: &Config) -> anyhow::Result<Router> {
    let origin: HeaderValue = cfg
        .allowed_origin()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid allowed_origin '{}': {}", cfg.allowed_origin(), e))?;

    // A list (not `exact`) so other origins get no allow-origin header at all.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(vec![origin]))
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::HEAD,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers(vec![header::CONTENT_TYPE]);

    Ok(Router::new()
        .route("/api/timeseries", post(timeseries_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}
