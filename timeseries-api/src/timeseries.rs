use crate::error::ApiError;
use crate::model::TimeSeriesRecord;
use crate::query::{FilterCriteria, LatestQuery};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    Json,
};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, error, info};

/// `POST /api/timeseries`: latest record per location matching the filter.
pub async fn timeseries_handler(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
) -> Result<Json<Vec<TimeSeriesRecord>>, ApiError> {
    let mut req = req;
    let body_bytes = to_bytes(req.body_mut(), state.max_request_body_bytes).await?;

    // The body is parsed as JSON whatever the content type says.
    let filter: FilterCriteria = match serde_json::from_slice(&body_bytes) {
        Ok(f) => f,
        Err(e) => {
            debug!("Rejecting filter body: {}", e);
            return Err(ApiError::InvalidFilter);
        }
    };
    debug!(?filter, "Received timeseries request");

    let query = LatestQuery::from_filter(&filter);
    let rows = match state.store.fetch_latest(&query).await {
        Ok(rows) => rows,
        Err(e) => {
            error!(error = %e, "Query execution failed");
            let detail = state.expose_error_details.then(|| e.to_string());
            return Err(ApiError::Query { detail });
        }
    };

    // One bad row fails the whole response; nothing partial is returned.
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match TimeSeriesRecord::try_from(row) {
            Ok(rec) => records.push(rec),
            Err(e) => {
                error!(error = %e, "Row scan failed");
                return Err(ApiError::RowMapping);
            }
        }
    }

    info!(records = records.len(), "Served timeseries query");
    Ok(Json(records))
}

async fn to_bytes(body: &mut Body, max_size: usize) -> Result<Bytes, ApiError> {
    use axum::body::HttpBody;
    use bytes::BytesMut;

    let mut buf = BytesMut::new();
    let mut total_size: usize = 0;

    while let Some(chunk_res) = body.data().await {
        let chunk = match chunk_res {
            Ok(chunk) => chunk,
            Err(_) => return Err(ApiError::InvalidFilter),
        };

        total_size = match total_size.checked_add(chunk.len()) {
            Some(new_size) if new_size <= max_size => new_size,
            _ => return Err(ApiError::PayloadTooLarge),
        };

        buf.extend_from_slice(&chunk);
    }

    Ok(buf.freeze())
}
