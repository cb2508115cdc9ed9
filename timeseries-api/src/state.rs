use crate::config::Config;
use crate::store::TimeSeriesStore;
use std::sync::Arc;
use tracing::debug;

// Default to 1 MB if not specified
const DEFAULT_MAX_BODY_BYTES: usize = 1_048_576;

pub struct AppState {
    // Shared by every request. Concurrent queries rely on the client's own
    // thread safety; nothing here serializes them.
    pub store: Arc<dyn TimeSeriesStore>,
    pub max_request_body_bytes: usize,
    pub expose_error_details: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn TimeSeriesStore>, cfg: &Config) -> Self {
        let max_request_body_bytes = cfg.max_request_body_bytes.unwrap_or(DEFAULT_MAX_BODY_BYTES);
        debug!("Maximum request body size: {} bytes", max_request_body_bytes);

        AppState {
            store,
            max_request_body_bytes,
            expose_error_details: cfg.expose_error_details(),
        }
    }
}
