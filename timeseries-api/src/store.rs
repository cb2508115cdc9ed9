use crate::config::ClickHouseConfig;
use crate::query::LatestQuery;
use async_trait::async_trait;
use clickhouse::{Client, Row};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// One result row as the store returns it. Column order matches the SELECT
/// list rendered by `LatestQuery`.
#[derive(Debug, Clone, PartialEq, Eq, Row, Deserialize)]
pub struct LatestRow {
    pub date_text: String,
    pub location_key: String,
    pub new_confirmed: i32,
    pub new_deceased: i32,
    pub new_recovered: i32,
    pub new_tested: i32,
    pub cumulative_confirmed: i32,
    pub cumulative_deceased: i32,
    pub cumulative_recovered: i32,
    pub cumulative_tested: i32,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    ClickHouse(#[from] clickhouse::error::Error),

    #[error("no answer from store within {0:?}")]
    DialTimeout(Duration),
}

#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    async fn fetch_latest(&self, query: &LatestQuery) -> Result<Vec<LatestRow>, StoreError>;
}

pub struct ClickHouseStore {
    client: Client,
    table: String,
}

impl ClickHouseStore {
    /// Builds the client and proves the store answers. There is no retry: an
    /// unreachable store at startup is fatal for the caller.
    pub async fn connect(cfg: &ClickHouseConfig) -> Result<Self, StoreError> {
        let store = Self::new(cfg);

        let timeout = cfg.dial_timeout();
        tokio::time::timeout(timeout, store.client.query("SELECT 1").execute())
            .await
            .map_err(|_| StoreError::DialTimeout(timeout))??;

        info!(
            url = cfg.url(),
            database = cfg.database(),
            table = cfg.table(),
            "Connected to ClickHouse"
        );

        Ok(store)
    }

    /// Client without the connectivity check; the first query dials.
    pub fn new(cfg: &ClickHouseConfig) -> Self {
        let client = Client::default()
            .with_url(cfg.url())
            .with_database(cfg.database())
            .with_user(cfg.user())
            .with_password(cfg.password());

        ClickHouseStore {
            client,
            table: cfg.table().to_string(),
        }
    }
}

#[async_trait]
impl TimeSeriesStore for ClickHouseStore {
    async fn fetch_latest(&self, query: &LatestQuery) -> Result<Vec<LatestRow>, StoreError> {
        let (sql, params) = query.render(&self.table);
        debug!(predicates = query.predicates.len(), "Executing latest-row query");

        let mut q = self.client.query(&sql);
        for param in params {
            q = q.bind(param);
        }
        Ok(q.fetch_all::<LatestRow>().await?)
    }
}
