//! In-memory store for handler and router tests. It evaluates a `LatestQuery`
//! the way the SQL does: newest row per location, then the predicates.

use crate::query::{LatestQuery, Predicate};
use crate::store::{LatestRow, StoreError, TimeSeriesStore};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    rows: Vec<LatestRow>,
    seen: Mutex<Vec<LatestQuery>>,
}

impl MemoryStore {
    pub fn with_rows(rows: Vec<LatestRow>) -> Self {
        MemoryStore {
            rows,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<LatestQuery> {
        self.seen.lock().expect("lock").clone()
    }
}

pub fn row(location: &str, date: &str, cumulative_confirmed: i32) -> LatestRow {
    LatestRow {
        date_text: date.to_string(),
        location_key: location.to_string(),
        new_confirmed: 1,
        new_deceased: 0,
        new_recovered: 0,
        new_tested: 5,
        cumulative_confirmed,
        cumulative_deceased: 0,
        cumulative_recovered: 0,
        cumulative_tested: cumulative_confirmed * 10,
    }
}

#[async_trait]
impl TimeSeriesStore for MemoryStore {
    async fn fetch_latest(&self, query: &LatestQuery) -> Result<Vec<LatestRow>, StoreError> {
        self.seen.lock().expect("lock").push(query.clone());

        // ISO dates order lexicographically.
        let mut latest: BTreeMap<&str, &LatestRow> = BTreeMap::new();
        for r in &self.rows {
            let entry = latest.entry(r.location_key.as_str()).or_insert(r);
            if r.date_text > entry.date_text {
                *entry = r;
            }
        }

        Ok(latest
            .into_values()
            .filter(|r| {
                query.predicates.iter().all(|p| match p {
                    Predicate::DateBetween { start, end } => {
                        r.date_text.as_str() >= start.as_str() && r.date_text.as_str() <= end.as_str()
                    }
                    Predicate::LocationKey(key) => &r.location_key == key,
                })
            })
            .cloned()
            .collect())
    }
}
