use crate::store::LatestRow;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Latest observation for one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeriesRecord {
    pub date: NaiveDate,
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
#[error("row for '{location_key}' has unreadable date '{value}': {source}")]
pub struct RowMappingError {
    pub location_key: String,
    pub value: String,
    #[source]
    pub source: chrono::ParseError,
}

impl TryFrom<LatestRow> for TimeSeriesRecord {
    type Error = RowMappingError;

    fn try_from(row: LatestRow) -> Result<Self, Self::Error> {
        let date = match NaiveDate::parse_from_str(&row.date_text, "%Y-%m-%d") {
            Ok(d) => d,
            Err(source) => {
                return Err(RowMappingError {
                    location_key: row.location_key,
                    value: row.date_text,
                    source,
                })
            }
        };

        Ok(TimeSeriesRecord {
            date,
            location_key: row.location_key,
            new_confirmed: row.new_confirmed,
            new_deceased: row.new_deceased,
            new_recovered: row.new_recovered,
            new_tested: row.new_tested,
            cumulative_confirmed: row.cumulative_confirmed,
            cumulative_deceased: row.cumulative_deceased,
            cumulative_recovered: row.cumulative_recovered,
            cumulative_tested: row.cumulative_tested,
        })
    }
}
