use serde::Deserialize;

/// Optional constraints sent by the client. Missing, `null` and empty strings
/// all leave the corresponding dimension unconstrained.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct FilterCriteria {
    #[serde(default)]
    pub location_key: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl FilterCriteria {
    fn location_key(&self) -> Option<&str> {
        non_empty(&self.location_key)
    }

    /// Both bounds, or nothing. A one-sided range is dropped.
    fn date_range(&self) -> Option<(&str, &str)> {
        match (non_empty(&self.start_date), non_empty(&self.end_date)) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    DateBetween { start: String, end: String },
    LocationKey(String),
}

impl Predicate {
    pub fn clause(&self) -> &'static str {
        match self {
            Predicate::DateBetween { .. } => "date BETWEEN ? AND ?",
            Predicate::LocationKey(_) => "location_key = ?",
        }
    }

    pub fn params(&self) -> Vec<&str> {
        match self {
            Predicate::DateBetween { start, end } => vec![start.as_str(), end.as_str()],
            Predicate::LocationKey(key) => vec![key.as_str()],
        }
    }
}

/// Latest row per location, narrowed by the predicates. The predicates are
/// evaluated against each location's newest row, after ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatestQuery {
    pub predicates: Vec<Predicate>,
}

const RANKED_CTE: &str = "WITH ranked AS (
    SELECT location_key,
           date,
           toString(date) AS date_text,
           new_confirmed,
           new_deceased,
           new_recovered,
           new_tested,
           cumulative_confirmed,
           cumulative_deceased,
           cumulative_recovered,
           cumulative_tested,
           ROW_NUMBER() OVER (PARTITION BY location_key ORDER BY date DESC) AS rn
    FROM {table}
)
SELECT date_text,
       location_key,
       new_confirmed,
       new_deceased,
       new_recovered,
       new_tested,
       cumulative_confirmed,
       cumulative_deceased,
       cumulative_recovered,
       cumulative_tested
FROM ranked";

impl LatestQuery {
    pub fn from_filter(filter: &FilterCriteria) -> Self {
        let mut predicates = Vec::new();
        if let Some((start, end)) = filter.date_range() {
            predicates.push(Predicate::DateBetween {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        if let Some(key) = filter.location_key() {
            predicates.push(Predicate::LocationKey(key.to_string()));
        }
        LatestQuery { predicates }
    }

    /// Renders the statement and its positional parameters. `table` is trusted
    /// (validated at config load); everything from the request is bound.
    pub fn render(&self, table: &str) -> (String, Vec<String>) {
        let mut clauses = vec!["rn = 1"];
        let mut params = Vec::new();
        for predicate in &self.predicates {
            clauses.push(predicate.clause());
            params.extend(predicate.params().into_iter().map(str::to_string));
        }

        let sql = format!(
            "{}\nWHERE {}\nORDER BY location_key",
            RANKED_CTE.replace("{table}", table),
            clauses.join(" AND ")
        );
        (sql, params)
    }
}
