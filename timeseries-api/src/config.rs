use regex::Regex;
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ClickHouseConfig {
    // HTTP interface of the store, e.g. `http://localhost:8123`.
    // Defaults to localhost on the standard HTTP port.
    pub url: Option<String>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    // Table holding the daily observations. Must be a plain identifier,
    // optionally qualified as `database.table`.
    pub table: Option<String>,
    // Upper bound on the startup connectivity check. The service refuses to
    // start if the store does not answer within this window.
    pub dial_timeout_secs: Option<u64>,
}

impl ClickHouseConfig {
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or("http://localhost:8123")
    }

    pub fn database(&self) -> &str {
        self.database.as_deref().unwrap_or("default")
    }

    pub fn user(&self) -> &str {
        self.user.as_deref().unwrap_or("default")
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or("")
    }

    pub fn table(&self) -> &str {
        self.table.as_deref().unwrap_or("covid19")
    }

    pub fn dial_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.dial_timeout_secs.unwrap_or(5))
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub listen: Option<String>,
    // The one browser origin allowed to call the API.
    // Defaults to the local frontend dev server.
    pub allowed_origin: Option<String>,
    // Maximum request body size in bytes. Requests exceeding this will return 413 Payload Too Large.
    // If not set, defaults to 1 MB (1_048_576 bytes).
    pub max_request_body_bytes: Option<usize>,
    // Whether 500 responses carry the underlying store error text.
    // Defaults to true; turn off to keep driver messages out of client responses.
    pub expose_error_details: Option<bool>,
    #[serde(default)]
    pub clickhouse: ClickHouseConfig,
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let cfg_str = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config '{}': {}", path, e))?;
        Self::from_toml(&cfg_str)
    }

    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        let cfg: Config = toml::from_str(s)?;
        validate_table_name(cfg.clickhouse.table())?;
        Ok(cfg)
    }

    pub fn listen(&self) -> &str {
        self.listen.as_deref().unwrap_or("0.0.0.0:8080")
    }

    pub fn allowed_origin(&self) -> &str {
        self.allowed_origin
            .as_deref()
            .unwrap_or("http://localhost:3000")
    }

    pub fn expose_error_details(&self) -> bool {
        self.expose_error_details.unwrap_or(true)
    }
}

// The table name is spliced into the SQL text, so it never comes from a request
// and must look like an identifier.
fn validate_table_name(table: &str) -> anyhow::Result<()> {
    let re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")?;
    if !re.is_match(table) {
        anyhow::bail!("Invalid table name '{}'", table);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = Config::from_toml("").expect("parse empty toml");
        assert_eq!(cfg.listen(), "0.0.0.0:8080");
        assert_eq!(cfg.allowed_origin(), "http://localhost:3000");
        assert!(cfg.expose_error_details());
        assert_eq!(cfg.clickhouse.url(), "http://localhost:8123");
        assert_eq!(cfg.clickhouse.database(), "default");
        assert_eq!(cfg.clickhouse.user(), "default");
        assert_eq!(cfg.clickhouse.password(), "");
        assert_eq!(cfg.clickhouse.table(), "covid19");
        assert_eq!(cfg.clickhouse.dial_timeout().as_secs(), 5);
    }

    #[test]
    fn parse_example_config() {
        let s = fs::read_to_string("config.toml.example").expect("read example config");
        let cfg = Config::from_toml(&s).expect("parse example toml");
        assert_eq!(cfg.clickhouse.table(), "covid19");
        assert!(cfg.max_request_body_bytes.is_some());
    }

    #[test]
    fn qualified_table_name_is_accepted() {
        let cfg = Config::from_toml("[clickhouse]\ntable = \"analytics.covid19\"\n")
            .expect("qualified table");
        assert_eq!(cfg.clickhouse.table(), "analytics.covid19");
    }

    #[test]
    fn table_name_with_sql_is_rejected() {
        let result = Config::from_toml("[clickhouse]\ntable = \"covid19; DROP TABLE x\"\n");
        assert!(result.is_err(), "should reject non-identifier table name");
        if let Err(e) = result {
            assert!(
                e.to_string().contains("Invalid table name"),
                "error message should mention table name: {}",
                e
            );
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::from_file("does-not-exist.toml").is_err());
    }
}
