use ::config::{Config, ConfigError, Environment};
use dotenv::dotenv;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub pool_size: u32,
}

impl AppConfig {
    /// Reads `DATABASE_URL`, `HOST`, `PORT` and `POOL_SIZE`, after loading `.env` if present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_env(Environment::default())
    }

    fn from_env(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("database_url", "estate.db")?
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("pool_size", 8)?
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::default().source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_env(env(&[])).unwrap();
        assert_eq!(config.database_url, "estate.db");
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.pool_size, 8);
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let config = AppConfig::from_env(env(&[
            ("DATABASE_URL", ":memory:"),
            ("PORT", "9090"),
            ("POOL_SIZE", "2"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, ":memory:");
        assert_eq!(config.port, 9090);
        assert_eq!(config.pool_size, 2);
    }
}
