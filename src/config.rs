//! Environment-driven server configuration

use std::env;

/// Runtime configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// sqlx connection string, e.g. `sqlite://data/shoplist.db?mode=rwc`
    pub database_url: String,
}

impl Config {
    /// Build a config from `HOST`, `PORT` and `DATABASE_URL`, falling
    /// back to defaults suitable for local development.
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite://data_{port}.db?mode=rwc"));

        Self {
            host,
            port,
            database_url,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_addr() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 9000,
            database_url: "sqlite::memory:".to_string(),
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
    }
}
