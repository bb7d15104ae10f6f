//! Settings of the read-model server process.
//!
//! Projection tuning (storage deadline, repository shards) lives in
//! [`projections::ProjectionConfig`]; this covers only what the HTTP
//! process itself needs.

/// Where the server listens, how it logs, and where read models are stored.
///
/// | Variable       | Default     | Meaning                                          |
/// |----------------|-------------|--------------------------------------------------|
/// | `HOST`         | `0.0.0.0`   | bind address                                     |
/// | `PORT`         | `3000`      | listen port; unparsable values fall back         |
/// | `RUST_LOG`     | `info`      | tracing filter directive                         |
/// | `DATABASE_URL` | unset       | PostgreSQL store; blank or unset keeps models in memory |
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
}

impl Config {
    /// Reads the variables above.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
        }
    }

    /// Whether read models survive a restart.
    pub fn is_persistent(&self) -> bool {
        self.database_url.is_some()
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert!(config.database_url.is_none());
        assert!(!config.is_persistent());
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "debug".to_string(),
            database_url: Some("postgres://localhost/read_models".to_string()),
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert!(config.is_persistent());
    }

    #[test]
    fn test_addr_default() {
        let config = Config::default();
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }
}
