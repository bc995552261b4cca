use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    /// Optional so that `test_mode` deployments can run without a
    /// database; required otherwise, checked at startup.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub request_timeout: u64,
    pub log_level: String,
    pub test_mode: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Ok(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL").ok(),
            max_connections: env::var("MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()?,
            request_timeout: env::var("REQUEST_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            test_mode: env::var("TEST_MODE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        })
    }

    /// In-memory configuration for tests and local smoke runs.
    pub fn for_tests() -> Self {
        Config {
            environment: "test".to_string(),
            port: 0,
            database_url: None,
            max_connections: 5,
            request_timeout: 30,
            log_level: "debug".to_string(),
            test_mode: true,
        }
    }
}
