//! Configuration management for the service binaries.

use std::env;

use crate::{Error, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database host
    pub db_host: String,
    /// Database port
    pub db_port: u16,
    /// Database username
    pub db_user: String,
    /// Database password
    pub db_password: String,
    /// Database name
    pub db_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            db_host: require("DATABASE_HOST")?,
            db_port: require("DATABASE_PORT")?
                .parse()
                .map_err(|_| Error::Config("DATABASE_PORT is not a valid port".to_string()))?,
            db_user: require("DATABASE_USERNAME")?,
            db_password: require("DATABASE_PASSWORD")?,
            db_name: require("DATABASE_NAME")?,
        })
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("{} not set", name)))
}
