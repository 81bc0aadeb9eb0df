// src/config.rs

use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use dotenvy::dotenv;

use crate::error::AppError;

/// Directory the export files are written to when `EXPORT_DIR` is unset.
pub const DEFAULT_EXPORT_DIR: &str = "output";

/// File name of the per-test export.
pub const EXPORT_FILE_NAME: &str = "completed_tests.csv";

/// File name of the per-question export.
pub const QUESTION_EXPORT_FILE_NAME: &str = "completed_test_questions.csv";

pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// Only required by the Postgres store.
    pub database_url: Option<String>,
    pub rust_log: String,
    pub export_dir: PathBuf,
    /// Also write `completed_test_questions.csv`.
    pub export_question_detail: bool,
    pub store_timeout: Duration,
    pub bind_addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            rust_log: "info".to_string(),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            export_question_detail: false,
            store_timeout: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());

        let rust_log = lookup("RUST_LOG").unwrap_or(defaults.rust_log);

        let export_dir = lookup("EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.export_dir);

        let export_question_detail = match lookup("EXPORT_QUESTION_DETAIL") {
            Some(raw) => parse_bool("EXPORT_QUESTION_DETAIL", &raw)?,
            None => defaults.export_question_detail,
        };

        let store_timeout = match lookup("STORE_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|e| {
                    AppError::Config(format!("STORE_TIMEOUT_SECS must be a number: {}", e))
                })?;
                if secs == 0 {
                    return Err(AppError::Config(
                        "STORE_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.store_timeout,
        };

        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => raw
                .parse::<SocketAddr>()
                .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid: {}", e)))?,
            None => defaults.bind_addr,
        };

        Ok(Self {
            database_url,
            rust_log,
            export_dir,
            export_question_detail,
            store_timeout,
            bind_addr,
        })
    }

    pub fn require_database_url(&self) -> Result<&str, AppError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| AppError::Config("DATABASE_URL must be set".to_string()))
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(AppError::Config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.export_dir, PathBuf::from("output"));
        assert_eq!(config.rust_log, "info");
        assert!(!config.export_question_detail);
        assert_eq!(config.store_timeout, Duration::from_secs(10));
        assert!(config.require_database_url().is_err());
    }

    #[test]
    fn values_are_read_from_lookup() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/results"),
            ("EXPORT_DIR", "/tmp/exports"),
            ("EXPORT_QUESTION_DETAIL", "true"),
            ("STORE_TIMEOUT_SECS", "3"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ]))
        .unwrap();

        assert_eq!(
            config.require_database_url().unwrap(),
            "postgres://localhost/results"
        );
        assert_eq!(config.export_dir, PathBuf::from("/tmp/exports"));
        assert!(config.export_question_detail);
        assert_eq!(config.store_timeout, Duration::from_secs(3));
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let err = Config::from_lookup(lookup_from(&[("STORE_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert_eq!(err.kind(), "config");

        let err = Config::from_lookup(lookup_from(&[("STORE_TIMEOUT_SECS", "0")])).unwrap_err();
        assert_eq!(err.kind(), "config");

        let err =
            Config::from_lookup(lookup_from(&[("EXPORT_QUESTION_DETAIL", "maybe")])).unwrap_err();
        assert_eq!(err.kind(), "config");
    }
}
