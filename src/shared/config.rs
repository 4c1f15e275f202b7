use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub feed: FeedConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    // true にすると read-modify-write 全体を直列化する
    pub serialize_mutations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "plain" => Ok(Self::Text),
            other => Err(AppError::ConfigurationError(format!(
                "unknown log format: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig {
                data_path: PathBuf::from("./data/posts.json"),
            },
            feed: FeedConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            request_timeout_secs: 30,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
            serialize_mutations: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("POST_FEED_ADDR") {
            cfg.server.addr = SocketAddr::from_str(v.trim()).map_err(|err| {
                AppError::ConfigurationError(format!("invalid socket addr for POST_FEED_ADDR: {err}"))
            })?;
        }
        if let Some(v) = lookup("POST_FEED_REQUEST_TIMEOUT_SECS") {
            cfg.server.request_timeout_secs = parse_u64("POST_FEED_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("POST_FEED_DATA_PATH")
            && !v.trim().is_empty()
        {
            cfg.storage.data_path = PathBuf::from(v.trim());
        }
        if let Some(v) = lookup("POST_FEED_DEFAULT_LIMIT") {
            cfg.feed.default_limit = parse_usize("POST_FEED_DEFAULT_LIMIT", &v)?;
        }
        if let Some(v) = lookup("POST_FEED_MAX_LIMIT") {
            cfg.feed.max_limit = parse_usize("POST_FEED_MAX_LIMIT", &v)?;
        }
        if let Some(v) = lookup("POST_FEED_SERIALIZE_MUTATIONS") {
            cfg.feed.serialize_mutations = parse_bool(&v, cfg.feed.serialize_mutations);
        }

        if let Some(v) = lookup("POST_FEED_LOG_FORMAT") {
            cfg.logging.format = v.parse()?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.feed.default_limit == 0 {
            return Err(AppError::ConfigurationError(
                "Feed default_limit must be greater than 0".to_string(),
            ));
        }
        if self.feed.max_limit == 0 {
            return Err(AppError::ConfigurationError(
                "Feed max_limit must be greater than 0".to_string(),
            ));
        }
        if self.feed.default_limit > self.feed.max_limit {
            return Err(AppError::ConfigurationError(format!(
                "Feed default_limit ({}) must not exceed max_limit ({})",
                self.feed.default_limit, self.feed.max_limit
            )));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(AppError::ConfigurationError(
                "Server request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(name: &str, value: &str) -> Result<u64, AppError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|err| AppError::ConfigurationError(format!("invalid value for {name}: {err}")))
}

fn parse_usize(name: &str, value: &str) -> Result<usize, AppError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|err| AppError::ConfigurationError(format!("invalid value for {name}: {err}")))
}
