//! Configuration module for the Tokidex backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default cap on upload request bodies (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the JSON file holding the card list
    pub data_path: PathBuf,
    /// Directory uploaded photos are written to and served from
    pub images_dir: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Replace the card file with the seed cards on every start
    pub reset_on_start: bool,
    /// Largest accepted upload body in bytes
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let data_path = env::var("TOKIDEX_DATA_PATH")
            .unwrap_or_else(|_| "./data/tokimon.json".to_string())
            .into();

        let images_dir = env::var("TOKIDEX_IMAGES_DIR")
            .unwrap_or_else(|_| "./data/images".to_string())
            .into();

        let bind_addr = env::var("TOKIDEX_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| format!("Invalid TOKIDEX_BIND_ADDR format: {}", e))?;

        let log_level = env::var("TOKIDEX_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let reset_on_start = match env::var("TOKIDEX_RESET_ON_START") {
            Ok(raw) => parse_bool(&raw)
                .ok_or_else(|| format!("Invalid TOKIDEX_RESET_ON_START value: {}", raw))?,
            Err(_) => false,
        };

        let max_upload_bytes = match env::var("TOKIDEX_MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| format!("Invalid TOKIDEX_MAX_UPLOAD_BYTES value: {}", e))?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            data_path,
            images_dir,
            bind_addr,
            log_level,
            reset_on_start,
            max_upload_bytes,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
