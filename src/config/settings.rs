//! Process settings read from the environment.

use std::env;
use std::path::PathBuf;

use crate::error::{EngineError, EngineResult};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_CONFIG_DIR: &str = "./config/statutory";
const DEFAULT_LOG_FILTER: &str = "payroll_engine=info";

/// Settings for the HTTP server binary.
///
/// | Variable | Default |
/// |---|---|
/// | `PAYROLL_BIND_ADDR` | `0.0.0.0:3000` |
/// | `PAYROLL_CONFIG_DIR` | `./config/statutory` |
/// | `RUST_LOG` | `payroll_engine=info` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: String,
    /// Directory holding the per-financial-year YAML files.
    pub config_dir: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive.
    pub log_filter: String,
}

impl ServerSettings {
    /// Reads settings from the process environment, after loading `.env` if present.
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for absent keys.
    pub fn from_lookup<F>(lookup: F) -> EngineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("PAYROLL_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        if bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(EngineError::invalid_input(
                "PAYROLL_BIND_ADDR",
                format!("'{}' is not a socket address", bind_addr),
            ));
        }

        Ok(Self {
            bind_addr,
            config_dir: lookup("PAYROLL_CONFIG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}
