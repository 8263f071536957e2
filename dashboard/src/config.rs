// ==============================================================================
// config.rs - Dashboard Configuration
// ==============================================================================
// Description: Server, workbook and annotation API settings read from the
//              environment (after .env is loaded)
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use proteomics_processor::literature::DEFAULT_API_BASE;

use crate::session::DEFAULT_SESSION_TTL;

const DEFAULT_PORT: u16 = 8050;
const DEFAULT_BIND: &str = "0.0.0.0";
const DEFAULT_WORKBOOK: &str = "NIHMS1635539-supplement-1635539_Sup_tab_4.xlsx";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub bind_address: IpAddr,
    pub port: u16,
    pub workbook_path: PathBuf,
    pub literature_api_base: String,
    pub cors_allowed_origins: Vec<String>,
    pub log_format: LogFormat,
    /// Idle time after which a session is dropped
    pub session_ttl: Duration,
}

impl DashboardConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup (environment, test maps)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("DASHBOARD_PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .context("DASHBOARD_PORT must be a valid port number")?,
            None => DEFAULT_PORT,
        };

        let bind_address = lookup("DASHBOARD_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .trim()
            .parse::<IpAddr>()
            .context("DASHBOARD_BIND must be an IP address")?;

        let workbook_path = PathBuf::from(
            lookup("WORKBOOK_PATH").unwrap_or_else(|| DEFAULT_WORKBOOK.to_string()),
        );

        let literature_api_base =
            lookup("LITERATURE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        // Comma-separated, e.g. https://dash.example.com,http://localhost:3000
        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let session_ttl_secs = match lookup("DASHBOARD_SESSION_TTL_SECS") {
            Some(secs) => secs
                .trim()
                .parse::<u64>()
                .context("DASHBOARD_SESSION_TTL_SECS must be a number of seconds")?,
            None => DEFAULT_SESSION_TTL.as_secs(),
        };

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        };

        Ok(Self {
            bind_address,
            port,
            workbook_path,
            literature_api_base,
            cors_allowed_origins,
            log_format,
            session_ttl: Duration::from_secs(session_ttl_secs),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<DashboardConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DashboardConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8050);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8050");
        assert_eq!(config.literature_api_base, "https://mygene.info");
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.log_format, LogFormat::Compact);
        assert_eq!(config.session_ttl, Duration::from_secs(3600));
        assert_eq!(
            config.workbook_path,
            PathBuf::from("NIHMS1635539-supplement-1635539_Sup_tab_4.xlsx")
        );
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DASHBOARD_PORT", "9000"),
            ("DASHBOARD_BIND", "127.0.0.1"),
            ("WORKBOOK_PATH", "/data/tab4.xlsx"),
            ("LITERATURE_API_BASE", "http://localhost:9999"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, ,https://b.example"),
            ("LOG_FORMAT", "json"),
            ("DASHBOARD_SESSION_TTL_SECS", "120"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(config.workbook_path, PathBuf::from("/data/tab4.xlsx"));
        assert_eq!(config.literature_api_base, "http://localhost:9999");
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.session_ttl, Duration::from_secs(120));
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("DASHBOARD_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("DASHBOARD_PORT"));
    }
}
