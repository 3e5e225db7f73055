// Application config: TOML file, environment overrides, validation

use crate::aggregation::QuotaFailurePolicy;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub exporter: ExporterConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub metrics_path: String,
    /// Expose `process_*` metrics for the exporter itself (Linux only).
    pub process_metrics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 9290,
            metrics_path: "/metrics".into(),
            process_metrics: false,
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub url: String,
    pub access_key: String,
    pub secret_key: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9000".into(),
            access_key: String::new(),
            secret_key: String::new(),
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("url", &self.url)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl GatewayConfig {
    pub fn base_url(&self) -> anyhow::Result<Url> {
        let url = Url::parse(&self.url)
            .map_err(|e| anyhow::anyhow!("gateway.url {:?} is not a valid URL: {}", self.url, e))?;
        anyhow::ensure!(
            matches!(url.scheme(), "http" | "https"),
            "gateway.url must use http or https, got {}",
            url.scheme()
        );
        anyhow::ensure!(
            url.host_str().is_some_and(|h| !h.is_empty()),
            "gateway.url must include a host"
        );
        Ok(url)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    /// Deadline for one whole scrape; expiry counts as a failed scrape.
    pub scrape_timeout_secs: u64,
    pub owner_quota_failure: QuotaFailurePolicy,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            scrape_timeout_secs: 30,
            owner_quota_failure: QuotaFailurePolicy::default(),
        }
    }
}

impl ExporterConfig {
    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_secs(self.scrape_timeout_secs)
    }
}

impl AppConfig {
    /// Reads `CONFIG_FILE` (default `config.toml`), applies environment
    /// overrides and validates. A missing default file means all defaults.
    pub fn load() -> anyhow::Result<Self> {
        let explicit = std::env::var("CONFIG_FILE").ok();
        let path = explicit.clone().unwrap_or_else(|| "config.toml".into());
        let mut config = match std::fs::read_to_string(&path) {
            Ok(s) => Self::parse(&s)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
                Self::default()
            }
            Err(e) => return Err(anyhow::anyhow!("reading {}: {}", path, e)),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config = Self::parse(s)?;
        config.validate()?;
        Ok(config)
    }

    fn parse(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Overrides file values with `LISTEN_ADDRESS`, `METRIC_PATH`, `CEPH_URL`,
    /// `CEPH_ACCESS_KEY`, `CEPH_ACCESS_SECRET` and `PROCESS_METRICS`.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("LISTEN_ADDRESS") {
            let (host, port) = addr
                .rsplit_once(':')
                .ok_or_else(|| anyhow::anyhow!("LISTEN_ADDRESS must be host:port, got {addr:?}"))?;
            self.server.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("LISTEN_ADDRESS port {port:?}: {e}"))?;
            self.server.host = if host.is_empty() {
                "0.0.0.0".into()
            } else {
                host.trim_start_matches('[').trim_end_matches(']').into()
            };
        }
        if let Some(path) = lookup("METRIC_PATH") {
            self.server.metrics_path = path;
        }
        if let Some(url) = lookup("CEPH_URL") {
            self.gateway.url = url;
        }
        if let Some(key) = lookup("CEPH_ACCESS_KEY") {
            self.gateway.access_key = key;
        }
        if let Some(secret) = lookup("CEPH_ACCESS_SECRET") {
            self.gateway.secret_key = secret;
        }
        if let Some(flag) = lookup("PROCESS_METRICS") {
            self.server.process_metrics = match flag.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => anyhow::bail!("PROCESS_METRICS must be a boolean, got {other:?}"),
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.server.metrics_path.starts_with('/') && self.server.metrics_path != "/",
            "server.metrics_path must start with '/' and not be '/', got {:?}",
            self.server.metrics_path
        );
        anyhow::ensure!(
            is_literal_route(&self.server.metrics_path),
            "server.metrics_path {:?} must be a literal path without ':', '*', '{{' or '}}' captures",
            self.server.metrics_path
        );
        anyhow::ensure!(
            !matches!(self.server.metrics_path.as_str(), "/version" | "/health"),
            "server.metrics_path {:?} collides with a built-in route",
            self.server.metrics_path
        );
        self.gateway.base_url()?;
        anyhow::ensure!(
            !self.gateway.access_key.is_empty(),
            "gateway.access_key must be non-empty"
        );
        anyhow::ensure!(
            !self.gateway.secret_key.is_empty(),
            "gateway.secret_key must be non-empty"
        );
        anyhow::ensure!(
            self.exporter.scrape_timeout_secs > 0,
            "exporter.scrape_timeout_secs must be > 0, got {}",
            self.exporter.scrape_timeout_secs
        );
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        if self.server.host.contains(':') {
            format!("[{}]:{}", self.server.host, self.server.port)
        } else {
            format!("{}:{}", self.server.host, self.server.port)
        }
    }
}

// The router treats these as captures and panics on the legacy `:`/`*` forms.
fn is_literal_route(path: &str) -> bool {
    !path.contains(['{', '}'])
        && path
            .split('/')
            .all(|segment| !segment.starts_with([':', '*']))
}
