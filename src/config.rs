//! Static proxy configuration.
//!
//! Built once at startup and shared read-only with every connection.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming a YAML configuration file.
pub const CONFIG_ENV: &str = "TIMEWARP_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the proxy listens on (e.g. "127.0.0.1:8099")
    pub listen_addr: String,

    /// Date to travel back to, `YYYYMMDD`
    pub target_date: String,

    /// Value of the `Server` header on every response
    pub server_name: String,

    /// Archive content prefix, without trailing slash
    pub archive_base: String,

    /// Archive availability lookup endpoint
    pub availability_url: String,

    /// Ask the archive for the closest snapshot instead of using `target_date` directly
    pub lookup_closest_snapshot: bool,

    /// Upper bound on archive-internal redirects followed for one request
    pub max_redirects: usize,

    /// Seconds allowed for connecting to the archive
    pub connect_timeout_secs: u64,

    /// Seconds allowed for one whole archive request, body included
    pub request_timeout_secs: u64,

    /// Seconds a client gets to send its request, and to receive the response
    pub client_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8099".to_string(),
            target_date: "19990412".to_string(),
            server_name: "HttpTimeTravelProxy/0.1".to_string(),
            archive_base: "https://web.archive.org/web".to_string(),
            availability_url: "https://archive.org/wayback/available".to_string(),
            lookup_closest_snapshot: true,
            max_redirects: 10,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            client_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Loads configuration from defaults, an optional YAML file and the environment.
    ///
    /// `path` wins over the `TIMEWARP_CONFIG` variable. `LISTEN` and `TIMEWARP_DATE`
    /// override whatever the file says.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = path
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_ENV).ok());

        let mut cfg = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var("LISTEN") {
            cfg.listen_addr = listen_addr;
        }
        if let Ok(date) = std::env::var("TIMEWARP_DATE") {
            cfg.target_date = date;
        }

        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parses a YAML document; missing keys fall back to their defaults.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let mut cfg: Config = if raw.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(raw).context("Failed to parse YAML config")?
        };
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    fn normalize(&mut self) {
        while self.archive_base.ends_with('/') {
            self.archive_base.pop();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_date.len() != 8 || !self.target_date.bytes().all(|b| b.is_ascii_digit()) {
            anyhow::bail!("target_date must be YYYYMMDD, got {:?}", self.target_date);
        }
        if self.max_redirects == 0 {
            anyhow::bail!("max_redirects must be at least 1");
        }
        for (name, secs) in [
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("request_timeout_secs", self.request_timeout_secs),
            ("client_timeout_secs", self.client_timeout_secs),
        ] {
            if secs == 0 {
                anyhow::bail!("{} must be at least 1", name);
            }
        }
        url::Url::parse(&self.archive_base).context("archive_base is not an absolute URL")?;
        url::Url::parse(&self.availability_url)
            .context("availability_url is not an absolute URL")?;
        if self.server_name.trim().is_empty() {
            anyhow::bail!("server_name must not be empty");
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }
}
