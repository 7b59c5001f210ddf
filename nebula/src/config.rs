//! Server configuration
//!
//! An optional TOML file (path in `NEBULA_CONFIG`) with the sections
//! `[server]`, `[store]`, `[cors]` and `[rate_limit]`. Every field has a
//! default, and a few environment variables override the file:
//! `PORT`, `NEBULA_STORE`, `NEBULA_DB_PATH`, `NEBULA_CORS_ORIGINS`.

use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSection,
    pub store: StoreSection,
    pub cors: CorsSection,
    pub rate_limit: RateLimitSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Larger request bodies are answered with 413.
    pub max_body_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redb,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redb" => Ok(StoreBackend::Redb),
            "memory" => Ok(StoreBackend::Memory),
            other => anyhow::bail!("unknown store backend \"{other}\", expected redb or memory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub backend: StoreBackend,
    /// Database file, only used by the redb backend.
    pub path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redb,
            path: PathBuf::from("./nebula.redb"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsSection {
    /// Allowed origins. A single "*" allows any origin.
    pub origins: Vec<String>,
}

impl Default for CorsSection {
    fn default() -> Self {
        Self {
            origins: vec![
                "http://localhost:3000".to_string(),
                "https://trica.k2lang.org".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSection {
    /// Requests allowed per client IP in each window. 0 disables limiting.
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_secs: 15 * 60,
        }
    }
}

impl RateLimitSection {
    pub fn enabled(&self) -> bool {
        self.max_requests > 0 && self.window_secs > 0
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str::<Self>(s)?)
    }
}

impl Config {
    /// Defaults, then the file named by `NEBULA_CONFIG`, then env overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("NEBULA_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let str = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read config file: {:?}", path))?;
        str.parse::<Self>()
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Apply overrides from a variable lookup, normally `std::env::var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = var("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("PORT is not a valid port: {port}"))?;
        }
        if let Some(backend) = var("NEBULA_STORE") {
            self.store.backend = backend.parse()?;
        }
        if let Some(path) = var("NEBULA_DB_PATH") {
            self.store.path = PathBuf::from(path);
        }
        if let Some(origins) = var("NEBULA_CORS_ORIGINS") {
            self.cors.origins = origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn empty_file_is_all_defaults() -> Result<()> {
        assert_eq!("".parse::<Config>()?, Config::default());
        Ok(())
    }

    #[test]
    fn partial_sections() -> Result<()> {
        let config = Config::from_str(
            r#"
            [server]
            port = 8080

            [store]
            backend = "memory"

            [rate_limit]
            max_requests = 0
            "#,
        )?;
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.server.max_body_bytes, 10 * 1024 * 1024);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(!config.rate_limit.enabled());
        assert_eq!(config.cors, CorsSection::default());
        Ok(())
    }

    #[test]
    fn unknown_backend_is_an_error() {
        assert!(Config::from_str("[store]\nbackend = \"postgres\"").is_err());
    }

    #[test]
    fn env_overrides() -> Result<()> {
        let vars = HashMap::from([
            ("PORT", "4000"),
            ("NEBULA_STORE", "Memory"),
            ("NEBULA_DB_PATH", "/tmp/registry.redb"),
            ("NEBULA_CORS_ORIGINS", "https://a.example, https://b.example,"),
        ]);
        let mut config = Config::default();
        config.apply_env(|key| vars.get(key).map(|v| v.to_string()))?;
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.path, PathBuf::from("/tmp/registry.redb"));
        assert_eq!(
            config.cors.origins,
            vec!["https://a.example", "https://b.example"]
        );
        Ok(())
    }

    #[test]
    fn bad_port_is_an_error() {
        let mut config = Config::default();
        assert!(
            config
                .apply_env(|key| (key == "PORT").then(|| "not a port".to_string()))
                .is_err()
        );
    }

    #[test]
    fn reads_file() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("nebula.toml");
        std::fs::write(&path, "[cors]\norigins = [\"*\"]\n")?;
        assert_eq!(Config::from_file(&path)?.cors.origins, vec!["*"]);
        assert!(Config::from_file(&dir.path().join("missing.toml")).is_err());
        Ok(())
    }
}
