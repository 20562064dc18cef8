use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use arbor_types::RepositoryPaths;

use crate::error::{ModelError, ModelResult};

/// Top-level configuration, loadable from TOML.
///
/// ```toml
/// [store]
/// base_uri = "http://fcrepo:8080/rest"
/// query_endpoint = "http://fcrepo:8080/query"
///
/// [cache]
/// max_entries = 5000
/// ttl_ms = 60000
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArborConfig {
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub ancestors: AncestorConfig,
    pub derivatives: DerivativeConfig,
}

impl ArborConfig {
    pub fn from_toml_str(s: &str) -> ModelResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ModelError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> ModelResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> ModelResult<String> {
        toml::to_string(self).map_err(|e| ModelError::Config(e.to_string()))
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.store.base_uri.trim().is_empty() {
            return Err(ModelError::Config("store.base_uri must not be empty".into()));
        }
        if self.cache.max_entries == 0 {
            return Err(ModelError::Config("cache.max_entries must be positive".into()));
        }
        if self.ancestors.max_depth == 0 {
            return Err(ModelError::Config("ancestors.max_depth must be positive".into()));
        }
        Ok(())
    }
}

/// Where the remote store and query service live.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub base_uri: String,
    pub query_endpoint: String,
    pub request_timeout_secs: u64,
}

impl StoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn paths(&self) -> RepositoryPaths {
        RepositoryPaths::new(&self.base_uri)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_uri: "http://localhost:8080/rest".into(),
            query_endpoint: "http://localhost:8080/query".into(),
            request_timeout_secs: 30,
        }
    }
}

/// Bounds of the object cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub ttl_ms: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_ms = ttl.as_millis() as u64;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl_ms: 5 * 60 * 1000,
        }
    }
}

/// Bounds of the parent-hop cache and the ancestor walk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AncestorConfig {
    pub max_entries: usize,
    pub ttl_ms: u64,
    /// Hops after which a walk is treated as a cycle.
    pub max_depth: usize,
}

impl AncestorConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_ms = ttl.as_millis() as u64;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

impl Default for AncestorConfig {
    fn default() -> Self {
        Self {
            max_entries: 50_000,
            ttl_ms: 10 * 60 * 1000,
            max_depth: 128,
        }
    }
}

/// Location of filesystem-stored derivatives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivativeConfig {
    pub root: PathBuf,
}

impl Default for DerivativeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("derivatives"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let c = ArborConfig::default();
        assert_eq!(c.cache.max_entries, 10_000);
        assert_eq!(c.cache.ttl(), Duration::from_secs(300));
        assert_eq!(c.ancestors.max_depth, 128);
        assert_eq!(c.store.request_timeout(), Duration::from_secs(30));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let c = ArborConfig::from_toml_str(
            r#"
            [store]
            base_uri = "http://fcrepo:8080/rest"

            [ancestors]
            max_depth = 16
            "#,
        )
        .unwrap();
        assert_eq!(c.store.base_uri, "http://fcrepo:8080/rest");
        assert_eq!(c.store.request_timeout_secs, 30);
        assert_eq!(c.ancestors.max_depth, 16);
        assert_eq!(c.cache, CacheConfig::default());
    }

    #[test]
    fn zero_bounds_are_rejected() {
        let err = ArborConfig::from_toml_str("[cache]\nmax_entries = 0\n").unwrap_err();
        assert!(matches!(err, ModelError::Config(_)));
        let err = ArborConfig::from_toml_str("[ancestors]\nmax_depth = 0\n").unwrap_err();
        assert!(matches!(err, ModelError::Config(_)));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        assert!(matches!(
            ArborConfig::from_toml_str("[cache\n"),
            Err(ModelError::Config(_))
        ));
    }

    #[test]
    fn load_from_file_round_trip() {
        let config = ArborConfig {
            cache: CacheConfig::default().with_ttl(Duration::from_secs(7)),
            ..Default::default()
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_toml_string().unwrap().as_bytes())
            .unwrap();
        let loaded = ArborConfig::load(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn builders() {
        let c = AncestorConfig::default()
            .with_max_depth(4)
            .with_max_entries(10)
            .with_ttl(Duration::from_millis(250));
        assert_eq!(c.max_depth, 4);
        assert_eq!(c.max_entries, 10);
        assert_eq!(c.ttl(), Duration::from_millis(250));
    }
}
