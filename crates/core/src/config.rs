//! Configuration management for vecsearch.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (`.vecsearch/config.yaml` or `VECSEARCH_CONFIG`)
//! - Environment variables (credentials and endpoint)
//! - Command-line flags
//!
//! Three values are credentials and only ever come from the environment:
//! the embedding API key, the search service endpoint and the search admin key.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Environment variable holding the embedding service API key.
pub const EMBEDDING_API_KEY_ENV: &str = "COHERE_API_KEY";

/// Environment variable holding the search service endpoint URL.
pub const SEARCH_ENDPOINT_ENV: &str = "AZURE_SEARCH_SERVICE_ENDPOINT";

/// Environment variable holding the search service admin key.
pub const SEARCH_ADMIN_KEY_ENV: &str = "AZURE_SEARCH_ADMIN_KEY";

/// Known embedding providers.
pub const EMBEDDING_PROVIDERS: [&str; 2] = ["cohere", "mock"];

/// Known search backends.
pub const SEARCH_BACKENDS: [&str; 2] = ["azure", "memory"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// Embedding service settings
    pub embedding: EmbeddingSettings,

    /// Search service settings
    pub search: SearchSettings,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Embedding service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingSettings {
    /// Provider name ("cohere" or "mock")
    pub provider: String,

    /// Model identifier sent with each request
    pub model: String,

    /// Dimensionality of the vectors the model returns
    pub dimensions: usize,

    /// Override for the provider base URL
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// API key, resolved from the environment
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Environment variable the API key is read from
    pub api_key_env: String,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "cohere".to_string(),
            model: "embed-english-v3.0".to_string(),
            dimensions: 1024,
            base_url: None,
            timeout_secs: 30,
            api_key: None,
            api_key_env: EMBEDDING_API_KEY_ENV.to_string(),
        }
    }
}

/// Search service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchSettings {
    /// Backend name ("azure" or "memory")
    pub backend: String,

    /// Service endpoint, e.g. `https://my-service.search.windows.net`
    pub endpoint: Option<String>,

    /// Admin key, resolved from the environment
    #[serde(skip_serializing)]
    pub admin_key: Option<String>,

    /// Target index name
    pub index_name: String,

    /// REST API version query parameter
    pub api_version: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// HNSW parameters for the vector search profile
    pub hnsw: HnswSettings,

    /// Environment variable the endpoint is read from
    pub endpoint_env: String,

    /// Environment variable the admin key is read from
    pub admin_key_env: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            backend: "azure".to_string(),
            endpoint: None,
            admin_key: None,
            index_name: "int8-embeddings-index".to_string(),
            api_version: "2024-07-01".to_string(),
            timeout_secs: 30,
            hnsw: HnswSettings::default(),
            endpoint_env: SEARCH_ENDPOINT_ENV.to_string(),
            admin_key_env: SEARCH_ADMIN_KEY_ENV.to_string(),
        }
    }
}

/// HNSW algorithm parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HnswSettings {
    pub m: u32,
    pub ef_construction: u32,
    pub ef_search: u32,
    pub metric: String,
}

impl Default for HnswSettings {
    fn default() -> Self {
        Self {
            m: 4,
            ef_construction: 400,
            ef_search: 500,
            metric: "cosine".to_string(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    embedding: Option<EmbeddingFileConfig>,
    search: Option<SearchFileConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddingFileConfig {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    /// Name of the env var holding the API key
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFileConfig {
    backend: Option<String>,
    index_name: Option<String>,
    api_version: Option<String>,
    timeout_secs: Option<u64>,
    hnsw: Option<HnswSettings>,
    /// Name of the env var holding the endpoint
    endpoint_env: Option<String>,
    /// Name of the env var holding the admin key
    admin_key_env: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            embedding: EmbeddingSettings::default(),
            search: SearchSettings::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment and an optional config file.
    ///
    /// Environment variables:
    /// - `COHERE_API_KEY`: embedding API key
    /// - `AZURE_SEARCH_SERVICE_ENDPOINT`: search service endpoint
    /// - `AZURE_SEARCH_ADMIN_KEY`: search admin key
    /// - `VECSEARCH_CONFIG`: path to config file
    /// - `VECSEARCH_INDEX`: index name
    /// - `VECSEARCH_EMBEDDING_PROVIDER`, `VECSEARCH_SEARCH_BACKEND`
    /// - `RUST_LOG`, `NO_COLOR`
    ///
    /// # Example
    /// ```no_run
    /// use vecsearch_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load config");
    /// config.validate().expect("Missing credentials");
    /// ```
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        Self::load_with(config_file, |key| std::env::var(key).ok())
    }

    /// Load configuration resolving environment variables through `lookup`.
    pub fn load_with<F>(config_file: Option<&Path>, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let config_path = config_file
            .map(Path::to_path_buf)
            .or_else(|| lookup("VECSEARCH_CONFIG").map(PathBuf::from))
            .or_else(default_config_path);

        let mut file = ConfigFile::default();
        if let Some(path) = config_path {
            if path.exists() {
                file = read_config_file(&path)?;
                config.config_file = Some(path);
            } else if config_file.is_some() {
                return Err(AppError::Config(format!(
                    "Config file does not exist: {:?}",
                    path
                )));
            }
        }

        if let Some(embedding) = file.embedding {
            let target = &mut config.embedding;
            if let Some(provider) = embedding.provider {
                target.provider = provider;
            }
            if let Some(model) = embedding.model {
                target.model = model;
            }
            if let Some(dimensions) = embedding.dimensions {
                target.dimensions = dimensions;
            }
            if let Some(timeout) = embedding.timeout_secs {
                target.timeout_secs = timeout;
            }
            target.base_url = embedding.base_url;
            if let Some(env) = embedding.api_key_env {
                target.api_key_env = env;
            }
        }

        if let Some(search) = file.search {
            let target = &mut config.search;
            if let Some(backend) = search.backend {
                target.backend = backend;
            }
            if let Some(index_name) = search.index_name {
                target.index_name = index_name;
            }
            if let Some(api_version) = search.api_version {
                target.api_version = api_version;
            }
            if let Some(timeout) = search.timeout_secs {
                target.timeout_secs = timeout;
            }
            if let Some(hnsw) = search.hnsw {
                target.hnsw = hnsw;
            }
            if let Some(env) = search.endpoint_env {
                target.endpoint_env = env;
            }
            if let Some(env) = search.admin_key_env {
                target.admin_key_env = env;
            }
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                config.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                config.no_color = !color;
            }
        }

        // Environment variables override the config file
        if let Some(provider) = lookup("VECSEARCH_EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }
        if let Some(backend) = lookup("VECSEARCH_SEARCH_BACKEND") {
            config.search.backend = backend;
        }
        if let Some(index_name) = lookup("VECSEARCH_INDEX") {
            config.search.index_name = index_name;
        }

        config.embedding.api_key = non_empty(lookup(&config.embedding.api_key_env));
        config.search.endpoint = non_empty(lookup(&config.search.endpoint_env))
            .map(|e| e.trim_end_matches('/').to_string());
        config.search.admin_key = non_empty(lookup(&config.search.admin_key_env));

        if let Some(level) = lookup("RUST_LOG") {
            config.log_level = Some(level);
        }
        if lookup("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and
    /// the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        index_name: Option<String>,
        embedding_provider: Option<String>,
        search_backend: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(index_name) = index_name {
            self.search.index_name = index_name;
        }

        if let Some(provider) = embedding_provider {
            self.embedding.provider = provider;
        }

        if let Some(backend) = search_backend {
            self.search.backend = backend;
        }

        if let Some(model) = model {
            self.embedding.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate configuration before any network call is made.
    ///
    /// Missing credentials for the selected provider or backend are fatal.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.embedding.provider.as_str();
        if !EMBEDDING_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                provider,
                EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        let backend = self.search.backend.as_str();
        if !SEARCH_BACKENDS.contains(&backend) {
            return Err(AppError::Config(format!(
                "Unknown search backend: {}. Supported: {}",
                backend,
                SEARCH_BACKENDS.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if self.search.index_name.trim().is_empty() {
            return Err(AppError::Config("Index name must not be empty".to_string()));
        }

        if provider == "cohere" && self.embedding.api_key.is_none() {
            return Err(AppError::Config(format!(
                "Embedding API key not found in environment variable: {}",
                self.embedding.api_key_env
            )));
        }

        if backend == "azure" {
            if self.search.endpoint.is_none() {
                return Err(AppError::Config(format!(
                    "Search endpoint not found in environment variable: {}",
                    self.search.endpoint_env
                )));
            }
            if self.search.admin_key.is_none() {
                return Err(AppError::Config(format!(
                    "Search admin key not found in environment variable: {}",
                    self.search.admin_key_env
                )));
            }
        }

        Ok(())
    }
}

/// Default config file location relative to the working directory.
fn default_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|dir| dir.join(".vecsearch").join("config.yaml"))
}

fn read_config_file(path: &Path) -> AppResult<ConfigFile> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;

    serde_yaml::from_str(&contents)
        .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn full_env() -> impl Fn(&str) -> Option<String> {
        env(&[
            (EMBEDDING_API_KEY_ENV, "co-key"),
            (SEARCH_ENDPOINT_ENV, "https://demo.search.windows.net/"),
            (SEARCH_ADMIN_KEY_ENV, "admin-key"),
        ])
    }

    fn missing_file() -> PathBuf {
        TempDir::new().unwrap().path().join("absent.yaml")
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.embedding.provider, "cohere");
        assert_eq!(config.embedding.model, "embed-english-v3.0");
        assert_eq!(config.embedding.dimensions, 1024);
        assert_eq!(config.search.backend, "azure");
        assert_eq!(config.search.hnsw.m, 4);
        assert!(!config.verbose);
    }

    #[test]
    fn test_load_reads_credentials_from_env() {
        let lookup = full_env();
        let config = AppConfig::load_with(None, |k| {
            if k == "VECSEARCH_CONFIG" {
                Some(missing_file().to_string_lossy().to_string())
            } else {
                lookup(k)
            }
        })
        .unwrap();

        assert_eq!(config.embedding.api_key.as_deref(), Some("co-key"));
        assert_eq!(
            config.search.endpoint.as_deref(),
            Some("https://demo.search.windows.net")
        );
        assert_eq!(config.search.admin_key.as_deref(), Some("admin-key"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_credentials_fail_validation() {
        for removed in [
            EMBEDDING_API_KEY_ENV,
            SEARCH_ENDPOINT_ENV,
            SEARCH_ADMIN_KEY_ENV,
        ] {
            let lookup = full_env();
            let path = missing_file();
            let config = AppConfig::load_with(None, |k| {
                if k == removed {
                    None
                } else if k == "VECSEARCH_CONFIG" {
                    Some(path.to_string_lossy().to_string())
                } else {
                    lookup(k)
                }
            })
            .unwrap();

            let err = config.validate().unwrap_err();
            assert!(
                err.to_string().contains(removed),
                "error '{}' should name {}",
                err,
                removed
            );
        }
    }

    #[test]
    fn test_explicit_missing_config_file_is_error() {
        let err = AppConfig::load_with(Some(&missing_file()), full_env()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_empty_env_value_counts_as_missing() {
        let lookup = env(&[
            (EMBEDDING_API_KEY_ENV, "   "),
            (SEARCH_ENDPOINT_ENV, "https://demo.search.windows.net"),
            (SEARCH_ADMIN_KEY_ENV, "admin-key"),
        ]);
        let path = missing_file();
        let config = AppConfig::load_with(None, |k| {
            if k == "VECSEARCH_CONFIG" {
                Some(path.to_string_lossy().to_string())
            } else {
                lookup(k)
            }
        })
        .unwrap();

        assert!(config.embedding.api_key.is_none());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_offline_backends_need_no_credentials() {
        let mut config = AppConfig::default();
        config.embedding.provider = "mock".to_string();
        config.search.backend = "memory".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.embedding.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_file_is_merged() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
embedding:
  provider: mock
  dimensions: 256
  apiKeyEnv: MY_EMBED_KEY
search:
  backend: memory
  indexName: notebook-index
  hnsw:
    m: 8
    efConstruction: 200
    efSearch: 300
    metric: dotProduct
logging:
  level: debug
  color: false
"#
        )
        .unwrap();

        let lookup = env(&[("MY_EMBED_KEY", "from-custom-env")]);
        let config = AppConfig::load_with(Some(file.path()), lookup).unwrap();

        assert_eq!(config.config_file.as_deref(), Some(file.path()));
        assert_eq!(config.embedding.provider, "mock");
        assert_eq!(config.embedding.dimensions, 256);
        assert_eq!(config.embedding.api_key.as_deref(), Some("from-custom-env"));
        assert_eq!(config.search.backend, "memory");
        assert_eq!(config.search.index_name, "notebook-index");
        assert_eq!(config.search.hnsw.m, 8);
        assert_eq!(config.search.hnsw.metric, "dotProduct");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.no_color);
    }

    #[test]
    fn test_missing_credentials_name_redirected_variables() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "embedding:\n  apiKeyEnv: TEAM_EMBED_KEY\nsearch:\n  endpointEnv: TEAM_SEARCH_URL\n  adminKeyEnv: TEAM_SEARCH_KEY"
        )
        .unwrap();

        let config = AppConfig::load_with(Some(file.path()), env(&[])).unwrap();
        assert_eq!(config.embedding.api_key_env, "TEAM_EMBED_KEY");
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("TEAM_EMBED_KEY"), "{}", err);

        let config = AppConfig::load_with(
            Some(file.path()),
            env(&[("TEAM_EMBED_KEY", "co-key"), ("TEAM_SEARCH_URL", "https://x")]),
        )
        .unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("TEAM_SEARCH_KEY"), "{}", err);
        assert!(!err.contains(SEARCH_ADMIN_KEY_ENV), "{}", err);

        let config =
            AppConfig::load_with(Some(file.path()), env(&[("TEAM_EMBED_KEY", "co-key")])).unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("TEAM_SEARCH_URL"), "{}", err);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "search:\n  indexName: from-file").unwrap();

        let lookup = env(&[("VECSEARCH_INDEX", "from-env")]);
        let config = AppConfig::load_with(Some(file.path()), lookup).unwrap();
        assert_eq!(config.search.index_name, "from-env");
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "embedding: [not, a, map").unwrap();

        let err = AppConfig::load_with(Some(file.path()), env(&[])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            Some("other-index".to_string()),
            Some("mock".to_string()),
            Some("memory".to_string()),
            Some("embed-multilingual-v3.0".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.search.index_name, "other-index");
        assert_eq!(overridden.embedding.provider, "mock");
        assert_eq!(overridden.search.backend, "memory");
        assert_eq!(overridden.embedding.model, "embed-multilingual-v3.0");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_secrets_are_not_serialized() {
        let mut config = AppConfig::default();
        config.embedding.api_key = Some("secret-1".to_string());
        config.search.admin_key = Some("secret-2".to_string());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret-1"));
        assert!(!json.contains("secret-2"));
    }
}
