//! Run configuration.
//!
//! Settings are read from an optional `config.toml` (by default
//! `~/.config/calendly-etl/config.toml`) and then overridden by command-line
//! flags and their environment variables.
//!
//! ```toml
//! bucket = "smw-calendly-ecr-bucket"
//! folder = "calendly/"
//! secret_name = "calendly"
//! secret_backend = "file"
//! page_size = 100
//! recency_filter = "exclude-past"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use calendly_etl_core::{EtlError, EtlResult, OutputLayout};
use calendly_etl_providers::secret::{EnvSecretStore, FileSecretStore, PassSecretStore};
use calendly_etl_providers::storage::FsObjectStore;
use calendly_etl_providers::{CalendlyConfig, ObjectStore, RecencyFilter, SecretStore};

use crate::cli::ConfigOverrides;
use crate::error::{CliError, CliResult};

/// Where the API credentials secret is looked up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SecretBackend {
    /// `CALENDLY_ETL_SECRET_<NAME>` environment variables.
    #[default]
    Env,
    /// `<secrets_dir>/<name>.json` files.
    File,
    /// The `pass` password store.
    Pass,
}

/// Configuration for one extract run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    /// Destination bucket.
    pub bucket: String,

    /// Key prefix inside the bucket.
    pub folder: String,

    /// Name of the secret holding the API header object.
    pub secret_name: String,

    /// Locality label for the secret and storage services.
    pub region: String,

    /// Secret store backend.
    pub secret_backend: SecretBackend,

    /// Directory for the `file` secret backend.
    pub secrets_dir: Option<PathBuf>,

    /// Root directory of the local object store.
    pub storage_root: PathBuf,

    /// Calendly API base URL.
    pub api_base_url: String,

    /// Requested page size for collection endpoints.
    pub page_size: Option<u32>,

    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// Recency filter name (`pass-through`, `exclude-past`, `exclude-upcoming`).
    pub recency_filter: String,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            bucket: "smw-calendly-ecr-bucket".to_string(),
            folder: "calendly/".to_string(),
            secret_name: "calendly".to_string(),
            region: "us-east-1".to_string(),
            secret_backend: SecretBackend::default(),
            secrets_dir: None,
            storage_root: PathBuf::from("./storage"),
            api_base_url: CalendlyConfig::DEFAULT_BASE_URL.to_string(),
            page_size: None,
            timeout_secs: None,
            recency_filter: RecencyFilter::default().as_str().to_string(),
        }
    }
}

impl EtlConfig {
    /// Loads configuration from the default path, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> CliResult<Self> {
        toml::from_str(content).map_err(|e| CliError::Config(format!("failed to parse config: {}", e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calendly-etl")
    }

    /// Applies command-line and environment overrides.
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref bucket) = overrides.bucket {
            self.bucket = bucket.clone();
        }
        if let Some(ref folder) = overrides.folder {
            self.folder = folder.clone();
        }
        if let Some(ref name) = overrides.secret_name {
            self.secret_name = name.clone();
        }
        if let Some(ref region) = overrides.region {
            self.region = region.clone();
        }
        if let Some(backend) = overrides.secret_backend {
            self.secret_backend = backend;
        }
        if let Some(ref dir) = overrides.secrets_dir {
            self.secrets_dir = Some(dir.clone());
        }
        if let Some(ref root) = overrides.storage_root {
            self.storage_root = root.clone();
        }
        if let Some(ref url) = overrides.api_base_url {
            self.api_base_url = url.clone();
        }
        if overrides.page_size.is_some() {
            self.page_size = overrides.page_size;
        }
        if overrides.timeout_secs.is_some() {
            self.timeout_secs = overrides.timeout_secs;
        }
        if let Some(ref filter) = overrides.recency_filter {
            self.recency_filter = filter.clone();
        }
    }

    /// Checks the settings a run depends on.
    pub fn validate(&self) -> EtlResult<()> {
        if self.bucket.trim().is_empty() {
            return Err(EtlError::config("bucket must not be empty"));
        }
        if self.secret_name.trim().is_empty() {
            return Err(EtlError::config("secret_name must not be empty"));
        }
        if let Some(page_size) = self.page_size {
            if !(1..=CalendlyConfig::MAX_PAGE_SIZE).contains(&page_size) {
                return Err(EtlError::config(format!(
                    "page_size must be between 1 and {}, got {}",
                    CalendlyConfig::MAX_PAGE_SIZE,
                    page_size
                )));
            }
        }
        self.calendly_config()?;
        self.recency_filter()?;
        Ok(())
    }

    /// Returns the directory used by the `file` secret backend.
    pub fn secrets_dir(&self) -> PathBuf {
        self.secrets_dir
            .clone()
            .unwrap_or_else(|| Self::default_config_dir().join("secrets"))
    }

    /// Builds the API client configuration.
    pub fn calendly_config(&self) -> EtlResult<CalendlyConfig> {
        let mut config = CalendlyConfig::new(&self.api_base_url)?;
        if let Some(page_size) = self.page_size {
            config = config.with_page_size(page_size);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Parses the configured recency filter.
    pub fn recency_filter(&self) -> EtlResult<RecencyFilter> {
        self.recency_filter.parse().map_err(EtlError::config)
    }

    /// Returns the object key layout.
    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.folder)
    }

    /// Instantiates the configured secret store.
    pub fn secret_store(&self) -> Arc<dyn SecretStore> {
        match self.secret_backend {
            SecretBackend::Env => Arc::new(EnvSecretStore::default()),
            SecretBackend::File => Arc::new(FileSecretStore::new(self.secrets_dir())),
            SecretBackend::Pass => Arc::new(PassSecretStore::default()),
        }
    }

    /// Instantiates the object store.
    pub fn object_store(&self) -> Arc<dyn ObjectStore> {
        Arc::new(FsObjectStore::new(&self.storage_root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calendly_etl_core::ErrorCode;

    #[test]
    fn defaults() {
        let config = EtlConfig::default();
        assert_eq!(config.bucket, "smw-calendly-ecr-bucket");
        assert_eq!(config.folder, "calendly/");
        assert_eq!(config.secret_name, "calendly");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.secret_backend, SecretBackend::Env);
        assert_eq!(config.recency_filter().unwrap(), RecencyFilter::PassThrough);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EtlConfig::from_toml(
            r#"
bucket = "other-bucket"
secret_backend = "file"
secrets_dir = "/etc/calendly-etl/secrets"
page_size = 50
"#,
        )
        .unwrap();

        assert_eq!(config.bucket, "other-bucket");
        assert_eq!(config.folder, "calendly/");
        assert_eq!(config.secret_backend, SecretBackend::File);
        assert_eq!(config.secrets_dir(), PathBuf::from("/etc/calendly-etl/secrets"));
        assert_eq!(config.calendly_config().unwrap().page_size, Some(50));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = EtlConfig::from_toml("bucket = [").unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "folder = \"exports\"\n").unwrap();

        let config = EtlConfig::load_from(&path).unwrap();
        assert_eq!(config.layout().folder(), "exports");
    }

    #[test]
    fn load_from_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = EtlConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn overrides_win() {
        let mut config = EtlConfig::default();
        config.apply(&ConfigOverrides {
            bucket: Some("b2".to_string()),
            folder: Some("".to_string()),
            page_size: Some(10),
            recency_filter: Some("exclude-past".to_string()),
            ..Default::default()
        });

        assert_eq!(config.bucket, "b2");
        assert_eq!(config.layout().folder(), "");
        assert_eq!(config.page_size, Some(10));
        assert_eq!(config.secret_name, "calendly");
        assert_eq!(config.recency_filter().unwrap(), RecencyFilter::ExcludePast);
    }

    #[test]
    fn page_size_bounds() {
        for page_size in [1, CalendlyConfig::MAX_PAGE_SIZE] {
            let config = EtlConfig {
                page_size: Some(page_size),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "page_size {}", page_size);
        }

        let config = EtlConfig {
            page_size: Some(500),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("got 500"));
    }

    #[test]
    fn validate_rejects_bad_settings() {
        let cases = [
            EtlConfig {
                bucket: " ".to_string(),
                ..Default::default()
            },
            EtlConfig {
                secret_name: String::new(),
                ..Default::default()
            },
            EtlConfig {
                page_size: Some(0),
                ..Default::default()
            },
            EtlConfig {
                page_size: Some(CalendlyConfig::MAX_PAGE_SIZE + 1),
                ..Default::default()
            },
            EtlConfig {
                api_base_url: "not a url".to_string(),
                ..Default::default()
            },
            EtlConfig {
                recency_filter: "sometimes".to_string(),
                ..Default::default()
            },
        ];

        for config in cases {
            let err = config.validate().unwrap_err();
            assert_eq!(err.code(), ErrorCode::ConfigurationError, "{:?}", config);
        }
    }
}
