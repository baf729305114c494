//! # guard-config
//!
//! Layered configuration loading for Guardian using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`GUARDIAN_*` prefix, `__` as separator)
//! 2. `GOOGLE_API_KEY`, mapped onto `classifier.api_key`
//! 3. Project-level `.guardian/config.toml`
//! 4. User-level `~/.config/guardian/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `GUARDIAN_CLASSIFIER__MODEL` -> `classifier.model`,
//! `GUARDIAN_SCAN__WORKERS` -> `scan.workers`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use guard_config::GuardConfig;
//!
//! let config = GuardConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//!
//! if config.classifier.is_configured() {
//!     println!("model: {}", config.classifier.model);
//! }
//! ```

mod classifier;
mod embeddings;
mod error;
mod general;
mod scan;
mod store;

pub use classifier::ClassifierConfig;
pub use embeddings::{EmbeddingMode, EmbeddingsConfig};
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use scan::{MAX_CHUNK_LINES, MIN_CHUNK_LINES, ScanConfig};
pub use store::StoreConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project-local config location, relative to the project root.
pub const LOCAL_CONFIG_PATH: &str = ".guardian/config.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GuardConfig {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl GuardConfig {
    /// Load configuration from all sources, using the current directory as
    /// the project root.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration for the project rooted at `project_root`.
    pub fn load_from(project_root: &Path) -> Result<Self, ConfigError> {
        Self::figment_at(project_root)
            .extract()
            .map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain for the current directory.
    pub fn figment() -> Figment {
        Self::figment_at(Path::new("."))
    }

    /// Build the figment provider chain for a project root.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    pub fn figment_at(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = project_root.join(LOCAL_CONFIG_PATH);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: The conventional Google key variable
        figment = figment.merge(
            Env::raw()
                .only(&["GOOGLE_API_KEY"])
                .map(|_| "classifier.api_key".into()),
        );

        // Layer 4: Environment variables (highest priority)
        figment.merge(Env::prefixed("GUARDIAN_").split("__"))
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.window_size == 0 {
            return Err(ConfigError::invalid("store.window_size", "must be positive"));
        }
        if self.store.window_overlap >= self.store.window_size {
            return Err(ConfigError::invalid(
                "store.window_overlap",
                format!(
                    "{} must be smaller than store.window_size ({})",
                    self.store.window_overlap, self.store.window_size
                ),
            ));
        }
        if self.store.query_k == 0 {
            return Err(ConfigError::invalid("store.query_k", "must be positive"));
        }
        if self.scan.workers == 0 {
            return Err(ConfigError::invalid("scan.workers", "must be at least 1"));
        }
        if !(MIN_CHUNK_LINES..=MAX_CHUNK_LINES).contains(&self.scan.chunk_lines) {
            return Err(ConfigError::invalid(
                "scan.chunk_lines",
                format!(
                    "{} is outside {MIN_CHUNK_LINES}..={MAX_CHUNK_LINES}",
                    self.scan.chunk_lines
                ),
            ));
        }
        if self.classifier.max_attempts == 0 {
            return Err(ConfigError::invalid(
                "classifier.max_attempts",
                "must be at least 1",
            ));
        }
        if self.embeddings.mode == EmbeddingMode::Hash && self.embeddings.hash_dimension == 0 {
            return Err(ConfigError::invalid(
                "embeddings.hash_dimension",
                "must be positive",
            ));
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("guardian").join("config.toml"))
    }
}
