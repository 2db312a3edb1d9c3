//! Runtime configuration.
//!
//! `defaults/theme-tokens.default.toml` is embedded into the binary. A
//! [`Loader`] layers project files and `THEME_TOKENS__*` environment variables
//! on top before deserializing into [`RuntimeConfig`].

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, ValueKind};
use serde::Deserialize;

const DEFAULT_TOML: &str = include_str!("../defaults/theme-tokens.default.toml");

/// Picked up from the working directory when present.
pub const PROJECT_FILE: &str = "theme-tokens.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    /// JSON token tree read on every generation run.
    pub tokens_file: PathBuf,
    /// Output directory for generated artifacts.
    pub tokens_dir: PathBuf,
    pub silent: bool,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer `THEME_TOKENS__*` environment variables, `__` separating nested keys.
    pub fn with_env(mut self) -> Self {
        self.builder = self.builder.add_source(
            Environment::with_prefix("THEME_TOKENS")
                .separator("__")
                .try_parsing(true),
        );
        self
    }

    /// Apply a single key/value override (used for CLI flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<RuntimeConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Defaults, then `theme-tokens.toml` if present, then `explicit`, then the
/// environment.
pub fn load(explicit: Option<&Path>) -> Result<RuntimeConfig, ConfigError> {
    let mut loader = Loader::new().with_optional_file(PROJECT_FILE);
    if let Some(path) = explicit {
        loader = loader.with_file(path);
    }
    loader.with_env().build()
}
