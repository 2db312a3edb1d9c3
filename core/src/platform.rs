use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One output file of a platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    pub destination: String,
    pub format: String,
}

/// Where and how one family of outputs gets built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    pub transform_group: String,
    pub build_path: PathBuf,
    /// Prepended to every token name by `name/cti/kebab`.
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub files: Vec<FileConfig>,
}
impl PlatformConfig {
    pub fn new(transform_group: impl Into<String>, build_path: impl AsRef<Path>) -> Self {
        Self {
            transform_group: transform_group.into(),
            build_path: build_path.as_ref().to_path_buf(),
            prefix: None,
            files: Vec::new(),
        }
    }
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
    pub fn with_file(mut self, destination: impl Into<String>, format: impl Into<String>) -> Self {
        self.files.push(FileConfig {
            destination: destination.into(),
            format: format.into(),
        });
        self
    }
    pub fn destination(&self, file: &FileConfig) -> PathBuf {
        self.build_path.join(&file.destination)
    }
}
