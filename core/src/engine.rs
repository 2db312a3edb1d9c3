//! Registries plus platform configuration: the piece that turns a token tree
//! into files on disk.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::{
    formats::{FormatArgs, FormatRegistry, Formatter},
    transforms::{Transform, TransformRegistry},
    BuildError, DesignTokens, Dictionary, PlatformConfig,
};

#[derive(Clone, Default)]
pub struct StyleDictionary {
    transforms: TransformRegistry,
    formats: FormatRegistry,
}
impl StyleDictionary {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn register_transform(&mut self, name: impl Into<String>, transform: Transform) -> &mut Self {
        self.transforms.register(name, transform);
        self
    }
    pub fn register_transform_group(
        &mut self,
        name: impl Into<String>,
        transforms: Vec<String>,
    ) -> Result<&mut Self, BuildError> {
        self.transforms.register_group(name, transforms)?;
        Ok(self)
    }
    pub fn register_format(&mut self, name: impl Into<String>, formatter: Formatter) -> &mut Self {
        self.formats.register(name, formatter);
        self
    }

    /// Binds a token tree to a set of platforms. Transform groups and formats
    /// are checked here so a misconfigured platform fails before any file is
    /// touched.
    pub fn extend<'a>(
        &'a self,
        tokens: &'a DesignTokens,
        platforms: IndexMap<String, PlatformConfig>,
    ) -> Result<ExtendedDictionary<'a>, BuildError> {
        for platform in platforms.values() {
            if !self.transforms.has_group(&platform.transform_group) {
                return Err(BuildError::UnknownTransformGroup(
                    platform.transform_group.clone(),
                ));
            }
            if let Some(file) = platform.files.iter().find(|f| !self.formats.contains(&f.format)) {
                return Err(BuildError::UnknownFormat(file.format.clone()));
            }
        }
        Ok(ExtendedDictionary {
            engine: self,
            tokens,
            platforms,
        })
    }
}

pub struct ExtendedDictionary<'a> {
    engine: &'a StyleDictionary,
    tokens: &'a DesignTokens,
    platforms: IndexMap<String, PlatformConfig>,
}
impl<'a> ExtendedDictionary<'a> {
    pub fn platforms(&self) -> &IndexMap<String, PlatformConfig> {
        &self.platforms
    }

    fn platform(&self, name: &str) -> Result<&PlatformConfig, BuildError> {
        self.platforms
            .get(name)
            .ok_or_else(|| BuildError::UnknownPlatform(name.to_string()))
    }

    /// The transformed tokens a platform would be built from.
    pub fn export_platform(&self, name: &str) -> Result<Dictionary, BuildError> {
        let platform = self.platform(name)?;
        let transforms = self.engine.transforms.group(&platform.transform_group)?;
        Dictionary::build(&self.tokens.root, &transforms, platform)
    }

    pub fn build_platform(&self, name: &str) -> Result<Vec<PathBuf>, BuildError> {
        let platform = self.platform(name)?;
        let dictionary = self.export_platform(name)?;
        fs::create_dir_all(&platform.build_path).map_err(|source| BuildError::Io {
            path: platform.build_path.clone(),
            source,
        })?;

        let mut written = Vec::with_capacity(platform.files.len());
        for file in &platform.files {
            let formatter = self.engine.formats.get(&file.format)?;
            let contents = formatter(&FormatArgs {
                dictionary: &dictionary,
                platform,
                file,
            })?;
            let path = platform.destination(file);
            fs::write(&path, contents).map_err(|source| BuildError::Io {
                path: path.clone(),
                source,
            })?;
            info!("✔︎ {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    pub fn build_all_platforms(&self) -> Result<Vec<PathBuf>, BuildError> {
        let mut written = Vec::new();
        for name in self.platforms.keys() {
            debug!(platform = %name, "building");
            written.extend(self.build_platform(name)?);
        }
        Ok(written)
    }

    /// Removes every file a platform would write.
    pub fn clean_platform(&self, name: &str) -> Result<Vec<PathBuf>, BuildError> {
        let platform = self.platform(name)?;
        let mut removed = Vec::new();
        for file in &platform.files {
            let path = platform.destination(file);
            if remove_if_exists(&path)? {
                info!("☀︎ {}", path.display());
                removed.push(path);
            }
        }
        Ok(removed)
    }

    pub fn clean_all_platforms(&self) -> Result<Vec<PathBuf>, BuildError> {
        let mut removed = Vec::new();
        for name in self.platforms.keys() {
            debug!(platform = %name, "cleaning");
            removed.extend(self.clean_platform(name)?);
        }
        Ok(removed)
    }
}

fn remove_if_exists(path: &Path) -> Result<bool, BuildError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(BuildError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
