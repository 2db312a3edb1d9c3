use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{info, subscriber::NoSubscriber};

use crate::{
    formats::{
        CSS_VARIABLES, JAVASCRIPT_MODULE, JSON_FLAT, SCSS_VARIABLES, TYPESCRIPT_DECLARATION,
        TYPESCRIPT_MODULE,
    },
    transforms::TOKENS_JS,
    BuildError, DesignTokens, PlatformConfig, StyleDictionary,
};

/// The platforms every generation run builds, all written to `build_path`.
pub fn default_platforms(build_path: &Path) -> IndexMap<String, PlatformConfig> {
    let platform = || PlatformConfig::new(TOKENS_JS, build_path);
    IndexMap::from([
        (
            "scss".to_string(),
            platform().with_file("_variables.scss", SCSS_VARIABLES),
        ),
        ("json".to_string(), platform().with_file("tokens.json", JSON_FLAT)),
        (
            "ts".to_string(),
            platform()
                .with_file("tokens.ts", TYPESCRIPT_MODULE)
                .with_file("tokens-types.d.ts", TYPESCRIPT_DECLARATION),
        ),
        ("js".to_string(), platform().with_file("tokens.js", JAVASCRIPT_MODULE)),
        (
            "css".to_string(),
            platform().with_file("variables.css", CSS_VARIABLES),
        ),
    ])
}

/// Writes every token artifact for `tokens` into `build_path`, replacing
/// whatever a previous run left there. `tokens` is only read.
///
/// With `silent`, nothing the build logs reaches the caller's subscriber for
/// the duration of the call.
pub fn generate_tokens(
    tokens: &DesignTokens,
    build_path: impl AsRef<Path>,
    silent: bool,
) -> Result<Vec<PathBuf>, BuildError> {
    let build_path = build_path.as_ref();
    if silent {
        tracing::subscriber::with_default(NoSubscriber::default(), || run(tokens, build_path))
    } else {
        run(tokens, build_path)
    }
}

fn run(tokens: &DesignTokens, build_path: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let engine = StyleDictionary::new();
    let dictionary = engine.extend(tokens, default_platforms(build_path))?;
    dictionary.clean_all_platforms()?;
    let written = dictionary.build_all_platforms()?;
    info!(files = written.len(), path = %build_path.display(), "generated design tokens");
    Ok(written)
}
