//! Generates design-token stylesheets and accessor modules from a JSON token
//! tree, either once from the command line or on request over HTTP.

use tracing_subscriber::EnvFilter;

pub mod config;
pub mod server;

pub use theme_tokens_core::{
    flatten_by_key, generate_tokens, object_paths, BuildError, DesignTokens, Shape, Token,
    TokenOrGroup,
};

const DEFAULT_FILTER: &str = "theme_tokens=info,theme_tokens_core=info,tower_http=info";

/// Installs the global `fmt` subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
