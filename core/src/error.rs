use std::{io, path::PathBuf};

use itertools::Itertools;
use thiserror::Error;

/// Failures turning JSON into a token tree.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("token tree root must be a JSON object")]
    NotAnObject,
    #[error("invalid token JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("invalid size `{value}` for token `{path}`")]
    InvalidSize { path: String, value: String },
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unknown transform `{0}`")]
    UnknownTransform(String),
    #[error("unknown transform group `{0}`")]
    UnknownTransformGroup(String),
    #[error("unknown format `{0}`")]
    UnknownFormat(String),
    #[error("unknown platform `{0}`")]
    UnknownPlatform(String),
    #[error("token `{token}` references `{reference}`, which does not exist")]
    UnresolvedReference { token: String, reference: String },
    #[error("circular reference: {}", chain.iter().join(" -> "))]
    CircularReference { chain: Vec<String> },
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("failed to serialize tokens: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}
