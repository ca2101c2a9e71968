//! Error taxonomy
//!
//! Config and asset errors are fatal at startup. Nothing in the per-tick
//! simulation returns an error: invalid transitions are ignored and missing
//! animation frames hold the last valid frame.

use std::path::PathBuf;

use thiserror::Error;

/// Missing or malformed startup configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required config key `{0}`")]
    Missing(&'static str),
    #[error("config key `{key}` has malformed value `{value}` (expected {expected})")]
    Malformed {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Missing or unreadable asset
#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("asset not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: png::DecodingError,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed level `{level}` at line {line}: {reason}")]
    MalformedLevel {
        level: String,
        line: usize,
        reason: String,
    },
    #[error("no entry for level `{0}` in level info")]
    UnknownLevel(String),
    #[error("level `{0}` has no player spawn marker")]
    NoPlayerSpawn(String),
    #[error("sprite set {} has no `{clip}` clip", dir.display())]
    MissingClip { dir: PathBuf, clip: String },
}

/// Any startup failure
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Asset(#[from] AssetLoadError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
