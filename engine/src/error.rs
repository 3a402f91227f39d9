use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fence configuration errors, all fatal before any event is processed.
///
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Bad fence spec {spec:?} near {near:?}")]
    Syntax { spec: String, near: String },
    #[error("Polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("{0} must be finite and positive, got {1}")]
    OutOfRange(&'static str, f64),
}

/// Input errors.
///
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Can not bind {0}: {1}")]
    Bind(String, io::Error),
    #[error("Can not join multicast group {0}: {1}")]
    Multicast(String, io::Error),
    #[error("Only IPv4 multicast groups are supported, got {0}")]
    NotIpv4Multicast(String),
    #[error("Receive failed: {0}")]
    Receive(io::Error),
    #[error("Can not read {0:?}: {1}")]
    Read(PathBuf, io::Error),
    #[error("Can not walk {0:?}: {1}")]
    Walk(PathBuf, walkdir::Error),
}

impl SourceError {
    /// Only a single unreadable file is recovered from, everything else stops the run.
    ///
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SourceError::Read(..))
    }
}
