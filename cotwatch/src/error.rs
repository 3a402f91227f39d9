//! Error module
//!

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigStatus {
    #[error("Bad track TTL {0:?} in configuration: {1}")]
    BadTtl(String, humantime::DurationError),
    #[error("Track TTL {0:?} is too large")]
    TtlOutOfRange(String),
    #[error("Bad address {0:?} in configuration")]
    BadAddress(String),
}
