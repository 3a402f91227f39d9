//! Decoding errors
//!

use thiserror::Error;

/// Everything that can go wrong when turning a raw document into an `Event`.
///
/// All of these are recoverable at the document level, the caller is expected to report and skip.
///
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("DOCTYPE declarations are not allowed")]
    DoctypeForbidden,
    #[error("entity reference &{0}; is not allowed")]
    EntityForbidden(String),
    #[error("malformed XML: {0}")]
    Malformed(#[from] roxmltree::Error),
    #[error("missing <event>")]
    MissingEvent,
    #[error("missing <point>")]
    MissingPoint,
    #[error("missing attribute {0} on <point>")]
    MissingAttribute(&'static str),
    #[error("bad value {value:?} for attribute {name}")]
    BadNumber { name: &'static str, value: String },
    #[error("bad timestamp {0:?}")]
    BadTime(String),
}
