//! Where raw documents come from.
//!
//! A `Source` hands out one raw document at a time, it knows nothing about CoT.  Two are
//! available:
//!
//! - `FileSource` walks a directory for `.xml` & `.cot` files, sorted by path
//! - `UdpSource` listens on a UDP socket, optionally joining a multicast group
//!

use std::fmt::{Debug, Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;

pub use files::*;
pub use udp::*;

use crate::SourceError;

mod files;
mod udp;

/// Where a document came from, for diagnostics.
///
#[derive(Clone, Debug, PartialEq)]
pub enum Origin {
    File(PathBuf),
    Datagram(SocketAddr),
}

impl Origin {
    /// Short name used in the console lines, only files have one.
    ///
    pub fn file_name(&self) -> Option<String> {
        match self {
            Origin::File(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().to_string()),
            Origin::Datagram(_) => None,
        }
    }
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::File(p) => write!(f, "{}", p.display()),
            Origin::Datagram(a) => write!(f, "udp://{a}"),
        }
    }
}

/// One undecoded document.
///
#[derive(Clone, Debug)]
pub struct Raw {
    pub origin: Origin,
    pub data: String,
}

/// Anything able to deliver raw documents, one at a time.
///
/// `None` means the source is exhausted, a live source never returns it.
///
pub trait Source: Debug {
    fn next_document(&mut self) -> Option<Result<Raw, SourceError>>;
}
