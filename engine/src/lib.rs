//! Rule engine for `cotwatch`.
//!
//! Raw documents come from a [`Source`] (a directory tree or a UDP socket), are decoded into
//! events, checked against the configured [`Fences`] and every alert is sent to all the
//! registered [`Sink`]s.
//!
//! ```no_run
//! use std::path::Path;
//! use cotwatch_engine::{ConsoleSink, Fences, FileSource, Watcher};
//!
//! # fn main() -> eyre::Result<()> {
//! let fences = Fences::from_specs(None, Some("center:37.24,-115.81;km:5"), Some(10.))?;
//! let mut w = Watcher::new(fences);
//! w.add_sink(ConsoleSink::stdout());
//!
//! let mut src = FileSource::new(Path::new("samples"))?;
//! w.run(&mut src)?;
//! let stats = w.finish()?;
//! println!("{}", stats.to_table());
//! # Ok(())
//! # }
//! ```
//!

mod error;
mod fence;
mod rules;
mod sink;
mod source;
mod speed;
mod stats;
mod watcher;

pub use error::*;
pub use fence::*;
pub use rules::*;
pub use sink::*;
pub use source::*;
pub use speed::*;
pub use stats::*;
pub use watcher::*;

const NAME: &str = env!("CARGO_PKG_NAME");
const EVERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version() -> String {
    format!("{}/{}", NAME, EVERSION)
}
