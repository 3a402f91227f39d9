//! Where alerts go.
//!
//! Every sink receives the originating event, its verdict and where it came from; formatting is
//! entirely theirs.  Writes are synchronous, a slow sink slows down ingestion.
//!
//! - `ConsoleSink` prints one `ALERT` line per alert
//! - `JsonlSink` appends one JSON record per alert
//! - `KmlSink` maintains a KML overlay with one placemark per alert
//!

use std::fmt::Debug;

use eyre::Result;

pub use console::*;
pub use jsonl::*;
pub use overlay::*;

use cotwatch_formats::Event;

use crate::{Origin, Verdict};

mod console;
mod jsonl;
mod overlay;

/// Label used when an event has no `uid`.
pub const NO_UID: &str = "unknown";
/// Label used when an event has no `type`.
pub const NO_TYPE: &str = "n/a";
/// Label used when no speed could be determined.
pub const NO_SPEED: &str = "n/a";

/// One alert, borrowed from the evaluation loop.
///
#[derive(Clone, Copy, Debug)]
pub struct Alert<'a> {
    pub event: &'a Event,
    pub verdict: &'a Verdict,
    pub origin: &'a Origin,
}

/// Anything able to record alerts.  Errors are fatal to the run.
///
pub trait Sink: Debug {
    /// Record one alert.
    fn emit(&mut self, alert: &Alert) -> Result<()>;

    /// End of run, make sure everything is on disk.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
