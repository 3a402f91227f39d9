//! Actual work behind the `files` and `udp` sub-commands.
//!

use std::fs;

use eyre::{Result, WrapErr};
use tracing::info;

use cotwatch_common::makepath;
use cotwatch_engine::{ConsoleSink, JsonlSink, KmlSink, Watcher};

pub use files::*;
pub use udp::*;

use crate::Settings;

mod files;
mod udp;

/// JSON lines log of all alerts
pub const ALERTS_JSONL: &str = "alerts.jsonl";
/// KML overlay of all alerts
pub const ALERTS_KML: &str = "alerts.kml";

/// Create the output directory and a `Watcher` with the console, JSONL and KML sinks, the KML
/// overlay being rewritten every `kml_every` alerts.
///
#[tracing::instrument]
pub fn new_watcher(settings: &Settings, kml_every: usize) -> Result<Watcher> {
    let out = &settings.output;
    fs::create_dir_all(out).wrap_err_with(|| format!("Can not create {:?}", out))?;
    info!("output in {:?}", out);

    let mut w = Watcher::new(settings.fences.clone());
    if let Some(ttl) = settings.track_ttl {
        w = w.track_ttl(ttl);
    }

    let jsonl = JsonlSink::open(&makepath!(out, ALERTS_JSONL))?;
    let kml = KmlSink::new(&makepath!(out, ALERTS_KML)).flush_every(kml_every);
    w.add_sink(ConsoleSink::stdout()).add_sink(jsonl).add_sink(kml);
    Ok(w)
}
