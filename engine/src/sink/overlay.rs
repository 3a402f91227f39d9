//! KML overlay with one placemark per alert.
//!
//! The whole document is rewritten through a temporary file renamed over the previous one, so the
//! overlay on disk is always a complete document even if the process dies mid-run.
//!
//! By default this happens after every alert and the overlay matches the alerts already logged.
//! Each rewrite costs as much as the whole overlay, so a long live run with many alerts should use
//! `flush_every()` to rewrite only every `n` alerts; `close()` always writes the final state.
//!

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use kml::types::{Geometry, Placemark, Point};
use kml::{Kml, KmlDocument, KmlVersion, KmlWriter};
use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::{Alert, Sink, NO_TYPE, NO_UID};

/// In-memory list of placemarks and the file they end up in.
///
#[derive(Debug)]
pub struct KmlSink {
    path: PathBuf,
    placemarks: Vec<Kml>,
    /// Rewrite every that many alerts
    every: usize,
}

impl KmlSink {
    /// Nothing is written before the first alert or `close()`.
    ///
    #[tracing::instrument]
    pub fn new(path: &Path) -> Self {
        KmlSink {
            path: path.to_path_buf(),
            placemarks: vec![],
            every: 1,
        }
    }

    /// Only rewrite the file every `n` alerts (`0` is taken as `1`).
    ///
    pub fn flush_every(mut self, n: usize) -> Self {
        self.every = n.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.placemarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placemarks.is_empty()
    }

    /// Serialise the complete document.
    ///
    pub fn render(&self) -> Result<Vec<u8>> {
        let doc = Kml::Document {
            attrs: HashMap::new(),
            elements: self.placemarks.clone(),
        };
        let doc = Kml::KmlDocument(KmlDocument {
            version: KmlVersion::V22,
            attrs: HashMap::new(),
            elements: vec![doc],
        });

        let mut buf = vec![];
        let mut w = KmlWriter::from_writer(&mut buf);
        w.write(&doc)?;
        Ok(buf)
    }

    /// Atomically replace the file with the current document.
    ///
    #[tracing::instrument(skip(self), fields(path = ?self.path))]
    pub fn flush(&self) -> Result<()> {
        let data = self.render()?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)
            .wrap_err_with(|| format!("Can not create temporary file in {:?}", dir))?;
        tmp.write_all(&data)?;
        tmp.persist(&self.path)
            .wrap_err_with(|| format!("Can not write {:?}", self.path))?;

        debug!("{} placemarks written", self.placemarks.len());
        Ok(())
    }
}

/// Build the placemark for one alert, at (lon, lat, hae or 0).
///
pub fn placemark(alert: &Alert) -> Kml {
    let ev = alert.event;
    let description = format!(
        "type={} speedKts={:.1} reason={}",
        ev.kind.as_deref().unwrap_or(NO_TYPE),
        alert.verdict.speed_kts.unwrap_or(0.),
        alert.verdict.reason
    );

    Kml::Placemark(Placemark {
        name: Some(ev.uid.as_deref().unwrap_or(NO_UID).to_string()),
        description: Some(description),
        geometry: Some(Geometry::Point(Point::new(
            ev.lon,
            ev.lat,
            Some(ev.hae.unwrap_or(0.)),
        ))),
        ..Default::default()
    })
}

impl Sink for KmlSink {
    fn emit(&mut self, alert: &Alert) -> Result<()> {
        trace!("add placemark");
        self.placemarks.push(placemark(alert));
        if self.placemarks.len() % self.every == 0 {
            self.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.flush()
    }
}
