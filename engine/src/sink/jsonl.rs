//! Append-only JSON lines log, one record per alert.
//!
//! ```text
//! {"uid":"alpha1","type":"a-f-A-M-F","lat":37.245,"lon":-115.805,"time":"2025-01-01T00:00:00Z","speedKts":null,"reason":"outside-radius"}
//! ```
//!

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::SecondsFormat;
use eyre::{Result, WrapErr};
use serde::Serialize;
use tracing::{debug, trace};

use crate::{Alert, Sink};

/// On-disk record, field order is part of the format.
///
#[derive(Debug, Serialize)]
pub struct AlertRecord<'a> {
    pub uid: Option<&'a str>,
    #[serde(rename = "type")]
    pub kind: Option<&'a str>,
    pub lat: f64,
    pub lon: f64,
    pub time: Option<String>,
    #[serde(rename = "speedKts")]
    pub speed_kts: Option<f64>,
    pub reason: &'a str,
}

impl<'a> From<&Alert<'a>> for AlertRecord<'a> {
    fn from(alert: &Alert<'a>) -> Self {
        let ev = alert.event;
        AlertRecord {
            uid: ev.uid.as_deref(),
            kind: ev.kind.as_deref(),
            lat: ev.lat,
            lon: ev.lon,
            time: Some(ev.time.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            speed_kts: alert.verdict.speed_kts,
            reason: &alert.verdict.reason,
        }
    }
}

/// The log file, opened once in append mode and created if needed.
///
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    file: File,
}

impl JsonlSink {
    #[tracing::instrument]
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .wrap_err_with(|| format!("Can not open {:?}", path))?;
        debug!("appending to {:?}", path);

        Ok(JsonlSink {
            path: path.to_path_buf(),
            file,
        })
    }
}

impl Sink for JsonlSink {
    /// Every record is written and flushed on its own so nothing is lost on a crash.
    ///
    fn emit(&mut self, alert: &Alert) -> Result<()> {
        let mut line = serde_json::to_string(&AlertRecord::from(alert))?;
        trace!("record={line}");

        line.push('\n');
        self.file
            .write_all(line.as_bytes())
            .wrap_err_with(|| format!("Can not write to {:?}", self.path))?;
        self.file.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}
