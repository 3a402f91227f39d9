//! All about `Stats`.

use std::fmt::{Display, Formatter};

use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Counters for one run.
///
/// - `read`: documents received from the source
/// - `unreadable`: inputs we could not even read (files only)
/// - `decoded`: documents turned into an event
/// - `rejected`: documents failing to decode
/// - `alerts`: events with an alert verdict
///
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Stats {
    pub read: u64,
    pub unreadable: u64,
    pub decoded: u64,
    pub rejected: u64,
    pub alerts: u64,
}

impl Stats {
    /// Summary as a table, for the end of a run.
    ///
    pub fn to_table(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Read", "Unreadable", "Decoded", "Rejected", "Alerts"]);
        builder.push_record([
            self.read.to_string(),
            self.unreadable.to_string(),
            self.decoded.to_string(),
            self.rejected.to_string(),
            self.alerts.to_string(),
        ]);
        builder.build().with(Style::modern()).to_string()
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "read={} unreadable={} decoded={} rejected={} alerts={}",
            self.read, self.unreadable, self.decoded, self.rejected, self.alerts
        )
    }
}
