//! Human-readable alert lines.
//!

use std::fmt::Debug;
use std::io::{self, Stdout, Write};

use eyre::Result;

use crate::{Alert, Sink, NO_SPEED, NO_TYPE, NO_UID};

/// Print `ALERT uid=... type=... lat=... lon=... spdKts=... cause=...`, with `file=...` for
/// batch input.
///
#[derive(Debug)]
pub struct ConsoleSink<W: Write + Debug> {
    out: W,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        ConsoleSink { out: io::stdout() }
    }
}

impl<W: Write + Debug> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        ConsoleSink { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Format one alert line, without the final newline.
///
pub fn alert_line(alert: &Alert) -> String {
    let ev = alert.event;
    let speed = alert
        .verdict
        .speed_kts
        .map(|s| format!("{s:.1}"))
        .unwrap_or_else(|| NO_SPEED.to_string());

    let mut line = format!(
        "ALERT uid={} type={} lat={:.6} lon={:.6} spdKts={} cause={}",
        ev.uid.as_deref().unwrap_or(NO_UID),
        ev.kind.as_deref().unwrap_or(NO_TYPE),
        ev.lat,
        ev.lon,
        speed,
        alert.verdict.reason
    );
    if let Some(name) = alert.origin.file_name() {
        line.push_str(&format!(" file={name}"));
    }
    line
}

impl<W: Write + Debug> Sink for ConsoleSink<W> {
    fn emit(&mut self, alert: &Alert) -> Result<()> {
        writeln!(self.out, "{}", alert_line(alert))?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Origin, Verdict};
    use chrono::{TimeZone, Utc};
    use cotwatch_formats::Event;
    use std::path::PathBuf;

    fn event() -> Event {
        Event {
            uid: Some("alpha1".to_string()),
            kind: Some("a-f-A-M-F".to_string()),
            time: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            lat: 37.245,
            lon: -115.805,
            hae: Some(1200.),
            ce: None,
            le: None,
            speed_kts: None,
        }
    }

    #[test]
    fn test_alert_line_file() {
        let ev = event();
        let v = Verdict {
            alert: true,
            reason: "outside-radius".to_string(),
            speed_kts: Some(12.345),
        };
        let origin = Origin::File(PathBuf::from("samples/one.xml"));
        let line = alert_line(&Alert {
            event: &ev,
            verdict: &v,
            origin: &origin,
        });
        assert_eq!(
            "ALERT uid=alpha1 type=a-f-A-M-F lat=37.245000 lon=-115.805000 spdKts=12.3 cause=outside-radius file=one.xml",
            line
        );
    }

    #[test]
    fn test_console_emit_no_speed() {
        let mut ev = event();
        ev.uid = None;
        let v = Verdict {
            alert: true,
            reason: "outside-polygon".to_string(),
            speed_kts: None,
        };
        let origin = Origin::Datagram("127.0.0.1:6969".parse().unwrap());

        let mut sink = ConsoleSink::new(vec![]);
        sink.emit(&Alert {
            event: &ev,
            verdict: &v,
            origin: &origin,
        })
        .unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            "ALERT uid=unknown type=a-f-A-M-F lat=37.245000 lon=-115.805000 spdKts=n/a cause=outside-polygon\n",
            out
        );
    }

    #[test]
    fn test_alert_line_placeholders() {
        let mut ev = event();
        ev.kind = None;
        let v = Verdict {
            alert: true,
            reason: "outside-radius".to_string(),
            speed_kts: None,
        };
        let origin = Origin::Datagram("127.0.0.1:6969".parse().unwrap());

        let line = alert_line(&Alert {
            event: &ev,
            verdict: &v,
            origin: &origin,
        });
        assert!(line.contains(&format!(" type={NO_TYPE} ")));
        assert!(line.contains(&format!(" spdKts={NO_SPEED} ")));
    }
}
