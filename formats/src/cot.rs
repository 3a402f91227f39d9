//! Module for Cursor-on-Target position reports.
//!
//! Only the part of the schema we evaluate is modeled:
//!
//! ```xml
//! <event version="2.0" uid="alpha1" type="a-f-A-M-F" time="2025-01-01T00:00:00Z">
//!   <point lat="37.245" lon="-115.805" hae="1200" ce="5" le="10"/>
//!   <detail speedKts="12.5"/>
//! </event>
//! ```
//!
//! The parser refuses any DOCTYPE declaration and any non-predefined entity reference, there is
//! no way to expand external or recursive entities.
//!

use chrono::{DateTime, Utc};
use roxmltree::{Document, Node, ParsingOptions};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::DecodeError;

/// Canonical position report.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Track identifier, unique per physical track when present
    pub uid: Option<String>,
    /// CoT classification like `a-f-G-E-V-C`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Event time, decode time if the document did not have any
    pub time: DateTime<Utc>,
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Height above ellipsoid in meters
    pub hae: Option<f64>,
    /// Circular error in meters
    pub ce: Option<f64>,
    /// Linear error in meters
    pub le: Option<f64>,
    /// Speed in knots, as reported by the producer
    #[serde(rename = "speedKts")]
    pub speed_kts: Option<f64>,
}

impl Event {
    /// Decode one CoT document, `now` is used when the event carries no time.
    ///
    #[tracing::instrument(skip(input))]
    pub fn decode_at(input: &str, now: DateTime<Utc>) -> Result<Event, DecodeError> {
        trace!("decode {} bytes", input.len());

        let opts = ParsingOptions {
            allow_dtd: false,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(input, opts).map_err(|e| match e {
            roxmltree::Error::DtdDetected => DecodeError::DoctypeForbidden,
            roxmltree::Error::UnknownEntityReference(name, _) => DecodeError::EntityForbidden(name),
            e => DecodeError::Malformed(e),
        })?;

        let event = doc
            .descendants()
            .find(|n| n.has_tag_name("event"))
            .ok_or(DecodeError::MissingEvent)?;

        let uid = event.attribute("uid").map(str::to_owned);
        let kind = event.attribute("type").map(str::to_owned);
        let time = match event.attribute("time") {
            // Blank means absent, anything else must be an exact RFC 3339 instant
            Some(t) if !t.trim().is_empty() => DateTime::parse_from_rfc3339(t)
                .map_err(|_| DecodeError::BadTime(t.to_owned()))?
                .with_timezone(&Utc),
            _ => now,
        };

        let point = event
            .descendants()
            .find(|n| n.has_tag_name("point"))
            .ok_or(DecodeError::MissingPoint)?;

        let lat = required(&point, "lat")?;
        let lon = required(&point, "lon")?;
        let hae = optional(&point, "hae")?;
        let ce = optional(&point, "ce")?;
        let le = optional(&point, "le")?;

        // Some producers embed the speed, this is only a hint so garbage is ignored.
        //
        let speed_kts = event
            .descendants()
            .find(|n| n.has_tag_name("detail"))
            .and_then(|d| d.attribute("speedKts"))
            .and_then(|s| s.trim().parse::<f64>().ok());

        let ev = Event {
            uid,
            kind,
            time,
            lat,
            lon,
            hae,
            ce,
            le,
            speed_kts,
        };
        debug!("ev={:?}", ev);
        Ok(ev)
    }
}

/// Decode one CoT document, missing timestamps default to the current time.
///
/// Example:
/// ```
/// use cotwatch_formats::decode;
///
/// let ev = decode(r#"<event uid="a1"><point lat="1.5" lon="2.5"/></event>"#).unwrap();
/// assert_eq!(Some("a1"), ev.uid.as_deref());
/// assert_eq!(2.5, ev.lon);
/// ```
///
#[inline]
pub fn decode(input: &str) -> Result<Event, DecodeError> {
    Event::decode_at(input, Utc::now())
}

fn number(name: &'static str, value: &str) -> Result<f64, DecodeError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| DecodeError::BadNumber {
            name,
            value: value.to_owned(),
        })
}

fn required(node: &Node, name: &'static str) -> Result<f64, DecodeError> {
    let value = node
        .attribute(name)
        .ok_or(DecodeError::MissingAttribute(name))?;
    number(name, value)
}

fn optional(node: &Node, name: &'static str) -> Result<Option<f64>, DecodeError> {
    node.attribute(name).map(|v| number(name, v)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_decode_basic_event() {
        let xml = r##"
          <event version="2.0" type="a-f-A-M-F" uid="alpha1" time="2025-01-01T00:00:00Z">
            <point lat="37.245" lon="-115.805" hae="1200" ce="5" le="10"/>
          </event>
        "##;
        let ev = Event::decode_at(xml, now()).unwrap();
        assert_eq!(Some("alpha1"), ev.uid.as_deref());
        assert_eq!(Some("a-f-A-M-F"), ev.kind.as_deref());
        assert_eq!(37.245, ev.lat);
        assert_eq!(-115.805, ev.lon);
        assert_eq!(Some(1200.), ev.hae);
        assert_eq!(Some(5.), ev.ce);
        assert_eq!(Some(10.), ev.le);
        assert_eq!(None, ev.speed_kts);
        assert_eq!(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(), ev.time);
    }

    #[test]
    fn test_decode_with_prolog_and_detail_speed() {
        let xml = r##"<?xml version="1.0" encoding="UTF-8"?>
<event uid="b2" type="a-h-G" time="2025-01-01T10:30:00.250+02:00">
  <point lat="48.5" lon="2.3"/>
  <detail speedKts="42.5"><contact callsign="BRAVO"/></detail>
</event>"##;
        let ev = Event::decode_at(xml, now()).unwrap();
        assert_eq!(Some(42.5), ev.speed_kts);
        assert_eq!(None, ev.hae);
        assert_eq!("2025-01-01T08:30:00.250Z", ev.time.to_rfc3339_opts(chrono::SecondsFormat::Millis, true));
    }

    #[rstest]
    #[case(r#"<event time=""><point lat="1" lon="2"/></event>"#)]
    #[case(r#"<event time="   "><point lat="1" lon="2"/></event>"#)]
    #[case(r#"<event><point lat="1" lon="2"/></event>"#)]
    fn test_decode_default_time(#[case] xml: &str) {
        let ev = Event::decode_at(xml, now()).unwrap();
        assert_eq!(now(), ev.time);
        assert_eq!(None, ev.uid);
        assert_eq!(None, ev.kind);
    }

    #[rstest]
    #[case(r#"<event time="yesterday"><point lat="1" lon="2"/></event>"#)]
    #[case(r#"<event time="2025-01-01"><point lat="1" lon="2"/></event>"#)]
    #[case(r#"<event time="2025-13-01T00:00:00Z"><point lat="1" lon="2"/></event>"#)]
    #[case(r#"<event time=" 2025-01-01T00:00:00Z "><point lat="1" lon="2"/></event>"#)]
    fn test_decode_bad_time(#[case] xml: &str) {
        let ev = Event::decode_at(xml, now());
        assert!(matches!(ev, Err(DecodeError::BadTime(_))));
    }

    #[rstest]
    #[case(r#"<root><point lat="1" lon="2"/></root>"#)]
    #[case(r#"<message/>"#)]
    fn test_decode_missing_event(#[case] xml: &str) {
        let ev = Event::decode_at(xml, now());
        assert!(matches!(ev, Err(DecodeError::MissingEvent)));
    }

    #[rstest]
    #[case(r#"<event uid="x"/>"#)]
    #[case(r#"<event uid="x"><detail speedKts="3"/></event>"#)]
    fn test_decode_missing_point(#[case] xml: &str) {
        let ev = Event::decode_at(xml, now());
        assert!(matches!(ev, Err(DecodeError::MissingPoint)));
    }

    #[test]
    fn test_decode_nested_event() {
        let xml = r#"<batch><event uid="n"><point lat="1" lon="2"/></event></batch>"#;
        let ev = Event::decode_at(xml, now()).unwrap();
        assert_eq!(Some("n"), ev.uid.as_deref());
    }

    #[rstest]
    #[case(r#"<event><point lon="2"/></event>"#, "lat")]
    #[case(r#"<event><point lat="1"/></event>"#, "lon")]
    fn test_decode_missing_coordinate(#[case] xml: &str, #[case] attr: &str) {
        match Event::decode_at(xml, now()) {
            Err(DecodeError::MissingAttribute(name)) => assert_eq!(attr, name),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[rstest]
    #[case(r#"<event><point lat="north" lon="2"/></event>"#, "lat")]
    #[case(r#"<event><point lat="1" lon=""/></event>"#, "lon")]
    #[case(r#"<event><point lat="1" lon="2" hae="high"/></event>"#, "hae")]
    #[case(r#"<event><point lat="1" lon="2" ce="x"/></event>"#, "ce")]
    #[case(r#"<event><point lat="1" lon="2" le="1,5"/></event>"#, "le")]
    fn test_decode_bad_number(#[case] xml: &str, #[case] attr: &str) {
        match Event::decode_at(xml, now()) {
            Err(DecodeError::BadNumber { name, .. }) => assert_eq!(attr, name),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_decode_bad_speed_is_ignored() {
        let xml = r#"<event uid="s"><point lat="1" lon="2"/><detail speedKts="fast"/></event>"#;
        let ev = Event::decode_at(xml, now()).unwrap();
        assert_eq!(None, ev.speed_kts);
    }

    #[test]
    fn test_decode_out_of_range_passes() {
        let xml = r#"<event><point lat="123.0" lon="-500"/></event>"#;
        let ev = Event::decode_at(xml, now()).unwrap();
        assert_eq!(123.0, ev.lat);
        assert_eq!(-500.0, ev.lon);
    }

    #[test]
    fn test_decode_rejects_doctype() {
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE event [ <!ENTITY lol "lol"> ]>
<event uid="&lol;"><point lat="1" lon="2"/></event>"#;
        let ev = Event::decode_at(xml, now());
        assert!(matches!(ev, Err(DecodeError::DoctypeForbidden)));
    }

    #[test]
    fn test_decode_rejects_external_doctype() {
        let xml = r#"<!DOCTYPE event SYSTEM "http://example.com/cot.dtd"><event><point lat="1" lon="2"/></event>"#;
        let ev = Event::decode_at(xml, now());
        assert!(matches!(ev, Err(DecodeError::DoctypeForbidden)));
    }

    #[test]
    fn test_decode_rejects_undeclared_entity() {
        let xml = r#"<event uid="&xxe;"><point lat="1" lon="2"/></event>"#;
        let ev = Event::decode_at(xml, now());
        assert!(ev.is_err());
    }

    #[test]
    fn test_decode_predefined_entities() {
        let xml = r#"<event uid="a&amp;b"><point lat="1" lon="2"/></event>"#;
        let ev = Event::decode_at(xml, now()).unwrap();
        assert_eq!(Some("a&b"), ev.uid.as_deref());
    }

    #[rstest]
    #[case("")]
    #[case("not xml at all")]
    #[case("<event><point lat=\"1\" lon=\"2\"></event>")]
    fn test_decode_malformed(#[case] xml: &str) {
        assert!(Event::decode_at(xml, now()).is_err());
    }

    #[test]
    fn test_decode_now() {
        let before = Utc::now();
        let ev = decode(r#"<event><point lat="1" lon="2"/></event>"#).unwrap();
        assert!(ev.time >= before);
    }
}
