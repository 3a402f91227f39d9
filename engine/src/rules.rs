//! Rule evaluation.
//!
//! Order matters: the polygon is checked first, then the circle which overwrites the polygon
//! reason if both fail, then the speed which is appended to any geofence reason.
//!

use serde::Serialize;
use tracing::{debug, trace};

use cotwatch_common::{distance_km, point_in_polygon};
use cotwatch_formats::Event;

use crate::{Fences, SpeedCache};

/// Reason reported when nothing triggered.
pub const REASON_OK: &str = "ok";

/// Geofence violations, the last one found wins.
///
#[derive(Clone, Copy, Debug, PartialEq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum GeoHit {
    OutsidePolygon,
    OutsideRadius,
}

/// Outcome of one evaluation.
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Verdict {
    pub alert: bool,
    pub reason: String,
    /// Explicit or derived speed, `None` if it could not be determined
    #[serde(rename = "speedKts")]
    pub speed_kts: Option<f64>,
}

impl Fences {
    /// Check one event against every configured fence and the speed threshold.
    ///
    /// The only side effect is the speed cache update.
    ///
    #[tracing::instrument(skip(self, cache))]
    pub fn evaluate(&self, ev: &Event, cache: &mut SpeedCache) -> Verdict {
        let speed_kts = cache.resolve_or_derive_speed(ev);

        let mut geo_hit = None;

        if let Some(poly) = &self.polygon {
            if !poly.vertices().is_empty() && !point_in_polygon(ev.lat, ev.lon, poly.vertices()) {
                trace!("outside polygon");
                geo_hit = Some(GeoHit::OutsidePolygon);
            }
        }

        if let Some(circle) = &self.circle {
            let km = distance_km(ev.lat, ev.lon, circle.lat, circle.lon);
            if km > circle.km {
                trace!("outside radius: {km:.3} > {}", circle.km);
                geo_hit = Some(GeoHit::OutsideRadius);
            }
        }

        let speed_hit = match (self.speed_kts, speed_kts) {
            (Some(max), Some(kts)) => kts > max,
            _ => false,
        };

        let reason = match (geo_hit, speed_hit) {
            (None, false) => REASON_OK.to_string(),
            (Some(geo), false) => geo.to_string(),
            (Some(geo), true) => format!("{geo}+speed"),
            (None, true) => format!(
                "speed>{}",
                threshold_label(self.speed_kts.unwrap_or_default())
            ),
        };

        let verdict = Verdict {
            alert: geo_hit.is_some() || speed_hit,
            reason,
            speed_kts,
        };
        debug!("verdict={:?}", verdict);
        verdict
    }
}

/// Threshold as it appears in the reason.
///
/// Plain decimal with at least one fractional digit in `[1e-3, 1e7)` (`10.0`, `0.5`), otherwise
/// scientific with an upper-case `E` (`1.0E-4`, `1.5E7`).
///
pub fn threshold_label(v: f64) -> String {
    let a = v.abs();
    if a == 0. || (1e-3..1e7).contains(&a) {
        // `{:?}` keeps the decimal point, i.e. `10.0` and not `10`
        return format!("{v:?}");
    }
    let s = format!("{v:e}");
    match s.split_once('e') {
        Some((m, e)) if m.contains('.') => format!("{m}E{e}"),
        Some((m, e)) => format!("{m}.0E{e}"),
        None => s,
    }
}
