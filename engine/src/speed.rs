//! Per-track speed derivation.
//!
//! Most producers do not send any speed, so we keep the last position of every track (keyed by
//! `uid`) and derive the ground speed from two successive reports.
//!
//! When an event does carry an explicit speed it is used as-is and the track sample is NOT
//! refreshed.  The next derived speed for that track is therefore computed against the last
//! report without explicit speed.
//!

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, trace};

use cotwatch_common::{distance_km, NM_IN_KM};
use cotwatch_formats::Event;

const MS_PER_HOUR: f64 = 3_600_000.;

/// Last known position of a track.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub time: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
}

impl From<&Event> for Sample {
    fn from(ev: &Event) -> Self {
        Sample {
            time: ev.time,
            lat: ev.lat,
            lon: ev.lon,
        }
    }
}

/// Keyed store of the last sample for every track.
///
/// It is owned by whoever drives the evaluation, there is no global state.  Only one ingestion
/// path may mutate it, sharing it between threads needs a per-key atomic read-then-write.
///
#[derive(Debug, Default)]
pub struct SpeedCache {
    last: HashMap<String, Sample>,
    /// Optional eviction delay
    ttl: Option<Duration>,
    /// Most recent event time seen by `expire()`
    newest: Option<DateTime<Utc>>,
}

impl SpeedCache {
    #[tracing::instrument]
    pub fn new() -> Self {
        SpeedCache::default()
    }

    /// Samples older than `ttl` (relative to the newest event) are dropped by `expire()`.
    ///
    #[tracing::instrument]
    pub fn with_ttl(ttl: Duration) -> Self {
        SpeedCache {
            ttl: Some(ttl),
            ..SpeedCache::default()
        }
    }

    /// Explicit speed if the event has one, otherwise derive it from the track history.
    ///
    #[tracing::instrument(skip(self))]
    pub fn resolve_or_derive_speed(&mut self, ev: &Event) -> Option<f64> {
        match ev.speed_kts {
            Some(kts) => Some(kts),
            None => self.derive_kts(ev),
        }
    }

    /// Derive the speed in knots between the previous sample of the same track and this event,
    /// always storing the event as the new sample.
    ///
    /// Returns `None` without a `uid`, on first sighting or when time did not move forward.
    ///
    #[tracing::instrument(skip(self))]
    pub fn derive_kts(&mut self, ev: &Event) -> Option<f64> {
        let uid = ev.uid.as_ref()?;

        let prev = self.last.insert(uid.clone(), Sample::from(ev));
        let prev = match prev {
            Some(prev) => prev,
            None => {
                trace!("first sighting of {uid}");
                return None;
            }
        };

        let hours = (ev.time - prev.time).num_milliseconds() as f64 / MS_PER_HOUR;
        if hours <= 0. {
            debug!("{uid}: time did not move forward ({} -> {})", prev.time, ev.time);
            return None;
        }

        let km = distance_km(prev.lat, prev.lon, ev.lat, ev.lon);
        let kts = km / NM_IN_KM / hours;
        trace!("{uid}: {km:.3} km in {hours:.4} h = {kts:.1} kts");
        Some(kts)
    }

    /// Drop every sample too old to be useful, returns how many were removed.
    ///
    /// Does nothing without a TTL.
    ///
    #[tracing::instrument(skip(self))]
    pub fn expire(&mut self, now: DateTime<Utc>) -> usize {
        let ttl = match self.ttl {
            Some(ttl) => ttl,
            None => return 0,
        };

        let newest = match self.newest {
            Some(t) if t >= now => t,
            _ => now,
        };
        self.newest = Some(newest);

        // A TTL reaching past the representable range keeps everything
        let cutoff = match newest.checked_sub_signed(ttl) {
            Some(cutoff) => cutoff,
            None => {
                trace!("ttl {ttl} reaches before any representable time");
                return 0;
            }
        };
        let before = self.last.len();
        self.last.retain(|_, s| s.time >= cutoff);

        let gone = before - self.last.len();
        if gone > 0 {
            debug!("expired {gone} tracks older than {cutoff}");
        }
        gone
    }

    /// Last sample for a given track.
    ///
    pub fn get(&self, uid: &str) -> Option<&Sample> {
        self.last.get(uid)
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}
