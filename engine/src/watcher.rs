//! The processing loop.
//!
//! A `Watcher` owns the fences, the per-track speed cache and the sinks.  Documents are
//! decoded, evaluated and, on alert, sent to every sink, one at a time and in arrival order.
//!
//! Per-document failures (unreadable file, decode error) are reported on `stderr` and skipped,
//! anything else stops the run.
//!

use std::io::{self, Write};

use chrono::Duration;
use eyre::Result;
use tracing::{info, trace, warn};

use cotwatch_formats::{decode, Event};

use crate::{Alert, Fences, Origin, Raw, Sink, Source, SpeedCache, Stats, Verdict};

/// Run context.
///
#[derive(Debug)]
pub struct Watcher {
    fences: Fences,
    cache: SpeedCache,
    sinks: Vec<Box<dyn Sink>>,
    stats: Stats,
}

impl Watcher {
    #[tracing::instrument]
    pub fn new(fences: Fences) -> Self {
        if fences.is_empty() {
            warn!("no fence and no speed threshold, nothing will ever alert");
        }
        Watcher {
            fences,
            cache: SpeedCache::new(),
            sinks: vec![],
            stats: Stats::default(),
        }
    }

    /// Forget tracks not heard of for `ttl`.
    ///
    pub fn track_ttl(mut self, ttl: Duration) -> Self {
        self.cache = SpeedCache::with_ttl(ttl);
        self
    }

    pub fn add_sink<S: Sink + 'static>(&mut self, sink: S) -> &mut Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn cache(&self) -> &SpeedCache {
        &self.cache
    }

    /// Evaluate one decoded event and dispatch the alert, if any.
    ///
    #[tracing::instrument(skip(self))]
    pub fn evaluate(&mut self, ev: &Event, origin: &Origin) -> Result<Verdict> {
        self.cache.expire(ev.time);

        let verdict = self.fences.evaluate(ev, &mut self.cache);
        if verdict.alert {
            self.stats.alerts += 1;
            let alert = Alert {
                event: ev,
                verdict: &verdict,
                origin,
            };
            for sink in self.sinks.iter_mut() {
                sink.emit(&alert)?;
            }
        }
        Ok(verdict)
    }

    /// Decode and evaluate one raw document.  `Ok(None)` means it was rejected and reported.
    ///
    #[tracing::instrument(skip(self, raw), fields(origin = %raw.origin))]
    pub fn process(&mut self, raw: &Raw) -> Result<Option<Verdict>> {
        self.stats.read += 1;

        let ev = match decode(&raw.data) {
            Ok(ev) => ev,
            Err(e) => {
                self.stats.rejected += 1;
                warn!("rejected: {e}");
                report(&raw.origin, "Parse", &e.to_string());
                return Ok(None);
            }
        };
        self.stats.decoded += 1;

        self.evaluate(&ev, &raw.origin).map(Some)
    }

    /// Drain `source`, returns when it is exhausted (never for a live source) or on the first
    /// fatal error.
    ///
    #[tracing::instrument(skip(self, source))]
    pub fn run(&mut self, source: &mut dyn Source) -> Result<()> {
        trace!("run on {:?}", source);

        while let Some(next) = source.next_document() {
            match next {
                Ok(raw) => {
                    self.process(&raw)?;
                }
                Err(e) if !e.is_fatal() => {
                    self.stats.unreadable += 1;
                    warn!("skipped: {e}");
                    report_line(&format!("[!] Read error: {e}"));
                }
                Err(e) => return Err(e.into()),
            }
        }
        info!("source exhausted: {}", self.stats);
        Ok(())
    }

    /// Close every sink and return the final counters.
    ///
    #[tracing::instrument(skip(self))]
    pub fn finish(mut self) -> Result<Stats> {
        for sink in self.sinks.iter_mut() {
            sink.close()?;
        }
        info!("done: {}", self.stats);
        Ok(self.stats)
    }
}

/// `[!] Parse error in <file>: <msg>` for files, `[!] Parse error: <msg>` otherwise.
///
fn report(origin: &Origin, what: &str, msg: &str) {
    let line = match origin.file_name() {
        Some(name) => format!("[!] {what} error in {name}: {msg}"),
        None => format!("[!] {what} error: {msg}"),
    };
    report_line(&line);
}

fn report_line(line: &str) {
    // stderr going away is not worth stopping for
    let _ = writeln!(io::stderr(), "{line}");
}
