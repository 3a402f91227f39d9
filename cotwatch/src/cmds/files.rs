use std::path::Path;

use chrono::{SecondsFormat, Utc};
use eyre::Result;
use tracing::trace;

use cotwatch_engine::{FileSource, Stats};

use crate::{new_watcher, Settings};

/// Process every file under `input` once, print the completion line and the summary.
///
#[tracing::instrument]
pub fn process_files(settings: &Settings, input: &Path) -> Result<Stats> {
    trace!("process_files");

    let mut src = FileSource::new(input)?;
    let mut w = new_watcher(settings, 1)?;
    w.run(&mut src)?;
    let stats = w.finish()?;

    println!(
        "[OK] Done at {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    println!("{}", stats.to_table());
    Ok(stats)
}
