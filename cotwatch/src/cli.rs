//! Module describing all possible commands and sub-commands to the `cotwatch` main driver
//!
//! We have two main commands:
//!
//! - `udp`, listen for live CoT datagrams, possibly on a multicast group
//! - `files`, process every `.xml` or `.cot` file under a directory, then exit
//!
//! Both accept the same fence options, which override the values from the configuration file.
//!
//! `completion` is here just to configure the various shells completion system.
//!

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{crate_authors, crate_description, crate_name, crate_version, Args, Parser};
use clap_complete::shells::Shell;

/// Default directory for batch mode.
pub const DEF_INPUT: &str = "samples";

/// CLI options
#[derive(Debug, Parser)]
#[command(disable_version_flag = true)]
#[clap(name = crate_name!(), about = crate_description!())]
#[clap(version = crate_version!(), author = crate_authors!())]
pub struct Opts {
    /// configuration file.
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,
    /// Output directory for `alerts.kml` and `alerts.jsonl`.
    #[clap(short = 'o', long)]
    pub output: Option<PathBuf>,
    /// debug mode (default log level is `debug` unless `RUST_LOG` says otherwise).
    #[clap(short = 'D', long = "debug")]
    pub debug: bool,
    /// Hierarchical traces on stderr.
    #[clap(short = 'T', long)]
    pub use_tree: bool,
    /// Also write traces into hourly files in this directory.
    #[clap(short = 'L', long)]
    pub use_file: Option<PathBuf>,
    /// Sub-commands (see below).
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

// ------

/// All sub-commands:
///
/// `completion SHELL`
/// `files [--in DIR] [fence options]`
/// `udp [--port N] [--bind ADDR] [--mcast GROUP] [fence options]`
/// `version`
///
#[derive(Debug, Parser)]
pub enum SubCommand {
    /// Generate Completion stuff
    Completion(ComplOpts),
    /// Process a directory of CoT files
    Files(FilesOpts),
    /// Listen for CoT datagrams
    Udp(UdpOpts),
    /// List all package versions
    Version,
}

// ------

/// Rules shared by all modes.
///
#[derive(Clone, Debug, Default, Args)]
pub struct FenceOpts {
    /// Polygon fence, `polygon:lat,lon;lat,lon;lat,lon[;...]`.
    #[clap(long)]
    pub geofence: Option<String>,
    /// Circular fence, `center:lat,lon[;km:N]` (5 km by default).
    #[clap(long)]
    pub radius: Option<String>,
    /// Alert above this speed, in knots.
    #[clap(long)]
    pub speed_kts: Option<f64>,
    /// Forget tracks silent for that long (e.g. `30m`, `2h`).
    #[clap(long, value_parser = humantime::parse_duration)]
    pub track_ttl: Option<Duration>,
}

// ------

/// Live mode.
///
#[derive(Debug, Parser)]
pub struct UdpOpts {
    /// UDP port (default 6969).
    #[clap(short = 'p', long)]
    pub port: Option<u16>,
    /// Local address, for multicast the interface to join on (default 0.0.0.0).
    #[clap(short = 'b', long)]
    pub bind: Option<IpAddr>,
    /// IPv4 multicast group to join.
    #[clap(short = 'm', long)]
    pub mcast: Option<IpAddr>,
    /// Rewrite the KML overlay only every N alerts.
    #[clap(long, default_value_t = 1)]
    pub kml_every: usize,
    #[clap(flatten)]
    pub fences: FenceOpts,
}

// ------

/// Batch mode.
///
#[derive(Debug, Parser)]
pub struct FilesOpts {
    /// Directory searched recursively.
    #[clap(short = 'i', long = "in", default_value = DEF_INPUT)]
    pub input: PathBuf,
    #[clap(flatten)]
    pub fences: FenceOpts,
}

// ------

/// Options to generate completion files at runtime
///
#[derive(Debug, Parser)]
pub struct ComplOpts {
    #[clap(value_parser)]
    pub shell: Shell,
}
