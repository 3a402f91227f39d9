//! Configuration file for `cotwatch` and its merge with the command-line.
//!
//! Everything is optional, the CLI wins over the file which wins over built-in defaults:
//!
//! ```hcl
//! version = 1
//!
//! output    = "/var/lib/cotwatch"
//! geofence  = "polygon:37.0,-116.0;37.5,-116.0;37.5,-115.5;37.0,-115.5"
//! radius    = "center:37.24,-115.81;km:5"
//! speed_kts = 250
//! track_ttl = "30m"
//!
//! udp {
//!   port  = 6969
//!   bind  = "0.0.0.0"
//!   mcast = "239.2.3.1"
//! }
//! ```
//!

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::Result;
use serde::Deserialize;
use tracing::debug;

use cotwatch_common::Versioned;
use cotwatch_engine::Fences;

use crate::{ConfigStatus, FenceOpts, UdpOpts};

/// Current version
pub const CVERSION: usize = 1;
/// Default output directory
pub const DEF_OUTPUT: &str = "output";
/// Default UDP port
pub const DEF_PORT: u16 = 6969;
/// Default listening address
pub const DEF_BIND: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Configuration for the CLI tool.
///
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// File format version
    pub version: usize,
    /// Output directory
    pub output: Option<PathBuf>,
    /// Polygon fence spec
    pub geofence: Option<String>,
    /// Circle fence spec
    pub radius: Option<String>,
    /// Speed threshold in knots
    pub speed_kts: Option<f64>,
    /// Track eviction delay, `humantime` syntax
    pub track_ttl: Option<String>,
    /// Live mode parameters
    pub udp: Option<UdpConfig>,
}

impl Versioned for Config {
    const VERSION: usize = CVERSION;

    fn version(&self) -> usize {
        self.version
    }
}

/// `udp { ... }` block.
///
#[derive(Debug, Default, Deserialize)]
pub struct UdpConfig {
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub mcast: Option<String>,
}

/// What every run needs, resolved once before processing starts.
///
#[derive(Debug)]
pub struct Settings {
    pub output: PathBuf,
    pub fences: Fences,
    pub track_ttl: Option<chrono::Duration>,
}

impl Settings {
    /// Merge CLI and file, then validate the fences.  Any error here is fatal.
    ///
    #[tracing::instrument(skip(cfg))]
    pub fn new(cfg: &Config, output: Option<&Path>, fopts: &FenceOpts) -> Result<Self> {
        let output = output
            .map(Path::to_path_buf)
            .or_else(|| cfg.output.clone())
            .unwrap_or_else(|| PathBuf::from(DEF_OUTPUT));

        let fences = Fences::from_specs(
            fopts.geofence.as_deref().or(cfg.geofence.as_deref()),
            fopts.radius.as_deref().or(cfg.radius.as_deref()),
            fopts.speed_kts.or(cfg.speed_kts),
        )?;

        let ttl = match (fopts.track_ttl, &cfg.track_ttl) {
            (Some(ttl), _) => Some(ttl),
            (None, Some(s)) => Some(
                humantime::parse_duration(s).map_err(|e| ConfigStatus::BadTtl(s.clone(), e))?,
            ),
            (None, None) => None,
        };
        let track_ttl = ttl.map(to_chrono).transpose()?;

        let settings = Settings {
            output,
            fences,
            track_ttl,
        };
        debug!("settings={:?}", settings);
        Ok(settings)
    }
}

fn to_chrono(ttl: Duration) -> Result<chrono::Duration> {
    let d = chrono::Duration::from_std(ttl).map_err(|_| {
        ConfigStatus::TtlOutOfRange(humantime::format_duration(ttl).to_string())
    })?;
    Ok(d)
}

/// Where to listen in live mode.
///
#[derive(Debug, PartialEq)]
pub struct Listen {
    pub port: u16,
    pub bind: IpAddr,
    pub mcast: Option<IpAddr>,
}

impl Listen {
    #[tracing::instrument(skip(cfg))]
    pub fn new(cfg: &Config, uopts: &UdpOpts) -> Result<Self> {
        let udp = cfg.udp.as_ref();

        let port = uopts
            .port
            .or(udp.and_then(|u| u.port))
            .unwrap_or(DEF_PORT);
        let bind = match uopts.bind {
            Some(bind) => bind,
            None => match udp.and_then(|u| u.bind.as_deref()) {
                Some(s) => address(s)?,
                None => DEF_BIND,
            },
        };
        let mcast = match uopts.mcast {
            Some(group) => Some(group),
            None => udp
                .and_then(|u| u.mcast.as_deref())
                .map(address)
                .transpose()?,
        };
        Ok(Listen { port, bind, mcast })
    }
}

fn address(s: &str) -> Result<IpAddr> {
    let addr = s
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| ConfigStatus::BadAddress(s.to_string()))?;
    Ok(addr)
}
