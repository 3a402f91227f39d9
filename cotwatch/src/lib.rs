//! Library part of the `cotwatch` utility.
//!
//! All the rule logic is in `cotwatch-engine`, this is only the command-line surface, the
//! configuration file and the wiring of sources and sinks for each mode.
//!

pub use cli::*;
pub use cmds::*;
pub use config::*;
pub use error::*;

mod cli;
mod cmds;
mod config;
mod error;
