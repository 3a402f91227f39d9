//! Definition of the input formats
//!
//! For now only Cursor-on-Target (CoT) XML position reports are supported, every other module
//! works on the canonical `Event` produced here.
//!

use clap::{crate_name, crate_version};

// Re-export for convenience
//
pub use cot::*;
pub use error::*;

mod cot;
mod error;

const NAME: &str = crate_name!();
const VERSION: &str = crate_version!();

pub fn version() -> String {
    format!("{}/{}", NAME, VERSION)
}
