use std::env;
use std::io;

use clap::{crate_authors, crate_description, crate_version, CommandFactory, Parser};
use clap_complete::generate;
use eyre::Result;
use tracing::{info, trace};

use cotwatch::{listen_udp, process_files, Config, Listen, Opts, Settings, SubCommand};
use cotwatch_common::{init_logging, ConfigFile};

/// Binary name, using a different binary name
pub const NAME: &str = env!("CARGO_BIN_NAME");
/// Binary version
pub const VERSION: &str = crate_version!();
/// Authors
pub const AUTHORS: &str = crate_authors!();

fn main() -> Result<()> {
    let opts = Opts::parse();

    // `-D` only sets a default, `RUST_LOG` still wins.
    //
    if opts.debug && env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "debug");
    }

    // Initialise logging.
    //
    init_logging(NAME, opts.use_tree, opts.use_file.clone())?;

    // Config file is optional, the CLI can give everything.
    //
    let cfg = ConfigFile::<Config>::load(NAME, opts.config.as_deref())?;
    match cfg.source() {
        Some(fname) => info!("configuration from {:?}", fname),
        None => info!("no configuration file, using defaults"),
    }

    // Banner
    //
    banner()?;

    handle_subcmd(&opts, cfg.inner())
}

pub fn handle_subcmd(opts: &Opts, cfg: &Config) -> Result<()> {
    match &opts.subcmd {
        // Handle `files`
        //
        SubCommand::Files(fopts) => {
            trace!("files");

            let settings = Settings::new(cfg, opts.output.as_deref(), &fopts.fences)?;
            process_files(&settings, &fopts.input)?;
        }

        // Handle `udp`
        //
        SubCommand::Udp(uopts) => {
            trace!("udp");

            let settings = Settings::new(cfg, opts.output.as_deref(), &uopts.fences)?;
            let listen = Listen::new(cfg, uopts)?;
            listen_udp(&settings, &listen, uopts.kml_every)?;
        }

        // Standalone completion generation
        //
        // NOTE: you can generate UNIX shells completion on Windows and vice-versa.  Not worth
        //       trying to limit depending on the OS.
        //
        SubCommand::Completion(copts) => {
            let generator = copts.shell;
            generate(generator, &mut Opts::command(), NAME, &mut io::stdout());
        }

        // Standalone `version` command
        //
        SubCommand::Version => {
            eprintln!("{}", version());
            eprintln!("Modules: ");
            eprintln!("\t{}", cotwatch_common::version());
            eprintln!("\t{}", cotwatch_formats::version());
            eprintln!("\t{}", cotwatch_engine::version());
        }
    }
    Ok(())
}

/// Return our version number
///
#[inline]
pub fn version() -> String {
    format!("{}/{}", NAME, VERSION)
}

/// Display banner
///
fn banner() -> Result<()> {
    Ok(eprintln!(
        r##"
{}/{} by {}
{}
"##,
        NAME,
        VERSION,
        AUTHORS,
        crate_description!()
    ))
}
