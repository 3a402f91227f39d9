//! This is the `ConfigFile` struct.
//!
//! This is for finding the right default locations for the configuration file of `cotwatch`.
//! It is a configuration struct neutral loading engine, storing only the base directory and with
//! `load()` read the proper file or the default one.
//!
//! This encapsulates the configuration, available with `.inner()` or `.into_inner()`.
//!

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use eyre::{eyre, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::makepath;

/// Config filename
const CONFIG: &str = "config.hcl";

/// Every configuration struct carries its own version number, checked at load time.
///
pub trait Versioned {
    /// Version this struct was written for.
    const VERSION: usize;

    /// Version read from the file.
    fn version(&self) -> usize;
}

/// Wrapper around the configuration data and where it came from.
///
#[derive(Debug)]
pub struct ConfigFile<T: Debug + Default + DeserializeOwned + Versioned> {
    /// Tag is the project name.
    tag: String,
    /// This is the base directory for all files.
    basedir: PathBuf,
    /// File actually loaded, if any.
    source: Option<PathBuf>,
    inner: T,
}

impl<T> ConfigFile<T>
where
    T: Debug + Default + DeserializeOwned + Versioned,
{
    #[tracing::instrument]
    fn new(tag: &str) -> Self {
        let basedir: PathBuf = match BaseDirs::new() {
            Some(base) => {
                #[cfg(unix)]
                let base = base.home_dir().join(".config");

                #[cfg(windows)]
                let base = base.data_local_dir().to_path_buf();

                debug!("base = {base:?}");
                makepath!(base, tag)
            }
            // No home directory at all, stay local.
            None => makepath!(".", tag),
        };
        ConfigFile {
            tag: String::from(tag),
            basedir,
            source: None,
            inner: T::default(),
        }
    }

    /// Returns the path of the default config directory
    ///
    pub fn config_path(&self) -> PathBuf {
        self.basedir.clone()
    }

    /// Returns the path of the default config file
    ///
    pub fn default_file(&self) -> PathBuf {
        let cfg = self.config_path().join(CONFIG);
        debug!("default = {cfg:?}");
        cfg
    }

    /// Load the file and return a struct T in the right format.
    ///
    /// Use the following search path:
    /// - file specified on CLI, which must exist
    /// - default basedir (base on $HOME or $LOCALAPPDATA), silently skipped if absent
    ///
    /// When nothing is found, `T::default()` is used.
    ///
    #[tracing::instrument]
    pub fn load(tag: &str, fname: Option<&Path>) -> Result<ConfigFile<T>> {
        let mut cfg = ConfigFile::<T>::new(tag);

        let fname = match fname {
            Some(fname) if fname.exists() => fname.to_path_buf(),
            Some(fname) => return Err(eyre!("Unknown config file {:?}", fname)),
            None => {
                let def = cfg.default_file();
                if !def.exists() {
                    trace!("no config file in {:?}, using defaults", cfg.config_path());
                    return Ok(cfg);
                }
                def
            }
        };

        trace!("Loading config file {fname:?} for {}", cfg.tag);

        let data = fs::read_to_string(&fname)?;
        debug!("string data = {data}");

        let data: T = hcl::from_str(&data)?;
        debug!("struct data = {data:?}");

        if data.version() != T::VERSION {
            return Err(eyre!(
                "Bad config file version v{} in {:?}, need v{}",
                data.version(),
                fname,
                T::VERSION
            ));
        }

        cfg.source = Some(fname);
        cfg.inner = data;
        Ok(cfg)
    }

    /// File actually loaded, `None` means built-in defaults.
    ///
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Return the inner configuration
    ///
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Consume ourselves and return the inner configuration
    ///
    pub fn into_inner(self) -> T {
        self.inner
    }
}
