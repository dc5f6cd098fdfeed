// cparse-cli — demo binaries for the cparse lexical pipeline.
//
// Distributed under the GPL 2.0 with a linking exception. See COPYING.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Persistent defaults for the demo binaries, overridden by whatever was
/// passed on the command line.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cursors: Option<bool>,
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Config {
    /// Loads `path` if given, otherwise looks for `cparse.toml` in the
    /// current directory; missing either way is not an error, just empty
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidate = match path {
            Some(p) => p.to_path_buf(),
            None => Path::new("cparse.toml").to_path_buf(),
        };
        if !candidate.exists() {
            return Ok(Config::default());
        }
        let text = fs::read_to_string(&candidate)
            .with_context(|| format!("reading config file {}", candidate.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", candidate.display()))
    }
}
