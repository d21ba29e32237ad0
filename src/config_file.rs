//! Find and load the optional `shelltest.toml` configuration file.
//!
//! Auto-discovery walks the current directory and up to 5 parent
//! directories. Every field is optional -- CLI flags always take
//! precedence over what's found here (see [`FileConfig::apply`]).

use std::path::PathBuf;

use serde::Deserialize;

use crate::config::{ColorMode, RunConfig};

const CONFIG_FILE: &str = "shelltest.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub prefix: Option<String>,
    pub prompt: Option<String>,
    pub inline_prefix: Option<String>,
    pub first: Option<bool>,
    pub quiet: Option<bool>,
    pub verbose: Option<bool>,
    pub color: Option<ColorMode>,
    pub diff_options: Option<String>,
    pub pre_flight: Option<String>,
    pub post_flight: Option<String>,
}

impl FileConfig {
    /// Overlays the file-provided values onto `config`. Called before CLI
    /// flags are applied, so flags always win.
    pub fn apply(self, config: &mut RunConfig) {
        if let Some(prefix) = self.prefix {
            config.prefix = crate::config::decode_prefix(&prefix);
        }
        if let Some(prompt) = self.prompt {
            config.prompt = prompt;
        }
        if let Some(inline_prefix) = self.inline_prefix {
            config.inline_prefix = inline_prefix;
        }
        if let Some(first) = self.first {
            config.stop_on_first_fail = first;
        }
        if let Some(quiet) = self.quiet {
            config.quiet = quiet;
        }
        if let Some(verbose) = self.verbose {
            config.verbose = verbose;
        }
        if let Some(color) = self.color {
            config.color = color;
        }
        if self.diff_options.is_some() {
            config.diff_options = self.diff_options;
        }
        if self.pre_flight.is_some() {
            config.pre_flight = self.pre_flight;
        }
        if self.post_flight.is_some() {
            config.post_flight = self.post_flight;
        }
    }
}

/// Reads the config file at `path`, or auto-discovers `shelltest.toml` by
/// walking up to 5 parent directories if `path` is `None`.
pub fn read_config_file(path: Option<PathBuf>) -> Option<FileConfig> {
    let path = path.or_else(find_config_file)?;
    let contents = std::fs::read_to_string(&path).ok()?;

    match toml::from_str(&contents) {
        Ok(cfg) => Some(cfg),
        Err(error) => {
            eprintln!("shelltest: Error while reading `{}`: {error}", path.display());
            None
        }
    }
}

fn find_config_file() -> Option<PathBuf> {
    let mut path = PathBuf::from(CONFIG_FILE);
    let max_tries = 5;

    for _ in 0..max_tries {
        if path.try_exists().unwrap_or(false) {
            return Some(path);
        }
        path = PathBuf::from("..").join(&path);
    }
    None
}
