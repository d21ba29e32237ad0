//! Flag parsing, help/version text, and the mapping from flags onto a
//! [`RunConfig`] the core actually consumes. The Driver never sees a
//! [`Cli`], only the [`RunConfig`] built from it.

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::FmtSubscriber;

use crate::config::{decode_prefix, ColorMode, ListMode, RunConfig};
use crate::config_file;
use crate::error::TestResult;
use crate::range;

/// Validates interactive command-line sessions documented in plain text
/// files: extracts commands, runs them in a persistent shell, and compares
/// captured output against expected output.
#[derive(Debug, Parser)]
#[command(name = "shelltest", author, version, about, long_about = None)]
pub struct Cli {
    /// Transcript files to run, in the order they should be tested.
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Stop on first failure.
    #[arg(long)]
    pub first: bool,

    /// List tests without executing them.
    #[arg(long, conflicts_with = "list_run")]
    pub list: bool,

    /// List tests with OK/FAIL status.
    #[arg(long = "list-run")]
    pub list_run: bool,

    /// Only run tests whose index is in RANGE (e.g. "1,3,5-7").
    #[arg(long = "test", value_name = "RANGE")]
    pub test: Option<String>,

    /// Skip tests whose index is in RANGE.
    #[arg(long, value_name = "RANGE")]
    pub skip: Option<String>,

    /// Run CMD once before the first test.
    #[arg(long = "pre-flight", value_name = "CMD")]
    pub pre_flight: Option<String>,

    /// Run CMD once after the last test, unless the run was aborted.
    #[arg(long = "post-flight", value_name = "CMD")]
    pub post_flight: Option<String>,

    /// Suppress non-essential output.
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit structured diagnostics (also controllable via `RUST_LOG`).
    #[arg(long)]
    pub verbose: bool,

    /// Color policy for the Reporter.
    #[arg(long, value_enum)]
    pub color: Option<ColorMode>,

    /// Extra options forwarded to the diff engine (e.g. "-w" to ignore
    /// whitespace, "-B" to ignore blank lines).
    #[arg(long = "diff-options", value_name = "STR")]
    pub diff_options: Option<String>,

    /// Inline match-mode marker (default "#\u{2192} ").
    #[arg(long = "inline-prefix", value_name = "STR")]
    pub inline_prefix: Option<String>,

    /// Per-line prefix required before prompts and outputs. Special values:
    /// "tab" -> tab, "0" -> empty, a decimal 1-99 -> that many spaces,
    /// otherwise backslash escapes are expanded.
    #[arg(long, value_name = "STR")]
    pub prefix: Option<String>,

    /// Prompt literal (default "$ ").
    #[arg(long, value_name = "STR")]
    pub prompt: Option<String>,

    /// Load configuration from an explicit `shelltest.toml` rather than
    /// auto-discovering one by walking parent directories.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Merges an optional `shelltest.toml` with `cli`'s flags into the
/// [`RunConfig`] the Driver consumes. File values apply first; explicit
/// flags always win.
pub fn build_config(cli: Cli) -> TestResult<RunConfig> {
    let mut config = RunConfig::default();

    if let Some(file_config) = config_file::read_config_file(cli.config) {
        file_config.apply(&mut config);
    }

    config.files = cli.files;

    if let Some(prefix) = cli.prefix {
        config.prefix = decode_prefix(&prefix);
    }
    if let Some(prompt) = cli.prompt {
        config.prompt = prompt;
    }
    if let Some(inline_prefix) = cli.inline_prefix {
        config.inline_prefix = inline_prefix;
    }

    if cli.first {
        config.stop_on_first_fail = true;
    }
    if cli.list {
        config.list_mode = ListMode::List;
    } else if cli.list_run {
        config.list_mode = ListMode::ListRun;
    }

    if let Some(raw) = cli.test {
        config.run_range = range::parse(&raw)?;
    }
    if let Some(raw) = cli.skip {
        config.skip_range = range::parse(&raw)?;
    }

    if cli.pre_flight.is_some() {
        config.pre_flight = cli.pre_flight;
    }
    if cli.post_flight.is_some() {
        config.post_flight = cli.post_flight;
    }

    if cli.quiet {
        config.quiet = true;
    }
    if cli.verbose {
        config.verbose = true;
    }
    if let Some(color) = cli.color {
        config.color = color;
    }
    if cli.diff_options.is_some() {
        config.diff_options = cli.diff_options;
    }

    Ok(config)
}

/// Installs the `tracing` subscriber used for structured diagnostics.
/// `--verbose`/`--quiet` pick a default level; `RUST_LOG` always
/// overrides it.
pub fn init_logging(cli: &Cli) {
    let default_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::WARN
    };

    let builder = FmtSubscriber::builder().with_writer(std::io::stderr);

    let subscriber = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directive) => builder.with_env_filter(EnvFilter::new(directive)).finish(),
        Err(_) => builder.with_max_level(default_level).finish(),
    };

    // Installing a subscriber can only fail if one was already set; in
    // `main` this only ever runs once, so a failure here isn't actionable.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_and_list_run_are_mutually_exclusive() {
        let err = Cli::try_parse_from(["shelltest", "--list", "--list-run", "a.txt"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn quiet_and_verbose_are_mutually_exclusive() {
        let err = Cli::try_parse_from(["shelltest", "--quiet", "--verbose", "a.txt"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn at_least_one_file_is_required() {
        assert!(Cli::try_parse_from(["shelltest"]).is_err());
    }

    #[test]
    fn explicit_flags_override_the_built_in_defaults() {
        let cli = Cli::try_parse_from(["shelltest", "--prompt", "> ", "a.txt"]).unwrap();
        let config = build_config(cli).unwrap();
        assert_eq!(config.prompt, "> ");
    }
}
