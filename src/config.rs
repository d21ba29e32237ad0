//! The run configuration consumed by the core. This is the structure the
//! CLI layer and `shelltest.toml` loader both populate; the flag parser
//! itself (help text, version, color/terminal detection) lives in
//! [`crate::cli`].

use std::path::PathBuf;

use crate::range::RangeSet;

/// Color policy for the Reporter, mirroring `--color {auto,always,never}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// What the Driver should do with an emitted Test instead of (or in
/// addition to) executing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListMode {
    #[default]
    Off,
    /// `--list`: print the command, never execute.
    List,
    /// `--list-run`: execute, but print OK/FAIL instead of a diff.
    ListRun,
}

/// Per-invocation configuration. One `RunConfig` is shared across every
/// input file named on the command line; only the range filters and list
/// mode come from flags that are inherently per-run rather than per-file.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Paths given on the command line, in the order they should be run.
    pub files: Vec<PathBuf>,

    /// The literal that must precede a prompt or output line. Empty by
    /// default. `""`/`"tab"`/`"0"`/`1..=99`/backslash-escapes are
    /// all decoded by [`decode_prefix`] before reaching here.
    pub prefix: String,
    /// The prompt literal, default `"$ "`.
    pub prompt: String,
    /// The inline match-mode marker, default `"#\u{2192} "`.
    pub inline_prefix: String,

    pub stop_on_first_fail: bool,
    pub list_mode: ListMode,
    pub run_range: RangeSet,
    pub skip_range: RangeSet,

    pub pre_flight: Option<String>,
    pub post_flight: Option<String>,

    pub quiet: bool,
    pub verbose: bool,
    pub color: ColorMode,
    pub diff_options: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            files: Vec::new(),
            prefix: String::new(),
            prompt: "$ ".to_string(),
            inline_prefix: "#\u{2192} ".to_string(),
            stop_on_first_fail: false,
            list_mode: ListMode::Off,
            run_range: RangeSet::Empty,
            skip_range: RangeSet::Empty,
            pre_flight: None,
            post_flight: None,
            quiet: false,
            verbose: false,
            color: ColorMode::Auto,
            diff_options: None,
        }
    }
}

/// Decodes the special values `--prefix` accepts:
/// - `"tab"` -> a tab character
/// - `"0"` -> the empty string
/// - a decimal `1..=99` -> that many spaces
/// - anything else -> backslash escapes expanded (`\t`, `\n`, `\\`, ...)
pub fn decode_prefix(raw: &str) -> String {
    if raw == "tab" {
        return "\t".to_string();
    }
    if raw == "0" {
        return String::new();
    }
    if let Ok(n) = raw.parse::<u32>() {
        if (1..=99).contains(&n) {
            return " ".repeat(n as usize);
        }
    }
    expand_backslash_escapes(raw)
}

fn expand_backslash_escapes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_keyword() {
        assert_eq!(decode_prefix("tab"), "\t");
    }

    #[test]
    fn zero_is_empty() {
        assert_eq!(decode_prefix("0"), "");
    }

    #[test]
    fn small_decimal_is_spaces() {
        assert_eq!(decode_prefix("4"), "    ");
        assert_eq!(decode_prefix("99"), " ".repeat(99));
    }

    #[test]
    fn out_of_range_decimal_falls_through_to_escapes() {
        assert_eq!(decode_prefix("100"), "100");
    }

    #[test]
    fn backslash_escapes_are_expanded() {
        assert_eq!(decode_prefix("// "), "// ");
        assert_eq!(decode_prefix("\\t"), "\t");
    }
}
